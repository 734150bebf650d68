use crate::config::{merge::Merge, types::*};

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    pub fn resolve(self) -> Config {
        let defaults = Config::default();

        Config {
            database: self.resolve_database(),
            script: self.resolve_script(&defaults.script),
        }
    }

    fn resolve_database(&self) -> Database {
        let db_input = self.config_input.database.as_ref();

        Database {
            url: db_input
                .and_then(|d| d.url.as_ref())
                .cloned()
                .or_else(|| std::env::var("DATABASE_URL").ok()),
            host: db_input.and_then(|d| d.host.clone()),
            port: db_input.and_then(|d| d.port),
            user: db_input.and_then(|d| d.user.clone()),
            name: db_input.and_then(|d| d.name.clone()),
            password: db_input.and_then(|d| d.password.clone()),
        }
    }

    fn resolve_script(&self, defaults: &Script) -> Script {
        let script_input = self.config_input.script.as_ref();

        Script {
            wrap_in_transaction: script_input
                .and_then(|s| s.wrap_in_transaction)
                .unwrap_or(defaults.wrap_in_transaction),
            include_comments: script_input
                .and_then(|s| s.include_comments)
                .unwrap_or(defaults.include_comments),
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
