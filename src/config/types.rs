use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;

/// Raw configuration input - all fields Optional for merging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigInput {
    pub database: Option<DatabaseInput>,
    pub script: Option<ScriptInput>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub database: Database,
    pub script: Script,
}

// Database configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseInput {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Connection settings. Individual fields override the matching part of `url`;
/// anything left unset falls back to the libpq `PG*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl Database {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let mut options = match &self.url {
            Some(url) => url
                .parse::<PgConnectOptions>()
                .with_context(|| format!("Invalid database URL: {}", crate::db::mask_url_password(url)))?,
            None => PgConnectOptions::new(),
        };

        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(name) = &self.name {
            options = options.database(name);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }

        Ok(options)
    }
}

// Script output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScriptInput {
    pub wrap_in_transaction: Option<bool>,
    pub include_comments: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub wrap_in_transaction: bool,
    pub include_comments: bool,
}

// CLI argument types
#[derive(Debug, Clone, Default, Args)]
pub struct DatabaseArgs {
    #[arg(long, help = "Database URL (defaults to DATABASE_URL)")]
    pub database_url: Option<String>,

    #[arg(long, help = "Database server host")]
    pub host: Option<String>,

    #[arg(short = 'p', long, help = "Database server port")]
    pub port: Option<u16>,

    #[arg(short = 'U', long, help = "Database user name")]
    pub user: Option<String>,

    #[arg(short = 'd', long = "dbname", help = "Database name")]
    pub name: Option<String>,

    #[arg(
        short = 'W',
        long,
        help = "Prompt for the database password before connecting"
    )]
    pub password_prompt: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScriptArgs {
    #[arg(long, help = "Wrap the script in BEGIN/COMMIT")]
    pub wrap_transaction: bool,

    #[arg(long, help = "Do not restore relation comments")]
    pub no_comments: bool,
}

// Conversion implementations
impl From<DatabaseArgs> for DatabaseInput {
    fn from(args: DatabaseArgs) -> Self {
        Self {
            url: args.database_url,
            host: args.host,
            port: args.port,
            user: args.user,
            name: args.name,
            password: None, // Prompted for separately
        }
    }
}

impl From<ScriptArgs> for ScriptInput {
    fn from(args: ScriptArgs) -> Self {
        Self {
            wrap_in_transaction: args.wrap_transaction.then_some(true),
            include_comments: args.no_comments.then_some(false),
        }
    }
}
