use crate::config::types::*;

/// Trait for merging optional configuration values
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl Merge<ConfigInput> for ConfigInput {
    fn merge(self, other: ConfigInput) -> ConfigInput {
        ConfigInput {
            database: match (self.database, other.database) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (Some(a), Some(b)) => Some(a.merge_with(b)),
            },
            script: match (self.script, other.script) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (Some(a), Some(b)) => Some(a.merge_with(b)),
            },
        }
    }
}

// Field-wise merges: values from `other` win
impl DatabaseInput {
    pub fn merge_with(self, other: DatabaseInput) -> DatabaseInput {
        DatabaseInput {
            url: other.url.or(self.url),
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            user: other.user.or(self.user),
            name: other.name.or(self.name),
            password: other.password.or(self.password),
        }
    }
}

impl ScriptInput {
    pub fn merge_with(self, other: ScriptInput) -> ScriptInput {
        ScriptInput {
            wrap_in_transaction: other.wrap_in_transaction.or(self.wrap_in_transaction),
            include_comments: other.include_comments.or(self.include_comments),
        }
    }
}
