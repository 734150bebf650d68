use crate::config::types::*;

// Config and Database derive Default

impl Default for Script {
    fn default() -> Self {
        Self {
            wrap_in_transaction: false,
            include_comments: true,
        }
    }
}
