pub mod dependents;
pub mod script;

// Re-export all command functions
pub use dependents::{DependentsFormat, cmd_dependents};
pub use script::{ScriptOutput, cmd_script};
