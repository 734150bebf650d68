use std::time::Duration;

// Configuration file name
pub const CONFIG_FILENAME: &str = "pgrebuild.yaml";

// Section markers in generated scripts
pub const DROP_DEPENDENTS_MARKER: &str = "-- DROP DEPENDENT RELATIONS --";
pub const TARGET_MARKER: &str = "-- TARGET RELATION --";
pub const CREATE_DEPENDENTS_MARKER: &str = "-- CREATE DEPENDENT RELATIONS --";

// Connection pool timing
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
