/// End-to-end tests that run the actual binary with assert_cmd.
///
/// `error_handling` needs no database. `script` and `dependents` create a
/// throwaway database and are skipped when DATABASE_URL is unset.
pub mod dependents;
pub mod error_handling;
