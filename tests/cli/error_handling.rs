//! CLI error handling tests
//!
//! Helpful messages for the common ways a run can go wrong, none of which
//! need a reachable database.

use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
#[case("no_dot")]
#[case("too.many.parts")]
#[case(".missing_schema")]
#[case("missing_name.")]
fn test_malformed_target_is_rejected_before_connecting(#[case] target: &str) {
    let helper = CliTestHelper::new();

    // Port 1 never has a server; reaching the connection step would time out
    // with a connection error instead of the target message
    helper
        .command()
        .args(["script", target, "--database-url", "postgres://localhost:1/none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must have the form schema.name"));
}

#[test]
fn test_invalid_config_yaml_error() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_config("database: [unbalanced")?;

    helper
        .command()
        .args(["script", "public.v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));

    Ok(())
}

#[test]
fn test_invalid_database_url_error() {
    let helper = CliTestHelper::new();

    helper
        .command()
        .args(["dependents", "public.v", "--database-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid database URL"));
}

#[test]
fn test_unreachable_database_error() {
    let helper = CliTestHelper::new();

    helper
        .command()
        .args(["script", "public.v", "--database-url", "postgres://pgrebuild@127.0.0.1:1/none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to connect to database"));
}

#[test]
fn test_existing_output_requires_force() -> Result<()> {
    let helper = CliTestHelper::new();
    std::fs::write(helper.project_root.join("rebuild.sql"), "-- keep me\n")?;

    // stdin is not a terminal under assert_cmd, so there is no prompt
    helper
        .command()
        .args(["script", "public.v", "-o", "rebuild.sql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    assert_eq!(helper.read_file("rebuild.sql")?, "-- keep me\n");
    Ok(())
}

#[test]
fn test_help_lists_subcommands() {
    let helper = CliTestHelper::new();

    helper
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("script").and(predicate::str::contains("dependents")));
}

#[test]
fn test_unknown_format_is_rejected() {
    let helper = CliTestHelper::new();

    helper
        .command()
        .args(["dependents", "public.v", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
