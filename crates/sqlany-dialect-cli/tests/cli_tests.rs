//! CLI integration tests for sqlany-dialect.
//!
//! These tests verify argument parsing, generated SQL on stdout,
//! and exit codes for configuration and parameter errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the sqlany-dialect binary.
fn cmd() -> Command {
    Command::cargo_bin("sqlany-dialect").unwrap()
}

fn config_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("types"))
        .stdout(predicate::str::contains("paginate"))
        .stdout(predicate::str::contains("exists"))
        .stdout(predicate::str::contains("rename-table"))
        .stdout(predicate::str::contains("rename-column"))
        .stdout(predicate::str::contains("alter-column"))
        .stdout(predicate::str::contains("comment"));
}

#[test]
fn test_paginate_subcommand_help() {
    cmd()
        .args(["paginate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sql"))
        .stdout(predicate::str::contains("--order-by"))
        .stdout(predicate::str::contains("--limit"))
        .stdout(predicate::str::contains("--offset"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlany-dialect"));
}

// =============================================================================
// Translation Tests
// =============================================================================

#[test]
fn test_types_lists_declarations() {
    cmd()
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("pk\tinteger IDENTITY PRIMARY KEY"))
        .stdout(predicate::str::contains("string\tnvarchar(255)"))
        .stdout(predicate::str::contains("money\tdecimal(19,4)"));
}

#[test]
fn test_types_json() {
    cmd()
        .args(["types", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"boolean\": \"bit\""));
}

#[test]
fn test_paginate_with_limit_and_offset() {
    cmd()
        .args([
            "paginate",
            "--sql",
            "SELECT * FROM T",
            "--order-by",
            "id",
            "--limit",
            "5",
            "--offset",
            "20",
        ])
        .assert()
        .success()
        .stdout("SELECT TOP 5 START AT 20 * FROM T ORDER BY id\n");
}

#[test]
fn test_paginate_synthesizes_order_by() {
    cmd()
        .args(["paginate", "--sql", "SELECT * FROM T", "--limit", "10"])
        .assert()
        .success()
        .stdout("SELECT TOP 10 * FROM T ORDER BY (SELECT NULL)\n");
}

#[test]
fn test_paginate_without_limit_only_orders() {
    cmd()
        .args(["paginate", "--sql", "SELECT * FROM T", "--order-by", "name"])
        .assert()
        .success()
        .stdout("SELECT * FROM T ORDER BY name\n");
}

#[test]
fn test_paginate_one_based_offset_from_config() {
    let config = config_file("dialect:\n  offset_mode: one_based\n");
    cmd()
        .arg("--config")
        .arg(config.path())
        .args(["paginate", "--sql", "SELECT a FROM T", "--limit", "5", "--offset", "20"])
        .assert()
        .success()
        .stdout("SELECT TOP 5 START AT 21 a FROM T ORDER BY (SELECT NULL)\n");
}

#[test]
fn test_exists() {
    cmd()
        .args(["exists", "--sql", "SELECT 1 FROM T WHERE x=1"])
        .assert()
        .success()
        .stdout("SELECT CASE WHEN EXISTS(SELECT 1 FROM T WHERE x=1) THEN 1 ELSE 0 END\n");
}

#[test]
fn test_renames() {
    cmd()
        .args(["rename-table", "old", "new"])
        .assert()
        .success()
        .stdout("sp_rename \"old\", \"new\"\n");

    cmd()
        .args(["rename-column", "orders", "qty", "quantity"])
        .assert()
        .success()
        .stdout("sp_rename '\"orders\".\"qty\"', \"quantity\", 'COLUMN'\n");
}

#[test]
fn test_alter_column_expands_abstract_type() {
    cmd()
        .args(["alter-column", "orders", "note", "string(64) NOT NULL"])
        .assert()
        .success()
        .stdout("ALTER TABLE \"orders\" ALTER COLUMN \"note\" nvarchar(64) NOT NULL\n");
}

#[test]
fn test_comment_on_column() {
    cmd()
        .args(["comment", "--table", "orders", "--column", "qty", "--text", "units"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "sp_updateextendedproperty @name = N'MS_Description', @value = 'units'",
        ))
        .stdout(predicate::str::contains("@level2name = \"qty\""));
}

#[test]
fn test_drop_table_comment_with_custom_property() {
    let config = config_file("dialect:\n  comment_property: Remarks\n");
    cmd()
        .arg("--config")
        .arg(config.path())
        .args(["comment", "--table", "orders", "--drop"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "sp_dropextendedproperty @name = N'Remarks'",
        ));
}

#[test]
fn test_comment_requires_text_or_drop() {
    cmd()
        .args(["comment", "--table", "orders"])
        .assert()
        .failure()
        .code(2);

    cmd()
        .args(["comment", "--table", "orders", "--text", "x", "--drop"])
        .assert()
        .failure()
        .code(2);
}

// =============================================================================
// Configuration and Logging Tests
// =============================================================================

#[test]
fn test_missing_config_file_fails() {
    cmd()
        .args(["--config", "/nonexistent/sqlany.yaml", "types"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_yaml_exits_with_config_code() {
    let config = config_file("dialect: [unclosed\n");
    cmd()
        .arg("--config")
        .arg(config.path())
        .arg("types")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_invalid_param_prefix_is_rejected() {
    let config = config_file("dialect:\n  param_prefix: qp\n");
    cmd()
        .arg("--config")
        .arg(config.path())
        .arg("types")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("param_prefix"));
}

#[test]
fn test_json_log_format_keeps_stdout_clean() {
    cmd()
        .args(["--log-format", "json", "--verbosity", "debug"])
        .args(["exists", "--sql", "SELECT 1"])
        .assert()
        .success()
        .stdout("SELECT CASE WHEN EXISTS(SELECT 1) THEN 1 ELSE 0 END\n");
}

#[test]
fn test_unknown_log_format_is_config_error() {
    cmd()
        .args(["--log-format", "xml", "types"])
        .assert()
        .failure()
        .code(2);
}
