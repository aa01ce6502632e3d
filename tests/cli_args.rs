//! Integration tests for CLI argument handling
//!
//! Runs the mintdash binary with an isolated environment and cache directory.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper to run the CLI with given args, env vars and a private cache home
fn run_cli(args: &[&str], envs: &[(&str, &str)], home: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mintdash"))
        .args(args)
        .env_clear()
        .env("HOME", home)
        .env("XDG_CACHE_HOME", home.join("cache"))
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to execute mintdash")
}

fn temp_home() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

#[test]
fn test_help_flag_exits_successfully() {
    let home = temp_home();
    let output = run_cli(&["--help"], &[], home.path());
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mintdash"), "Help should mention mintdash");
    assert!(stdout.contains("--dataset"), "Help should mention --dataset flag");
    assert!(stdout.contains("--json"), "Help should mention --json flag");
}

#[test]
fn test_invalid_dataset_prints_error_and_exits() {
    let home = temp_home();
    let output = run_cli(&["--dataset", "weather", "--json"], &[], home.path());
    assert!(!output.status.success(), "Expected invalid dataset to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid dataset"),
        "Should print error message about invalid dataset: {}",
        stderr
    );
}

#[test]
fn test_invalid_range_prints_error_and_exits() {
    let home = temp_home();
    let output = run_cli(&["--range", "fortnight", "--json"], &[], home.path());
    assert!(!output.status.success(), "Expected invalid range to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid range"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_missing_backend_url_names_env_var() {
    let home = temp_home();
    let output = run_cli(&["--json"], &[("ENVIRONMENT", "production")], home.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("MINTDASH_BACKEND_PROD_URL"),
        "Should name the missing variable: {}",
        stderr
    );
}

#[test]
fn test_unreachable_backend_without_cache_fails() {
    let home = temp_home();
    let output = run_cli(
        &["--json", "--dataset", "revenue", "--api-url", "http://127.0.0.1:1"],
        &[],
        home.path(),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_json_report_served_from_fresh_cache() {
    let home = temp_home();
    let cache_dir = home.path().join("cache").join("mintdash");
    fs::create_dir_all(&cache_dir).unwrap();
    let now = chrono::Utc::now();
    let entry = serde_json::json!({
        "data": [
            {
                "signature": "sig-recent",
                "evm_address": "0xabc",
                "amount": 3.5,
                "chain_id": "8453",
                "createdAt": now.to_rfc3339(),
            },
            {
                "signature": "sig-old",
                "evm_address": "0xdef",
                "amount": 1.0,
                "chain_id": "137",
                "createdAt": (now - chrono::Duration::days(200)).to_rfc3339(),
            }
        ],
        "timestamp": now.timestamp_millis(),
    });
    fs::write(
        cache_dir.join("platform_revenue_cache.json"),
        entry.to_string(),
    )
    .unwrap();

    // The backend is unreachable, so a success proves the cache was used
    let output = run_cli(
        &["--json", "--dataset", "revenue", "--range", "30", "--api-url", "http://127.0.0.1:1"],
        &[],
        home.path(),
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["status"], "success");
    assert_eq!(report["code"], 200);
    assert_eq!(report["source"], "cache");
    assert_eq!(report["data"]["totalCount"], 1);
    assert_eq!(report["data"]["payments"][0]["signature"], "sig-recent");
    assert_eq!(report["summary"]["total_revenue"], 4.5);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use mintdash::aggregate::DateWindow;
    use mintdash::cli::{parse_dataset_arg, Cli, StartupConfig};
    use mintdash::data::Dataset;

    #[test]
    fn test_cli_no_args_defaults() {
        let cli = Cli::parse_from(["mintdash"]);
        assert_eq!(cli.dataset, "users");
        assert!(cli.chain.is_none());
    }

    #[test]
    fn test_parse_dataset_arg_aliases() {
        assert_eq!(parse_dataset_arg("mints").unwrap(), Dataset::MintEditions);
        assert_eq!(parse_dataset_arg("tx").unwrap(), Dataset::Transactions);
        assert!(parse_dataset_arg("weather").is_err());
    }

    #[test]
    fn test_startup_config_from_cli_split_contracts_for_user() {
        let cli = Cli::parse_from([
            "mintdash",
            "--dataset",
            "split-contracts",
            "--user",
            "42",
            "--range",
            "7",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.dataset, Dataset::SplitContracts);
        assert_eq!(config.filters.user_id.as_deref(), Some("42"));
        assert_eq!(config.view.window, DateWindow::LastDays(7));
        assert_eq!(
            config.filters.query_pairs(),
            vec![("userId", "42".to_string())]
        );
    }
}
