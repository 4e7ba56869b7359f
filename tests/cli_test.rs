mod common;

use std::io::Cursor;

use anyhow::Result;
use clap::Parser;
use common::db_path;
use finman::cli::Cli;
use tempfile::TempDir;

/// Run `finman --database <path> <args>` with the given menu input and return its output.
async fn run(path: &str, args: &[&str], input: &str) -> Result<String> {
    let mut argv = vec!["finman", "--database", path];
    argv.extend_from_slice(args);

    let cli = Cli::try_parse_from(argv)?;
    let mut output = Vec::new();
    cli.run_with(Cursor::new(input.to_string()), &mut output).await?;
    Ok(String::from_utf8(output)?)
}

#[tokio::test]
async fn test_shell_announces_closed_connection() -> Result<()> {
    let temp = TempDir::new()?;
    let path = db_path(&temp);

    let output = run(&path, &["init"], "").await?;
    assert!(output.contains("Database initialized:"));

    let output = run(&path, &["shell"], "6\n").await?;
    let mut lines = output.trim_end().lines().rev();
    assert_eq!(lines.next(), Some("Database connection closed"));
    assert_eq!(lines.next(), Some("Exiting..."));

    // Without a subcommand the menu runs as well
    let output = run(&path, &[], "").await?;
    assert!(output.trim_end().ends_with("Database connection closed"));

    Ok(())
}

#[tokio::test]
async fn test_json_output_has_no_closing_notice() -> Result<()> {
    let temp = TempDir::new()?;
    let path = db_path(&temp);

    run(&path, &["init"], "").await?;
    run(&path, &["open", "Alice", "--balance", "100"], "").await?;

    let output = run(&path, &["accounts", "--json"], "").await?;
    assert!(!output.contains("Database connection closed"));

    let accounts: serde_json::Value = serde_json::from_str(&output)?;
    assert_eq!(accounts[0]["name"], "Alice");
    assert_eq!(accounts[0]["balance"], 10000);

    Ok(())
}
