mod render;
mod shell;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::application::LedgerService;
use crate::domain::{AccountId, TransactionKind, format_cents, parse_cents, parse_date};

pub use render::{write_accounts, write_summary, write_transactions};
pub use shell::run_shell;

/// finman - Personal Finance Ledger
#[derive(Parser)]
#[command(name = "finman")]
#[command(about = "Record income and expenses against named accounts")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "FINMAN_DATABASE", default_value = "finman.db")]
    pub database: String,

    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run (defaults to the interactive menu)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Open a new account
    Open {
        /// Account holder name
        name: String,

        /// Initial balance (e.g., "100.00" or "100", defaults to 0)
        #[arg(short, long)]
        balance: Option<String>,
    },

    /// Record an income transaction
    Income(RecordArgs),

    /// Record an expense transaction
    Expense(RecordArgs),

    /// List the transactions of an account
    Transactions {
        /// Account ID
        account_id: AccountId,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show total income, total expenses and the stored balance of an account
    Summary {
        /// Account ID
        account_id: AccountId,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List all accounts
    Accounts {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Interactive numbered menu
    Shell,
}

#[derive(clap::Args)]
pub struct RecordArgs {
    /// Account ID
    pub account_id: AccountId,

    /// Amount (e.g., "50.00" or "50")
    pub amount: String,

    /// Date of the transaction (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Description of the transaction
    #[arg(short, long)]
    pub description: Option<String>,
}

impl Cli {
    /// Run the selected command on the process's stdin and stdout.
    pub async fn run(self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), &mut stdout.lock()).await
    }

    /// Run the selected command, reading menu input from `input` and writing
    /// everything meant for the user to `out`. The database connection is
    /// closed before returning, whether the command succeeded or not.
    pub async fn run_with<R, W>(self, input: R, out: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let command = self.command.unwrap_or(Commands::Shell);
        let interactive = matches!(command, Commands::Shell);

        let service = match command {
            Commands::Init => {
                let service = LedgerService::init(&self.database).await?;
                writeln!(out, "Database initialized: {}", self.database)?;
                service
            }
            _ => LedgerService::connect(&self.database)
                .await
                .with_context(|| {
                    format!(
                        "Cannot open database '{}'. Run `finman init` to create it",
                        self.database
                    )
                })?,
        };

        let result = run_command(&service, command, input, out).await;
        service.close().await;
        tracing::debug!("database connection closed");
        // Subcommand output may be JSON, so only the menu announces the close
        if interactive {
            writeln!(out, "Database connection closed")?;
        }
        result
    }
}

async fn run_command<R, W>(
    service: &LedgerService,
    command: Commands,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    match command {
        Commands::Init => {}

        Commands::Open { name, balance } => {
            let balance = balance
                .map(|b| parse_cents(&b))
                .transpose()
                .context("Invalid balance format. Use '100.00' or '100'")?;

            let account = service.open_account(&name, balance).await?;
            writeln!(
                out,
                "Opened account {} for {} with balance {}",
                account.id,
                account.name,
                format_cents(account.balance)
            )?;
        }

        Commands::Income(args) => {
            record(service, TransactionKind::Income, args, out).await?;
        }

        Commands::Expense(args) => {
            record(service, TransactionKind::Expense, args, out).await?;
        }

        Commands::Transactions { account_id, json } => {
            let transactions = service.list_transactions(account_id).await?;
            if json {
                write_json(out, &transactions)?;
            } else {
                write_transactions(out, &transactions)?;
            }
        }

        Commands::Summary { account_id, json } => {
            let summary = service.calculate_summary(account_id).await?;
            if json {
                write_json(out, &summary)?;
            } else {
                write_summary(out, &summary)?;
            }
        }

        Commands::Accounts { json } => {
            let accounts = service.list_accounts().await?;
            if json {
                write_json(out, &accounts)?;
            } else {
                write_accounts(out, &accounts)?;
            }
        }

        Commands::Shell => {
            run_shell(service, input, out).await?;
        }
    }

    Ok(())
}

async fn record<W: Write>(
    service: &LedgerService,
    kind: TransactionKind,
    args: RecordArgs,
    out: &mut W,
) -> Result<()> {
    let amount =
        parse_cents(&args.amount).context("Invalid amount format. Use '50.00' or '50'")?;

    let date = match args.date {
        Some(date_str) => parse_date(&date_str)
            .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))?,
        None => Local::now().date_naive(),
    };

    let transaction = service
        .record_transaction(
            date,
            kind,
            args.description.as_deref().unwrap_or(""),
            amount,
            args.account_id,
        )
        .await?;

    writeln!(
        out,
        "Recorded {} of {} on account {} ({})",
        transaction.kind,
        format_cents(transaction.amount),
        transaction.account_id,
        transaction.date
    )?;
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
