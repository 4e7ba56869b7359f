use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use crate::application::LedgerService;
use crate::domain::{AccountId, TransactionKind, parse_cents, parse_date};

use super::render::{write_summary, write_transactions};

/// Menu entries of the interactive shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Record(TransactionKind),
    ListTransactions,
    Summary,
    OpenAccount,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Record(TransactionKind::Income)),
            "2" => Some(MenuChoice::Record(TransactionKind::Expense)),
            "3" => Some(MenuChoice::ListTransactions),
            "4" => Some(MenuChoice::Summary),
            "5" => Some(MenuChoice::OpenAccount),
            "6" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Run the numbered menu until the user picks "Exit" or input ends.
///
/// Failures of a single operation, including unparseable input, are printed and
/// the loop continues. Only I/O errors on the terminal end the loop early.
pub async fn run_shell<R, W>(service: &LedgerService, input: R, output: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut shell = Shell {
        service,
        input,
        output,
    };
    shell.run().await
}

struct Shell<'a, R, W> {
    service: &'a LedgerService,
    input: R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Shell<'_, R, W> {
    async fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let Some(line) = self.prompt("Enter your choice: ")? else {
                break;
            };

            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.output, "Invalid choice. Please try again.")?;
                continue;
            };

            match self.dispatch(choice).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(err) if err.downcast_ref::<io::Error>().is_some() => return Err(err),
                Err(err) => {
                    tracing::debug!(?choice, error = %err, "menu operation failed");
                    writeln!(self.output, "Error: {:#}", err)?;
                }
            }
        }

        writeln!(self.output, "Exiting...")?;
        Ok(())
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "===== Personal Finance Manager =====")?;
        writeln!(self.output, "1. Add Income")?;
        writeln!(self.output, "2. Add Expense")?;
        writeln!(self.output, "3. View Transactions")?;
        writeln!(self.output, "4. Calculate Balance")?;
        writeln!(self.output, "5. Add new Account")?;
        writeln!(self.output, "6. Exit")
    }

    /// Print a prompt and read one line. `None` means the input is exhausted.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> Result<Flow> {
        match choice {
            MenuChoice::Record(kind) => self.record(kind).await,
            MenuChoice::ListTransactions => {
                let Some(account_id) = self.read_account_id()? else {
                    return Ok(Flow::Exit);
                };
                let transactions = self.service.list_transactions(account_id).await?;
                write_transactions(&mut *self.output, &transactions)?;
                Ok(Flow::Continue)
            }
            MenuChoice::Summary => {
                let Some(account_id) = self.read_account_id()? else {
                    return Ok(Flow::Exit);
                };
                let summary = self.service.calculate_summary(account_id).await?;
                writeln!(self.output)?;
                write_summary(&mut *self.output, &summary)?;
                Ok(Flow::Continue)
            }
            MenuChoice::OpenAccount => self.open_account().await,
            MenuChoice::Exit => Ok(Flow::Exit),
        }
    }

    fn read_account_id(&mut self) -> Result<Option<AccountId>> {
        let Some(line) = self.prompt("Account ID: ")? else {
            return Ok(None);
        };
        let id = line
            .trim()
            .parse::<AccountId>()
            .with_context(|| format!("Invalid account ID '{}'", line.trim()))?;
        Ok(Some(id))
    }

    async fn record(&mut self, kind: TransactionKind) -> Result<Flow> {
        let Some(account_id) = self.read_account_id()? else {
            return Ok(Flow::Exit);
        };
        let Some(date) = self.prompt("Enter date (YYYY-MM-DD): ")? else {
            return Ok(Flow::Exit);
        };
        let date = parse_date(&date)
            .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD", date.trim()))?;
        let Some(description) = self.prompt("Enter description: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(amount) = self.prompt(&format!("Enter {} amount: ", kind))? else {
            return Ok(Flow::Exit);
        };
        let amount = parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

        self.service
            .record_transaction(date, kind, &description, amount, account_id)
            .await?;
        writeln!(self.output, "Transaction added successfully!")?;
        Ok(Flow::Continue)
    }

    async fn open_account(&mut self) -> Result<Flow> {
        let Some(name) = self.prompt("Enter account name: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(balance) = self.prompt("Enter initial balance (blank for 0): ")? else {
            return Ok(Flow::Exit);
        };
        let balance = if balance.trim().is_empty() {
            None
        } else {
            Some(parse_cents(&balance).context("Invalid balance format. Use '50.00' or '50'")?)
        };

        let account = self.service.open_account(&name, balance).await?;
        writeln!(
            self.output,
            "Your account ID is {}. Keep this number for further use.",
            account.id
        )?;
        Ok(Flow::Continue)
    }
}
