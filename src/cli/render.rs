use std::io::{self, Write};

use crate::domain::{Account, AccountSummary, Transaction, format_cents};

/// Write one line per transaction: kind marker, date, amount and description.
pub fn write_transactions<W: Write>(out: &mut W, transactions: &[Transaction]) -> io::Result<()> {
    if transactions.is_empty() {
        return writeln!(out, "No transactions found.");
    }

    for transaction in transactions {
        writeln!(
            out,
            "{} - Date: {}, Amount: {}, Description: {}",
            transaction.kind.marker(),
            transaction.display_date(),
            format_cents(transaction.amount),
            transaction.description
        )?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, summary: &AccountSummary) -> io::Result<()> {
    writeln!(out, "Total Income:    {:>12}", format_cents(summary.total_income))?;
    writeln!(out, "Total Expenses:  {:>12}", format_cents(summary.total_expense))?;
    writeln!(out, "Current Balance: {:>12}", format_cents(summary.current_balance))?;
    writeln!(out, "Net:             {:>12}", format_cents(summary.net()))
}

pub fn write_accounts<W: Write>(out: &mut W, accounts: &[Account]) -> io::Result<()> {
    if accounts.is_empty() {
        return writeln!(out, "No accounts found.");
    }

    writeln!(out, "{:<6} {:<20} {:>12}", "ID", "NAME", "BALANCE")?;
    writeln!(out, "{}", "-".repeat(40))?;
    for account in accounts {
        writeln!(
            out,
            "{:<6} {:<20} {:>12}",
            account.id,
            truncate(&account.name, 20),
            format_cents(account.balance)
        )?;
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::TransactionKind;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_transaction_line() {
        let transactions = vec![Transaction {
            id: 7,
            account_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            kind: TransactionKind::Expense,
            description: "Groceries".to_string(),
            amount: 5000,
        }];

        let text = render(|out| write_transactions(out, &transactions));
        assert_eq!(
            text,
            "E - Date: 10/1/2024, Amount: 50.00, Description: Groceries\n"
        );
    }

    #[test]
    fn test_empty_listings() {
        assert_eq!(
            render(|out| write_transactions(out, &[])),
            "No transactions found.\n"
        );
        assert_eq!(render(|out| write_accounts(out, &[])), "No accounts found.\n");
    }

    #[test]
    fn test_summary_lines() {
        let summary = AccountSummary {
            account_id: 1,
            total_income: 50000,
            total_expense: 5000,
            current_balance: 10000,
        };

        let text = render(|out| write_summary(out, &summary));
        assert!(text.contains("Total Income:          500.00"));
        assert!(text.contains("Total Expenses:         50.00"));
        assert!(text.contains("Current Balance:       100.00"));
        assert!(text.contains("Net:                   450.00"));
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("Alice", 20), "Alice");
        assert_eq!(truncate("A very long account name", 10), "A very ...");
    }
}
