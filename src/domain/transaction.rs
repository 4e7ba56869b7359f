use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{AccountId, Cents};

pub type TransactionId = i64;

/// Direction of a transaction. The stored amount is always a magnitude,
/// the kind carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Single letter marker used in listings ("I" / "E").
    pub fn marker(&self) -> char {
        match self {
            TransactionKind::Income => 'I',
            TransactionKind::Expense => 'E',
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid transaction kind '{}' (expected income or expense)",
            self.0
        )
    }
}

impl std::error::Error for ParseKindError {}

/// A dated, immutable movement of money on one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    /// Calendar date the money moved
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    /// Amount in cents (never negative)
    pub amount: Cents,
}

impl Transaction {
    /// Date as day/month/year without zero padding, e.g. "5/1/2024".
    pub fn display_date(&self) -> String {
        format!(
            "{}/{}/{}",
            self.date.day(),
            self.date.month(),
            self.date.year()
        )
    }
}

/// Parse a calendar date in YYYY-MM-DD format.
pub fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
}
