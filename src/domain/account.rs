use serde::{Deserialize, Serialize};

use super::Cents;

/// Store-assigned account identifier.
pub type AccountId = i64;

/// A named account with a stored balance.
///
/// The balance is written when the account is opened and is not recomputed
/// from the account's transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub balance: Cents,
}

/// Normalize a user supplied account name, rejecting blank names.
pub fn normalize_account_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_account_name() {
        assert_eq!(normalize_account_name("  Alice "), Some("Alice".to_string()));
        assert_eq!(
            normalize_account_name("Joint savings"),
            Some("Joint savings".to_string())
        );
    }

    #[test]
    fn test_blank_account_name_rejected() {
        assert_eq!(normalize_account_name(""), None);
        assert_eq!(normalize_account_name("   \t"), None);
    }
}
