use serde::{Deserialize, Serialize};

use super::{AccountId, Cents};

/// Aggregate figures for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub total_income: Cents,
    pub total_expense: Cents,
    /// The account's stored balance, reported as is.
    pub current_balance: Cents,
}

impl AccountSummary {
    /// Income minus expense over all recorded transactions.
    pub fn net(&self) -> Cents {
        self.total_income - self.total_expense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_is_independent_of_stored_balance() {
        let summary = AccountSummary {
            account_id: 1,
            total_income: 50000,
            total_expense: 5000,
            current_balance: 10000,
        };

        assert_eq!(summary.net(), 45000);
        assert_eq!(summary.current_balance, 10000);
    }

    #[test]
    fn test_net_can_be_negative() {
        let summary = AccountSummary {
            account_id: 2,
            total_income: 0,
            total_expense: 1250,
            current_balance: 0,
        };

        assert_eq!(summary.net(), -1250);
    }
}
