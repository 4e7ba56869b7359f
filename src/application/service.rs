use chrono::NaiveDate;

use crate::domain::{
    Account, AccountId, AccountSummary, Cents, MAX_AMOUNT, Transaction, TransactionKind,
    format_cents, normalize_account_name,
};
use crate::storage::{NewTransaction, Repository, is_foreign_key_violation};

use super::AppError;

/// Application service providing the ledger operations.
/// This is the only way clients (CLI, interactive shell) reach the store.
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path, creating the file if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Release the store connection. The service is consumed.
    pub async fn close(self) {
        self.repo.close().await;
    }

    // ========================
    // Account operations
    // ========================

    /// Open a new account. The balance defaults to zero.
    pub async fn open_account(
        &self,
        name: &str,
        initial_balance: Option<Cents>,
    ) -> Result<Account, AppError> {
        let name = normalize_account_name(name).ok_or_else(|| {
            tracing::warn!("rejected account with empty name");
            AppError::InvalidAccountName
        })?;
        let balance = initial_balance.unwrap_or(0);

        let account = self.repo.insert_account(&name, balance).await?;
        tracing::info!(
            account_id = account.id,
            name = %account.name,
            balance = account.balance,
            "opened account"
        );
        Ok(account)
    }

    /// Get an account by ID.
    pub async fn get_account(&self, account_id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))
    }

    /// List all accounts.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record an income or expense against an existing account.
    /// The description is stored exactly as given and the account's stored
    /// balance is left untouched.
    pub async fn record_transaction(
        &self,
        date: NaiveDate,
        kind: TransactionKind,
        description: &str,
        amount: Cents,
        account_id: AccountId,
    ) -> Result<Transaction, AppError> {
        if amount < 0 {
            tracing::warn!(amount, "rejected negative transaction amount");
            return Err(AppError::InvalidAmount(
                "Amount must not be negative".to_string(),
            ));
        }
        if amount > MAX_AMOUNT {
            tracing::warn!(amount, "rejected oversized transaction amount");
            return Err(AppError::InvalidAmount(format!(
                "Amount must not exceed {}",
                format_cents(MAX_AMOUNT)
            )));
        }

        if self.repo.get_account(account_id).await?.is_none() {
            tracing::warn!(account_id, "rejected transaction for unknown account");
            return Err(AppError::AccountNotFound(account_id));
        }

        let new = NewTransaction {
            account_id,
            date,
            kind,
            description,
            amount,
        };

        let transaction = self.repo.insert_transaction(&new).await.map_err(|err| {
            // The foreign key still guards the insert if the account vanished in between
            if is_foreign_key_violation(&err) {
                AppError::AccountNotFound(account_id)
            } else {
                AppError::Database(err)
            }
        })?;

        tracing::info!(
            transaction_id = transaction.id,
            account_id,
            kind = %kind,
            amount,
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// List an account's transactions. An unknown account has no transactions.
    pub async fn list_transactions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, AppError> {
        let transactions = self.repo.list_transactions_for_account(account_id).await?;
        tracing::debug!(account_id, count = transactions.len(), "listed transactions");
        Ok(transactions)
    }

    /// Total income, total expense and the stored balance of an account.
    pub async fn calculate_summary(
        &self,
        account_id: AccountId,
    ) -> Result<AccountSummary, AppError> {
        let total_income = self
            .repo
            .sum_amount_by_kind(account_id, TransactionKind::Income)
            .await?;
        let total_expense = self
            .repo
            .sum_amount_by_kind(account_id, TransactionKind::Expense)
            .await?;
        let current_balance = self
            .repo
            .get_balance(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;

        tracing::debug!(account_id, total_income, total_expense, "calculated summary");

        Ok(AccountSummary {
            account_id,
            total_income,
            total_expense,
            current_balance,
        })
    }
}
