use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{Account, AccountId, Cents, Transaction, TransactionKind};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields of a transaction that is about to be stored.
#[derive(Debug, Clone)]
pub struct NewTransaction<'a> {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: &'a str,
    pub amount: Cents,
}

/// Repository for persisting and querying accounts and transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    /// The file is only created when the URL asks for it (`mode=rwc`).
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .foreign_keys(true);

        // One request at a time; a single connection keeps reads and writes ordered.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        tracing::debug!(url = database_url, "connected to ledger store");
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        tracing::debug!("schema is up to date");
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close every connection in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("ledger store connection closed");
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a new account and read it back under the identifier the store assigned.
    /// The insert is rolled back if any step fails.
    pub async fn insert_account(&self, name: &str, balance: Cents) -> Result<Account> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin account transaction")?;

        let result = sqlx::query("INSERT INTO accounts (account_name, balance) VALUES (?, ?)")
            .bind(name)
            .bind(balance)
            .execute(&mut *tx)
            .await
            .context("Failed to save account")?;

        let id = result.last_insert_rowid();

        let row = sqlx::query(
            r#"
            SELECT account_id, account_name, balance
            FROM accounts
            WHERE account_id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read back new account")?;

        let account = Self::row_to_account(&row)?;

        tx.commit()
            .await
            .context("Failed to commit account transaction")?;

        Ok(account)
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT account_id, account_name, balance
            FROM accounts
            WHERE account_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// List all accounts ordered by ID.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT account_id, account_name, balance FROM accounts ORDER BY account_id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    /// Read the stored balance of an account.
    pub async fn get_balance(&self, id: AccountId) -> Result<Option<Cents>> {
        let row = sqlx::query("SELECT balance FROM accounts WHERE account_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account balance")?;

        Ok(row.map(|row| row.get("balance")))
    }

    fn row_to_account(row: &SqliteRow) -> Result<Account> {
        Ok(Account {
            id: row.try_get("account_id").context("Invalid account_id")?,
            name: row.try_get("account_name").context("Invalid account_name")?,
            balance: row.try_get("balance").context("Invalid balance")?,
        })
    }

    // ========================
    // Transaction operations
    // ========================

    /// Save a new transaction and return it with its assigned ID.
    pub async fn insert_transaction(&self, new: &NewTransaction<'_>) -> Result<Transaction> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (amount, transaction_type, date, account_id, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.amount)
        .bind(new.kind.as_str())
        .bind(new.date.format(DATE_FORMAT).to_string())
        .bind(new.account_id)
        .bind(new.description)
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;

        Ok(Transaction {
            id: result.last_insert_rowid(),
            account_id: new.account_id,
            date: new.date,
            kind: new.kind,
            description: new.description.to_string(),
            amount: new.amount,
        })
    }

    /// List the transactions of an account in insertion order.
    pub async fn list_transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT transaction_id, amount, transaction_type, date, account_id, description
            FROM transactions
            WHERE account_id = ?
            ORDER BY transaction_id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Sum the amounts of one kind for an account. No matching rows sums to zero.
    pub async fn sum_amount_by_kind(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) as total
            FROM transactions
            WHERE transaction_type = ? AND account_id = ?
            "#,
        )
        .bind(kind.as_str())
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to sum {} transactions", kind))?;

        Ok(row.get("total"))
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let kind_str: String = row.get("transaction_type");
        let date_str: String = row.get("date");

        Ok(Transaction {
            id: row.get("transaction_id"),
            account_id: row.get("account_id"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid transaction date: {}", date_str))?,
            kind: kind_str
                .parse::<TransactionKind>()
                .with_context(|| format!("Invalid transaction type: {}", kind_str))?,
            description: row.get("description"),
            amount: row.get("amount"),
        })
    }
}

/// Returns true when the error was caused by a foreign key constraint in the store.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation()
        )
    })
}
