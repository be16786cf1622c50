use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::domain::{Deposit, Entry, EntryId, Expense, LedgerKey, NewDeposit, NewExpense};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for persisting and querying the deposits and expenses of each ledger.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the underlying pool. Every later query fails.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Expense operations
    // ========================

    /// List the expenses of a ledger, most recently inserted first.
    /// Rows that cannot be decoded into a valid expense are skipped.
    pub async fn list_expenses(&self, ledger: LedgerKey) -> Result<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, amount_cents, date
            FROM expenses
            WHERE ledger_key = ?
            ORDER BY rowid DESC
            "#,
        )
        .bind(ledger.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses")?;

        Ok(rows
            .iter()
            .filter_map(|row| match Self::row_to_expense(row) {
                Ok(expense) => Some(expense),
                Err(err) => {
                    tracing::warn!(%ledger, "skipping malformed expense row: {err:#}");
                    None
                }
            })
            .collect())
    }

    /// Insert a new expense and return the stored row with its generated identifier.
    pub async fn insert_expense(&self, ledger: LedgerKey, draft: &NewExpense) -> Result<Expense> {
        let expense = Expense::from_draft(EntryId::generate(Expense::ID_PREFIX), draft.clone());

        sqlx::query(
            r#"
            INSERT INTO expenses (id, ledger_key, description, amount_cents, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.as_str())
        .bind(ledger.as_str())
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;

        tracing::debug!(%ledger, id = %expense.id, amount = expense.amount, "expense stored");
        Ok(expense)
    }

    /// Delete an expense from a ledger. Returns whether a row was removed.
    pub async fn delete_expense(&self, ledger: LedgerKey, id: &EntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND ledger_key = ?")
            .bind(id.as_str())
            .bind(ledger.as_str())
            .execute(&self.pool)
            .await
            .context("Failed to delete expense")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let id: String = row.try_get("id").context("Invalid expense id")?;
        let description: String = row
            .try_get("description")
            .context("Invalid expense description")?;
        if description.trim().is_empty() {
            bail!("Expense {} has an empty description", id);
        }

        Ok(Expense {
            id: id.into(),
            description,
            amount: Self::decode_amount(row)?,
            date: Self::decode_date(row)?,
        })
    }

    // ========================
    // Deposit operations
    // ========================

    /// List the deposits of a ledger, most recently inserted first.
    /// Rows that cannot be decoded into a valid deposit are skipped.
    pub async fn list_deposits(&self, ledger: LedgerKey) -> Result<Vec<Deposit>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, amount_cents, date
            FROM deposits
            WHERE ledger_key = ?
            ORDER BY rowid DESC
            "#,
        )
        .bind(ledger.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list deposits")?;

        Ok(rows
            .iter()
            .filter_map(|row| match Self::row_to_deposit(row) {
                Ok(deposit) => Some(deposit),
                Err(err) => {
                    tracing::warn!(%ledger, "skipping malformed deposit row: {err:#}");
                    None
                }
            })
            .collect())
    }

    /// Insert a new deposit and return the stored row with its generated identifier.
    pub async fn insert_deposit(&self, ledger: LedgerKey, draft: &NewDeposit) -> Result<Deposit> {
        let deposit = Deposit::from_draft(EntryId::generate(Deposit::ID_PREFIX), draft.clone());

        sqlx::query(
            r#"
            INSERT INTO deposits (id, ledger_key, description, amount_cents, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(deposit.id.as_str())
        .bind(ledger.as_str())
        .bind(&deposit.description)
        .bind(deposit.amount)
        .bind(deposit.date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save deposit")?;

        tracing::debug!(%ledger, id = %deposit.id, amount = deposit.amount, "deposit stored");
        Ok(deposit)
    }

    /// Delete a deposit from a ledger. Returns whether a row was removed.
    pub async fn delete_deposit(&self, ledger: LedgerKey, id: &EntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM deposits WHERE id = ? AND ledger_key = ?")
            .bind(id.as_str())
            .bind(ledger.as_str())
            .execute(&self.pool)
            .await
            .context("Failed to delete deposit")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_deposit(row: &sqlx::sqlite::SqliteRow) -> Result<Deposit> {
        let id: String = row.try_get("id").context("Invalid deposit id")?;
        let description: Option<String> = row
            .try_get("description")
            .context("Invalid deposit description")?;

        Ok(Deposit {
            id: id.into(),
            amount: Self::decode_amount(row)?,
            date: Self::decode_date(row)?,
            description: description.filter(|d| !d.trim().is_empty()),
        })
    }

    // ========================
    // Row helpers
    // ========================

    fn decode_amount(row: &sqlx::sqlite::SqliteRow) -> Result<i64> {
        let amount: i64 = row.try_get("amount_cents").context("Invalid amount")?;
        if amount < 0 {
            bail!("Negative amount: {}", amount);
        }
        Ok(amount)
    }

    fn decode_date(row: &sqlx::sqlite::SqliteRow) -> Result<NaiveDate> {
        let date_str: String = row.try_get("date").context("Invalid date")?;
        NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .with_context(|| format!("Invalid date: {}", date_str))
    }
}
