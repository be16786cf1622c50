// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use famledger::application::LedgerService;
use famledger::domain::{LedgerKey, LedgerState, NewDeposit, NewExpense};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let (service, temp_dir, _) = test_service_with_path().await?;
    Ok((service, temp_dir))
}

/// Same as `test_service`, also returning the database path
pub async fn test_service_with_path() -> Result<(LedgerService, TempDir, String)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_path = db_path.to_str().unwrap().to_string();
    let service = LedgerService::init(&db_path).await?;
    Ok((service, temp_dir, db_path))
}

/// Open a second raw connection to the test database
pub async fn raw_pool(db_path: &str) -> Result<SqlitePool> {
    Ok(SqlitePool::connect(&format!("sqlite:{}", db_path)).await?)
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn expense(description: &str, amount: i64, date: &str) -> NewExpense {
    NewExpense {
        description: description.to_string(),
        amount,
        date: parse_date(date),
    }
}

pub fn deposit(amount: i64, date: &str) -> NewDeposit {
    NewDeposit::new(amount, parse_date(date))
}

/// Test fixture: the dad ledger from the dashboard example
pub async fn seed_dad_ledger(service: &LedgerService) -> Result<LedgerState> {
    let mut state = service.load(LedgerKey::Dad).await?;
    service
        .add_deposit(&mut state, deposit(5_000_000, "2026-01-04"))
        .await?;
    service
        .add_expense(&mut state, expense("Pharmacy", 104_000, "2026-01-11"))
        .await?;
    service
        .add_expense(&mut state, expense("Groceries", 50_000, "2026-01-12"))
        .await?;
    Ok(state)
}
