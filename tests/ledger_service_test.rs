mod common;

use anyhow::Result;
use famledger::application::{AppError, DepositForm, ExpenseForm, LedgerService};
use famledger::domain::{EntryId, LedgerKey};

use common::{
    deposit, expense, parse_date, raw_pool, seed_dad_ledger, test_service, test_service_with_path,
};

#[tokio::test]
async fn test_totals_survive_reload() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let state = seed_dad_ledger(&service).await?;

    assert_eq!(state.total_deposited(), 5_000_000);
    assert_eq!(state.total_spent(), 154_000);
    assert_eq!(state.current_balance(), 4_846_000);

    let reloaded = service.load(LedgerKey::Dad).await?;
    assert_eq!(reloaded, state);
    assert_eq!(reloaded.current_balance(), 4_846_000);

    let ordered = reloaded.ordered_expenses();
    assert_eq!(ordered[0].date, parse_date("2026-01-12"));
    assert_eq!(ordered[1].date, parse_date("2026-01-11"));

    Ok(())
}

#[tokio::test]
async fn test_empty_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let state = service.load(LedgerKey::Dad).await?;

    assert!(state.is_empty());
    assert_eq!(state.total_deposited(), 0);
    assert_eq!(state.total_spent(), 0);
    assert_eq!(state.current_balance(), 0);
    assert!(state.latest_deposit().is_none());

    Ok(())
}

#[tokio::test]
async fn test_ledgers_are_isolated() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let dad = seed_dad_ledger(&service).await?;

    let mut me = service.load(LedgerKey::Me).await?;
    assert!(me.is_empty());
    service
        .add_deposit(&mut me, deposit(1_000_000, "2026-01-05"))
        .await?;

    // Deleting a dad entry through the me ledger is a no-op
    let dad_expense = dad.expenses[0].id.clone();
    assert!(!service.delete_expense(&mut me, &dad_expense).await?);

    let dad = service.load(LedgerKey::Dad).await?;
    assert_eq!(dad.expenses.len(), 2);
    assert_eq!(service.load(LedgerKey::Me).await?.current_balance(), 1_000_000);

    let household = service.household().await;
    assert_eq!(household.dad_balance, 4_846_000);
    assert_eq!(household.balance_after_dad, 1_000_000 - 4_846_000);

    Ok(())
}

#[tokio::test]
async fn test_same_date_tie_break_follows_insertion() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut state = service.load(LedgerKey::Dad).await?;

    let a = service
        .add_deposit(&mut state, deposit(100, "2026-02-01"))
        .await?;
    let b = service
        .add_deposit(&mut state, deposit(200, "2026-02-01"))
        .await?;

    let ordered = state.ordered_deposits();
    assert_eq!(ordered[0].id, b.id);
    assert_eq!(ordered[1].id, a.id);

    // The store hands rows back newest insertion first, so the order holds after reload
    let reloaded = service.load(LedgerKey::Dad).await?;
    assert_eq!(reloaded.ordered_deposits(), ordered);
    assert_eq!(reloaded.latest_deposit().map(|d| d.id), Some(b.id));

    Ok(())
}

#[tokio::test]
async fn test_add_then_delete_restores_state() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut state = seed_dad_ledger(&service).await?;
    let before = state.clone();

    let added = service
        .add_expense(&mut state, expense("Bus fare", 12_000, "2026-01-12"))
        .await?;
    assert!(added.id.as_str().starts_with("exp-"));
    assert_eq!(state.expenses[0], added);

    assert!(service.delete_expense(&mut state, &added.id).await?);
    assert_eq!(state, before);
    assert_eq!(service.load(LedgerKey::Dad).await?, before);

    Ok(())
}

#[tokio::test]
async fn test_delete_twice_is_noop() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut state = seed_dad_ledger(&service).await?;
    let id = state.deposits[0].id.clone();

    assert!(service.delete_deposit(&mut state, &id).await?);
    let after_first = state.clone();
    assert!(!service.delete_deposit(&mut state, &id).await?);
    assert_eq!(state, after_first);
    assert_eq!(state.current_balance(), -154_000);

    assert!(
        !service
            .delete_expense(&mut state, &EntryId::from("exp-unknown"))
            .await?
    );

    Ok(())
}

#[tokio::test]
async fn test_failed_write_leaves_state_unchanged() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut state = seed_dad_ledger(&service).await?;
    let before = state.clone();

    service.close().await;

    let result = service
        .add_expense(&mut state, expense("Taxi", 500, "2026-01-13"))
        .await;
    assert!(matches!(result, Err(AppError::Database(_))));
    assert_eq!(state, before);

    let id = state.expenses[0].id.clone();
    assert!(service.delete_expense(&mut state, &id).await.is_err());
    assert_eq!(state, before);

    Ok(())
}

#[tokio::test]
async fn test_failed_read_degrades_to_empty_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed_dad_ledger(&service).await?;
    service.close().await;

    assert!(service.load(LedgerKey::Dad).await.is_err());

    let loaded = service.load_or_empty(LedgerKey::Dad).await;
    assert!(loaded.state.is_empty());
    assert_eq!(loaded.state.key, LedgerKey::Dad);
    let message = loaded.error.clone().expect("read failure should carry a message");
    assert!(!message.is_empty());

    let summary = loaded.summary();
    assert_eq!(summary.current_balance, 0);
    assert_eq!(summary.error.as_deref(), Some(message.as_str()));

    Ok(())
}

#[tokio::test]
async fn test_malformed_rows_are_skipped() -> Result<()> {
    let (service, _temp, db_path) = test_service_with_path().await?;
    seed_dad_ledger(&service).await?;

    let pool = raw_pool(&db_path).await?;
    for sql in [
        "INSERT INTO expenses (id, ledger_key, description, amount_cents, date) VALUES ('exp-neg', 'dad', 'Refund', -500, '2026-01-10')",
        "INSERT INTO expenses (id, ledger_key, description, amount_cents, date) VALUES ('exp-blank', 'dad', '   ', 500, '2026-01-10')",
        "INSERT INTO expenses (id, ledger_key, description, amount_cents, date) VALUES ('exp-date', 'dad', 'Tea', 500, 'yesterday')",
        "INSERT INTO deposits (id, ledger_key, description, amount_cents, date) VALUES ('dep-date', 'dad', NULL, 500, '2026-13-40')",
    ] {
        sqlx::query(sql).execute(&pool).await?;
    }
    pool.close().await;

    let state = service.load(LedgerKey::Dad).await?;
    assert_eq!(state.expenses.len(), 2);
    assert_eq!(state.deposits.len(), 1);
    assert_eq!(state.current_balance(), 4_846_000);

    Ok(())
}

#[tokio::test]
async fn test_form_input_flows_into_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut state = service.load(LedgerKey::Me).await?;

    let draft = ExpenseForm {
        description: "  Lunch ".into(),
        amount: "12.50".into(),
        date: Some("2026-03-02".into()),
    }
    .validate()?;
    let stored = service.add_expense(&mut state, draft).await?;
    assert_eq!(stored.description, "Lunch");
    assert_eq!(stored.amount, 1250);

    let draft = DepositForm {
        amount: "100".into(),
        date: Some("2026-03-01".into()),
        description: Some("Pocket money".into()),
    }
    .validate()?;
    let stored = service.add_deposit(&mut state, draft).await?;
    assert_eq!(stored.description.as_deref(), Some("Pocket money"));

    let reloaded = service.load(LedgerKey::Me).await?;
    assert_eq!(
        reloaded.deposits[0].description.as_deref(),
        Some("Pocket money")
    );
    assert_eq!(reloaded.current_balance(), 10_000 - 1250);

    let rejected = ExpenseForm {
        description: "Lunch".into(),
        amount: "0".into(),
        date: None,
    }
    .validate();
    assert!(matches!(rejected, Err(AppError::InvalidInput(_))));

    Ok(())
}

#[tokio::test]
async fn test_connect_to_existing_database() -> Result<()> {
    let (service, _temp, db_path) = test_service_with_path().await?;
    seed_dad_ledger(&service).await?;
    service.close().await;

    let reopened = LedgerService::connect(&db_path).await?;
    let state = reopened.load(LedgerKey::Dad).await?;
    assert_eq!(state.current_balance(), 4_846_000);

    Ok(())
}
