use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;

use crate::application::LedgerService;
use crate::domain::{Deposit, EntryId, Expense, LedgerKey, LedgerState, NewDeposit, NewExpense};

/// Entries recovered from an untrusted snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedLedger {
    pub deposits: Vec<Deposit>,
    pub expenses: Vec<Expense>,
    /// Number of records dropped because they were malformed or duplicated.
    pub skipped: usize,
}

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
}

/// Recover whatever valid entries a JSON document holds.
///
/// Anything that is not an object yields an empty ledger, a missing or
/// non-array collection is treated as empty, and each malformed record is
/// dropped. Duplicate identifiers keep their first occurrence.
pub fn sanitize_snapshot(value: &Value) -> SanitizedLedger {
    let Some(object) = value.as_object() else {
        return SanitizedLedger::default();
    };

    let mut sanitized = SanitizedLedger::default();

    let mut seen = HashSet::new();
    for record in records(object.get("deposits")) {
        match parse_deposit(record).filter(|d| seen.insert(d.id.clone())) {
            Some(deposit) => sanitized.deposits.push(deposit),
            None => sanitized.skipped += 1,
        }
    }

    let mut seen = HashSet::new();
    for record in records(object.get("expenses")) {
        match parse_expense(record).filter(|e| seen.insert(e.id.clone())) {
            Some(expense) => sanitized.expenses.push(expense),
            None => sanitized.skipped += 1,
        }
    }

    if sanitized.skipped > 0 {
        tracing::warn!(skipped = sanitized.skipped, "dropped malformed snapshot records");
    }
    sanitized
}

fn records(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn parse_id(record: &Value) -> Option<EntryId> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .map(EntryId::from)
}

fn parse_amount(record: &Value) -> Option<i64> {
    record
        .get("amount")
        .and_then(Value::as_i64)
        .filter(|amount| *amount >= 0)
}

fn parse_date(record: &Value) -> Option<NaiveDate> {
    record
        .get("date")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn parse_deposit(record: &Value) -> Option<Deposit> {
    let description = match record.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return None,
    };

    Some(Deposit {
        id: parse_id(record)?,
        amount: parse_amount(record)?,
        date: parse_date(record)?,
        description,
    })
}

fn parse_expense(record: &Value) -> Option<Expense> {
    let description = record
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())?;

    Some(Expense {
        id: parse_id(record)?,
        description: description.to_string(),
        amount: parse_amount(record)?,
        date: parse_date(record)?,
    })
}

/// Importer for loading snapshot data into a ledger
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import a JSON snapshot into `state`'s ledger.
    ///
    /// Entries are stored oldest first so the snapshot's insertion order is
    /// preserved, and receive fresh identifiers from the store.
    pub async fn import_json<R: Read>(
        &self,
        reader: R,
        state: &mut LedgerState,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let value: Value = serde_json::from_reader(reader).context("Snapshot is not valid JSON")?;
        let sanitized = sanitize_snapshot(&value);

        if let Some(source) = value.get("ledger").and_then(Value::as_str) {
            if LedgerKey::from_str(source) != Some(state.key) {
                tracing::info!(from = source, to = %state.key, "importing into a different ledger");
            }
        }

        let total = sanitized.deposits.len() + sanitized.expenses.len();
        if options.dry_run {
            return Ok(ImportResult {
                imported: total,
                skipped: sanitized.skipped,
            });
        }

        for deposit in sanitized.deposits.into_iter().rev() {
            let draft = NewDeposit {
                amount: deposit.amount,
                date: deposit.date,
                description: deposit.description,
            };
            self.service.add_deposit(state, draft).await?;
        }
        for expense in sanitized.expenses.into_iter().rev() {
            let draft = NewExpense {
                description: expense.description,
                amount: expense.amount,
                date: expense.date,
            };
            self.service.add_expense(state, draft).await?;
        }

        Ok(ImportResult {
            imported: total,
            skipped: sanitized.skipped,
        })
    }
}
