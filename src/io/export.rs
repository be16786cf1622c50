use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{Deposit, Expense, LedgerKey, LedgerState, format_cents};

/// Snapshot of one ledger for export/import.
/// Collections are listed most recently added first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub ledger: LedgerKey,
    pub deposits: Vec<Deposit>,
    pub expenses: Vec<Expense>,
}

impl LedgerSnapshot {
    pub fn from_state(state: &LedgerState) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            ledger: state.key,
            deposits: state.deposits.clone(),
            expenses: state.expenses.clone(),
        }
    }
}

/// Exporter for converting a loaded ledger to various formats
pub struct Exporter<'a> {
    state: &'a LedgerState,
}

impl<'a> Exporter<'a> {
    pub fn new(state: &'a LedgerState) -> Self {
        Self { state }
    }

    /// Export deposits and expenses to CSV, newest first within each kind.
    pub fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["kind", "id", "date", "description", "amount"])?;

        let mut count = 0;
        for deposit in self.state.ordered_deposits() {
            let date = deposit.date.to_string();
            let amount = format_cents(deposit.amount);
            csv_writer.write_record([
                "deposit",
                deposit.id.as_str(),
                date.as_str(),
                deposit.description.as_deref().unwrap_or_default(),
                amount.as_str(),
            ])?;
            count += 1;
        }
        for expense in self.state.ordered_expenses() {
            let date = expense.date.to_string();
            let amount = format_cents(expense.amount);
            csv_writer.write_record([
                "expense",
                expense.id.as_str(),
                date.as_str(),
                expense.description.as_str(),
                amount.as_str(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the ledger as a pretty-printed JSON snapshot.
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot::from_state(self.state);

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
