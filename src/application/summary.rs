use serde::Serialize;

use crate::domain::{Cents, Deposit, Expense, LedgerKey, LedgerState};

/// Derived view of a single ledger, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub ledger: LedgerKey,
    pub total_deposited: Cents,
    pub total_spent: Cents,
    pub current_balance: Cents,
    pub latest_deposit: Option<Deposit>,
    pub expenses: Vec<Expense>,
    pub deposits: Vec<Deposit>,
    /// Read failure message when the view was degraded to an empty ledger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LedgerSummary {
    pub fn from_state(state: &LedgerState) -> Self {
        let deposits = state.ordered_deposits();
        Self {
            ledger: state.key,
            total_deposited: state.total_deposited(),
            total_spent: state.total_spent(),
            current_balance: state.current_balance(),
            latest_deposit: deposits.first().cloned(),
            expenses: state.ordered_expenses(),
            deposits,
            error: None,
        }
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

/// Personal ledger shown next to the shared one.
#[derive(Debug, Clone, Serialize)]
pub struct HouseholdSummary {
    pub me: LedgerSummary,
    pub dad_balance: Cents,
    /// My balance minus the dad ledger balance.
    pub balance_after_dad: Cents,
    /// Read failure message of the dad ledger, whose balance then shows as zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dad_error: Option<String>,
}

impl HouseholdSummary {
    pub fn new(me: LedgerSummary, dad: &LedgerSummary) -> Self {
        Self {
            balance_after_dad: me.current_balance - dad.current_balance,
            dad_balance: dad.current_balance,
            dad_error: dad.error.clone(),
            me,
        }
    }
}
