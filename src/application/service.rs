use crate::domain::{
    Deposit, EntryId, Expense, LedgerKey, LedgerState, NewDeposit, NewExpense,
};
use crate::storage::Repository;

use super::{AppError, HouseholdSummary, LedgerSummary};

/// Application service providing the read/compute/mutate interface for both ledgers.
/// Local state is only changed after the store has confirmed a write.
pub struct LedgerService {
    repo: Repository,
}

/// A ledger loaded for display. When the read failed, `state` is empty and
/// `error` holds the message to show.
#[derive(Debug, Clone)]
pub struct LoadedLedger {
    pub state: LedgerState,
    pub error: Option<String>,
}

impl LoadedLedger {
    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary::from_state(&self.state).with_error(self.error.clone())
    }
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path, creating it if needed.
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

    /// Close the store connection.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    // ========================
    // Reads
    // ========================

    /// Load both collections of a ledger.
    pub async fn load(&self, ledger: LedgerKey) -> Result<LedgerState, AppError> {
        let deposits = self.repo.list_deposits(ledger).await?;
        let expenses = self.repo.list_expenses(ledger).await?;
        tracing::debug!(
            %ledger,
            deposits = deposits.len(),
            expenses = expenses.len(),
            "ledger loaded"
        );
        Ok(LedgerState::new(ledger, deposits, expenses))
    }

    /// Load a ledger, degrading to an empty one with a message when the read fails.
    pub async fn load_or_empty(&self, ledger: LedgerKey) -> LoadedLedger {
        match self.load(ledger).await {
            Ok(state) => LoadedLedger { state, error: None },
            Err(err) => {
                tracing::error!(%ledger, "failed to load ledger: {err:#}");
                LoadedLedger {
                    state: LedgerState::empty(ledger),
                    error: Some(err.user_message()),
                }
            }
        }
    }

    /// Personal ledger summary together with the dad ledger balance.
    pub async fn household(&self) -> HouseholdSummary {
        let me = self.load_or_empty(LedgerKey::Me).await;
        let dad = self.load_or_empty(LedgerKey::Dad).await;
        HouseholdSummary::new(me.summary(), &dad.summary())
    }

    // ========================
    // Writes
    // ========================

    /// Store a new expense, then prepend it to `state`.
    /// On failure `state` is left untouched.
    pub async fn add_expense(
        &self,
        state: &mut LedgerState,
        draft: NewExpense,
    ) -> Result<Expense, AppError> {
        if draft.description.trim().is_empty() || draft.amount < 0 {
            return Err(AppError::InvalidInput(format!(
                "Refusing to store invalid expense: {:?}",
                draft
            )));
        }

        let stored = self.repo.insert_expense(state.key, &draft).await?;
        *state = state.with_expense(stored.clone());
        tracing::info!(ledger = %state.key, id = %stored.id, "expense added");
        Ok(stored)
    }

    /// Store a new deposit, then prepend it to `state`.
    /// On failure `state` is left untouched.
    pub async fn add_deposit(
        &self,
        state: &mut LedgerState,
        draft: NewDeposit,
    ) -> Result<Deposit, AppError> {
        if draft.amount < 0 {
            return Err(AppError::InvalidInput(format!(
                "Refusing to store invalid deposit: {:?}",
                draft
            )));
        }

        let stored = self.repo.insert_deposit(state.key, &draft).await?;
        *state = state.with_deposit(stored.clone());
        tracing::info!(ledger = %state.key, id = %stored.id, "deposit added");
        Ok(stored)
    }

    /// Delete an expense from the store, then from `state`.
    /// Returns whether the store held such an expense; unknown ids are not an error.
    pub async fn delete_expense(
        &self,
        state: &mut LedgerState,
        id: &EntryId,
    ) -> Result<bool, AppError> {
        let removed = self.repo.delete_expense(state.key, id).await?;
        *state = state.without_expense(id);
        if removed {
            tracing::info!(ledger = %state.key, %id, "expense deleted");
        } else {
            tracing::debug!(ledger = %state.key, %id, "no expense to delete");
        }
        Ok(removed)
    }

    /// Delete a deposit from the store, then from `state`.
    /// Returns whether the store held such a deposit; unknown ids are not an error.
    pub async fn delete_deposit(
        &self,
        state: &mut LedgerState,
        id: &EntryId,
    ) -> Result<bool, AppError> {
        let removed = self.repo.delete_deposit(state.key, id).await?;
        *state = state.without_deposit(id);
        if removed {
            tracing::info!(ledger = %state.key, %id, "deposit deleted");
        } else {
            tracing::debug!(ledger = %state.key, %id, "no deposit to delete");
        }
        Ok(removed)
    }
}
