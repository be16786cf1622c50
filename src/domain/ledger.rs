use std::cmp::Reverse;

use super::{Cents, Deposit, Entry, EntryId, Expense, LedgerKey};

/// Sum of the amounts of a collection of entries. Empty collections sum to zero.
pub fn total_amount<E: Entry>(entries: &[E]) -> Cents {
    entries.iter().map(|entry| entry.amount()).sum()
}

pub fn total_deposited(deposits: &[Deposit]) -> Cents {
    total_amount(deposits)
}

pub fn total_spent(expenses: &[Expense]) -> Cents {
    total_amount(expenses)
}

/// Balance = total deposited - total spent. There is no floor at zero.
pub fn current_balance(deposits: &[Deposit], expenses: &[Expense]) -> Cents {
    total_deposited(deposits) - total_spent(expenses)
}

/// Entries sorted by date, newest first.
/// The sort is stable and compares dates only, so entries sharing a date keep
/// their collection order (most recently added first, since additions prepend).
pub fn order_by_recency<E: Entry>(entries: &[E]) -> Vec<E> {
    let mut ordered = entries.to_vec();
    ordered.sort_by_key(|entry| Reverse(entry.date()));
    ordered
}

/// First entry of an already ordered sequence.
pub fn latest_entry<E: Entry>(ordered: &[E]) -> Option<&E> {
    ordered.first()
}

/// Assign a fresh identifier to `draft` and prepend it to the collection.
/// Returns the new collection together with the identifier that was assigned.
pub fn add_entry<E: Entry>(entries: &[E], draft: E::Draft) -> (Vec<E>, EntryId) {
    let id = EntryId::generate(E::ID_PREFIX);
    let entry = E::from_draft(id.clone(), draft);
    (prepend_entry(entries, entry), id)
}

/// Prepend an entry whose identifier was already assigned (e.g. by the store).
pub fn prepend_entry<E: Entry>(entries: &[E], entry: E) -> Vec<E> {
    let mut updated = Vec::with_capacity(entries.len() + 1);
    updated.push(entry);
    updated.extend_from_slice(entries);
    updated
}

/// Remove the entry with the given identifier. Unknown identifiers are a no-op.
pub fn delete_entry<E: Entry>(entries: &[E], id: &EntryId) -> Vec<E> {
    entries
        .iter()
        .filter(|entry| entry.id() != id)
        .cloned()
        .collect()
}

/// In-memory state of a single ledger.
///
/// Collections are kept in insertion order, newest first. Derived values are
/// recomputed on every call and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    pub key: LedgerKey,
    pub deposits: Vec<Deposit>,
    pub expenses: Vec<Expense>,
}

impl LedgerState {
    pub fn empty(key: LedgerKey) -> Self {
        Self {
            key,
            deposits: Vec::new(),
            expenses: Vec::new(),
        }
    }

    pub fn new(key: LedgerKey, deposits: Vec<Deposit>, expenses: Vec<Expense>) -> Self {
        Self {
            key,
            deposits,
            expenses,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty() && self.expenses.is_empty()
    }

    pub fn total_deposited(&self) -> Cents {
        total_deposited(&self.deposits)
    }

    pub fn total_spent(&self) -> Cents {
        total_spent(&self.expenses)
    }

    pub fn current_balance(&self) -> Cents {
        current_balance(&self.deposits, &self.expenses)
    }

    pub fn ordered_expenses(&self) -> Vec<Expense> {
        order_by_recency(&self.expenses)
    }

    pub fn ordered_deposits(&self) -> Vec<Deposit> {
        order_by_recency(&self.deposits)
    }

    pub fn latest_deposit(&self) -> Option<Deposit> {
        latest_entry(&self.ordered_deposits()).cloned()
    }

    pub fn with_expense(&self, expense: Expense) -> Self {
        Self {
            expenses: prepend_entry(&self.expenses, expense),
            ..self.clone()
        }
    }

    pub fn with_deposit(&self, deposit: Deposit) -> Self {
        Self {
            deposits: prepend_entry(&self.deposits, deposit),
            ..self.clone()
        }
    }

    pub fn without_expense(&self, id: &EntryId) -> Self {
        Self {
            expenses: delete_entry(&self.expenses, id),
            ..self.clone()
        }
    }

    pub fn without_deposit(&self, id: &EntryId) -> Self {
        Self {
            deposits: delete_entry(&self.deposits, id),
            ..self.clone()
        }
    }
}
