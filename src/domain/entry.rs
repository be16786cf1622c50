use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

/// The closed set of ledgers tracked by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKey {
    /// The shared ledger shown on the read-only dashboard.
    Dad,
    /// The personal ledger.
    Me,
}

impl LedgerKey {
    pub const ALL: [LedgerKey; 2] = [LedgerKey::Dad, LedgerKey::Me];

    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKey::Dad => "dad",
            LedgerKey::Me => "me",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dad" => Some(LedgerKey::Dad),
            "me" => Some(LedgerKey::Me),
            _ => None,
        }
    }
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque identifier of an expense or deposit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh identifier such as `exp-2f0c...`.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Money spent out of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: EntryId,
    pub description: String,
    /// Amount in cents (never negative)
    pub amount: Cents,
    pub date: NaiveDate,
}

/// Money paid into a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: EntryId,
    /// Amount in cents (never negative)
    pub amount: Cents,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An expense that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub description: String,
    pub amount: Cents,
    pub date: NaiveDate,
}

/// A deposit that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeposit {
    pub amount: Cents,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl NewDeposit {
    pub fn new(amount: Cents, date: NaiveDate) -> Self {
        Self {
            amount,
            date,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Common view over deposits and expenses used by the aggregator.
pub trait Entry: Clone {
    type Draft;

    /// Prefix used when generating identifiers for this kind of entry.
    const ID_PREFIX: &'static str;

    fn id(&self) -> &EntryId;
    fn amount(&self) -> Cents;
    fn date(&self) -> NaiveDate;
    fn from_draft(id: EntryId, draft: Self::Draft) -> Self;
}

impl Entry for Expense {
    type Draft = NewExpense;
    const ID_PREFIX: &'static str = "exp";

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn amount(&self) -> Cents {
        self.amount
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn from_draft(id: EntryId, draft: NewExpense) -> Self {
        Self {
            id,
            description: draft.description,
            amount: draft.amount,
            date: draft.date,
        }
    }
}

impl Entry for Deposit {
    type Draft = NewDeposit;
    const ID_PREFIX: &'static str = "dep";

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn amount(&self) -> Cents {
        self.amount
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn from_draft(id: EntryId, draft: NewDeposit) -> Self {
        Self {
            id,
            amount: draft.amount,
            date: draft.date,
            description: draft.description,
        }
    }
}
