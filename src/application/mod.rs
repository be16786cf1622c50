// Application layer - use cases and orchestration between the store,
// the ledger aggregator and the presentation.

pub mod error;
pub mod form;
mod service;
mod summary;

pub use error::*;
pub use form::{DepositForm, ExpenseForm};
pub use service::*;
pub use summary::*;
