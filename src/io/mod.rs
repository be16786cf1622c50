pub mod export;
pub mod import;

pub use export::{Exporter, LedgerSnapshot};
pub use import::{ImportOptions, ImportResult, Importer, SanitizedLedger, sanitize_snapshot};
