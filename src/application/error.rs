use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// User input rejected before reaching the store. The message is shown as-is.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// Single user-visible line describing the failure, without the error chain.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => {
                "Could not reach the ledger store. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}
