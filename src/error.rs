use crate::domain::narration::NarrationError;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Narration(#[from] NarrationError),
}

impl AppError {
    /// Pipeline stage that failed, for the fatal log line
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Narration(err) => err.stage(),
        }
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
