//! Top-level error taxonomy.
//!
//! Per-ticker recoverable conditions (no data, short history) are not errors;
//! they surface as skip values in the universe builder and level calculator.
//! Everything here aborts the run and maps to a stable process exit code.

/// Top-level error type for pivotscreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("table store error: {reason}")]
    TableStore { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("notification failed: {reason}")]
    Notify { reason: String },

    #[error("empty universe for {date}: no ticker survived the filters")]
    EmptyUniverse { date: chrono::NaiveDate },

    #[error("no level records produced for {date}")]
    NoRecords { date: chrono::NaiveDate },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenerError {
    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::DataSource { .. } | ScreenerError::TableStore { .. } => 3,
            ScreenerError::Notify { .. } => 4,
            ScreenerError::EmptyUniverse { .. } | ScreenerError::NoRecords { .. } => 5,
        }
    }
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
