//! Domain error types.

/// Top-level error type for signalbench.
///
/// The first three variants are the core's own taxonomy; everything else
/// belongs to the plumbing around it (config, data retrieval, I/O).
#[derive(Debug, thiserror::Error)]
pub enum SignalbenchError {
    #[error("invalid strategy parameters: {reason}")]
    Parameter { reason: String },

    #[error("insufficient data for {what}: have {bars} bars, need {minimum}")]
    InsufficientData {
        what: String,
        bars: usize,
        minimum: usize,
    },

    #[error("computation error: {reason}")]
    Computation { reason: String },

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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {market} ({timeframe})")]
    NoData { market: String, timeframe: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalbenchError {
    pub fn parameter(reason: impl Into<String>) -> Self {
        SignalbenchError::Parameter {
            reason: reason.into(),
        }
    }

    pub fn computation(reason: impl Into<String>) -> Self {
        SignalbenchError::Computation {
            reason: reason.into(),
        }
    }

    pub fn data(reason: impl Into<String>) -> Self {
        SignalbenchError::Data {
            reason: reason.into(),
        }
    }
}

impl From<&SignalbenchError> for std::process::ExitCode {
    fn from(err: &SignalbenchError) -> Self {
        let code: u8 = match err {
            SignalbenchError::Io(_) => 1,
            SignalbenchError::ConfigParse { .. }
            | SignalbenchError::ConfigMissing { .. }
            | SignalbenchError::ConfigInvalid { .. } => 2,
            SignalbenchError::Data { .. } => 3,
            SignalbenchError::Parameter { .. } => 4,
            SignalbenchError::InsufficientData { .. } | SignalbenchError::NoData { .. } => 5,
            SignalbenchError::Computation { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
