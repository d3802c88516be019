use core::fmt;

/// Level-start validation failures. These are the only errors the engine
/// surfaces to the caller; everything per-tick degrades in place.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    NonPositiveMaxSpeed { value: f64 },
    ZeroHistoryCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveMaxSpeed { value } => {
                write!(f, "max_speed must be positive and finite, got {value}")
            }
            Self::ZeroHistoryCapacity => write!(f, "history capacity must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failures of the external inference backend. All variants are recoverable:
/// the model strategy answers them with the heuristic fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceError {
    Timeout { deadline_ms: u64 },
    Backend { message: String },
    WorkerGone,
    NonFiniteOutput,
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { deadline_ms } => {
                write!(f, "inference call exceeded {deadline_ms}ms deadline")
            }
            Self::Backend { message } => write!(f, "backend failure: {message}"),
            Self::WorkerGone => write!(f, "inference worker is no longer running"),
            Self::NonFiniteOutput => write!(f, "backend produced non-finite output"),
        }
    }
}

impl std::error::Error for InferenceError {}
