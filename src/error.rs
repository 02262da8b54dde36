use std::fmt;

// Error handling types
pub type TimeLockResult<T> = Result<T, TimeLockError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeLockError {
    /// A caller-supplied parameter is out of range or malformed.
    BadParameter(String),
    /// The puzzle builder was finalized before every field was set.
    IncompletePuzzle(String),
    /// The timing parameter is not divisible by the segment count.
    BadSegmentation(String),
    /// A solver was handed a puzzle whose modulus differs from the key's.
    ModulusMismatch(String),
    /// The OS entropy source failed.
    EntropyUnavailable(String),
    /// The backing store rejected a record.
    StoreError(String),
    /// The worker pool could not be constructed.
    ThreadError(String),
}

impl fmt::Display for TimeLockError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimeLockError::BadParameter(s) => write!(f, "Bad parameter: {}", s),
            TimeLockError::IncompletePuzzle(s) => write!(f, "Incomplete puzzle: {}", s),
            TimeLockError::BadSegmentation(s) => write!(f, "Bad segmentation: {}", s),
            TimeLockError::ModulusMismatch(s) => write!(f, "Modulus mismatch: {}", s),
            TimeLockError::EntropyUnavailable(s) => write!(f, "Entropy unavailable: {}", s),
            TimeLockError::StoreError(s) => write!(f, "Store error: {}", s),
            TimeLockError::ThreadError(s) => write!(f, "Thread error: {}", s),
        }
    }
}

impl std::error::Error for TimeLockError {}

impl From<rand::Error> for TimeLockError {
    fn from(error: rand::Error) -> Self {
        TimeLockError::EntropyUnavailable(error.to_string())
    }
}

impl From<rusqlite::Error> for TimeLockError {
    fn from(error: rusqlite::Error) -> Self {
        TimeLockError::StoreError(error.to_string())
    }
}

impl From<serde_json::Error> for TimeLockError {
    fn from(error: serde_json::Error) -> Self {
        TimeLockError::StoreError(format!("record serialization: {}", error))
    }
}
