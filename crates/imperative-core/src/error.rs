use std::fmt;

/// Errors raised by the controller lifecycle.
///
/// A caller-initiated rejection is not an error in this sense: it is the
/// `Err` outcome carried by the controller's promise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("controller #{index} was already created")]
    DoubleCreate { index: usize },
    #[error("mount adapter contract violated: {reason}")]
    AdapterContractViolation { reason: String },
    #[error("controller #{index} is not mounted yet")]
    NotMounted { index: usize },
    #[error("controller #{index} has been destroyed")]
    Destroyed { index: usize },
    #[error("container {id} is not known to the document")]
    UnknownContainer { id: u64 },
}

impl Error {
    pub fn adapter(reason: impl Into<String>) -> Self {
        Error::AdapterContractViolation {
            reason: reason.into(),
        }
    }

    /// Programmer errors that should never be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DoubleCreate { .. } | Error::AdapterContractViolation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Default rejection reason carried by a controller's promise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rejection {
    reason: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected: {}", self.reason)
    }
}

impl std::error::Error for Rejection {}

impl From<&str> for Rejection {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}

impl From<String> for Rejection {
    fn from(reason: String) -> Self {
        Self::new(reason)
    }
}
