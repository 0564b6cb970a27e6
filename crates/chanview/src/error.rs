use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable class + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an access denial.
    pub fn forbidden(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Forbidden, origin, message)
    }

    /// Construct a missing-resource error.
    pub fn not_found(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, origin, message)
    }

    /// Construct an invariant violation.
    ///
    /// These mark defects (malformed rows, invalid caller/option combinations),
    /// never ordinary access denials.
    pub fn invariant(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, origin, message)
    }

    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self.class, ErrorClass::Forbidden)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self.class, ErrorClass::InvariantViolation)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorClass {
    /// The caller lacks the rights for this operation.
    Forbidden,

    /// The named resource does not exist.
    NotFound,

    /// A contract this core relies on was broken; no data is returned.
    InvariantViolation,

    /// The underlying store failed.
    Unavailable,

    /// The caller cannot remediate this.
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::InvariantViolation => "invariant_violation",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Analytic,
    Filter,
    Index,
    Query,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Analytic => "analytic",
            Self::Filter => "filter",
            Self::Index => "index",
            Self::Query => "query",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
