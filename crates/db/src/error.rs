//! Store error taxonomy and backend error classification.

use bubblebank_core::ledger::LedgerError;
use bubblebank_shared::AppError;
use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// Result type alias using `StoreError`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Which kind of integrity rule a write broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Rejected before reaching the database.
    Invalid,
    /// A referenced row is missing, or a row is still referenced (SQLSTATE 23503).
    ForeignKey,
    /// Duplicate key (SQLSTATE 23505).
    Unique,
    /// CHECK constraint or other class-23 failure.
    Check,
    /// NULL in a NOT NULL column (SQLSTATE 23502).
    NotNull,
}

/// Errors returned by every store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row for the given key.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Table-level name of the missing row ("account", "entry", "transfer").
        entity: &'static str,
        /// The key that was looked up.
        id: i64,
    },

    /// An integrity rule rejected the write.
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// What kind of rule was broken.
        kind: ConstraintKind,
        /// Human-readable detail.
        message: String,
    },

    /// A transfer would overdraw its source account.
    #[error("Insufficient funds in account {account_id}: balance would be {balance}")]
    InsufficientFunds {
        /// The account that would be overdrawn.
        account_id: i64,
        /// The balance the debit would produce.
        balance: i64,
    },

    /// The database aborted the transaction to preserve serializability
    /// (SQLSTATE 40001 or deadlock 40P01).
    #[error("Serialization failure: {0}")]
    SerializationFailure(String),

    /// The pool or the connection failed.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The transaction ran past its deadline.
    #[error("Transaction timed out")]
    Timeout,

    /// The connection failed after a statement or `COMMIT` was sent, so the
    /// write may or may not have been applied.
    #[error("Outcome unknown: {0}")]
    OutcomeUnknown(String),

    /// Any other backend error.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Shorthand for a [`StoreError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for a [`ConstraintKind::Invalid`] violation.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            kind: ConstraintKind::Invalid,
            message: message.into(),
        }
    }

    /// Returns the error code for API responses and span attributes.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::SerializationFailure(_) => "SERIALIZATION_FAILURE",
            Self::Connectivity(_) => "CONNECTIVITY_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::OutcomeUnknown(_) => "OUTCOME_UNKNOWN",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::ConstraintViolation { kind, .. } => match kind {
                ConstraintKind::ForeignKey | ConstraintKind::Unique => 409,
                ConstraintKind::Invalid | ConstraintKind::Check | ConstraintKind::NotNull => 400,
            },
            Self::InsufficientFunds { .. } => 422,
            Self::SerializationFailure(_)
            | Self::Connectivity(_)
            | Self::Timeout
            | Self::OutcomeUnknown(_) => 503,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if re-running the whole operation may succeed.
    ///
    /// `Connectivity` is only raised before anything reached the server.
    /// `Timeout` and `OutcomeUnknown` are excluded: the write may have landed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SerializationFailure(_) | Self::Connectivity(_))
    }
}

/// Maps a Postgres SQLSTATE to a [`StoreError`].
#[must_use]
pub fn classify_sqlstate(code: &str, message: &str) -> StoreError {
    let constraint = |kind| StoreError::ConstraintViolation {
        kind,
        message: message.to_string(),
    };

    match code {
        "40001" | "40P01" => StoreError::SerializationFailure(message.to_string()),
        "23503" => constraint(ConstraintKind::ForeignKey),
        "23505" => constraint(ConstraintKind::Unique),
        "23502" => constraint(ConstraintKind::NotNull),
        c if c.starts_with("23") => constraint(ConstraintKind::Check),
        "53300" | "57P01" | "57P02" | "57P03" => StoreError::Connectivity(message.to_string()),
        c if c.starts_with("08") => StoreError::Connectivity(message.to_string()),
        "57014" => StoreError::Timeout,
        _ => StoreError::Database(format!("{code}: {message}")),
    }
}

/// `sent` is true once the statement may have reached the server.
fn classify_sqlx(err: &sqlx::Error, sent: bool) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => classify_sqlstate(&code, db_err.message()),
            None => StoreError::Database(db_err.message().to_string()),
        },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Connectivity(err.to_string())
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::WorkerCrashed => {
            if sent {
                StoreError::OutcomeUnknown(err.to_string())
            } else {
                StoreError::Connectivity(err.to_string())
            }
        }
        _ => StoreError::Database(err.to_string()),
    }
}

/// Classifies a failed `COMMIT`. A lost connection at this point leaves the
/// transaction's fate unknown, so it must not be retried.
pub(crate) fn classify_commit_error(err: DbErr) -> StoreError {
    match StoreError::from(err) {
        StoreError::Connectivity(message) => StoreError::OutcomeUnknown(message),
        other => other,
    }
}

/// Reclassifies an error raised inside a transaction that never committed.
/// The server discards the transaction when the connection drops, so
/// nothing was applied and the attempt can safely be repeated.
pub(crate) fn classify_uncommitted(err: StoreError) -> StoreError {
    match err {
        StoreError::OutcomeUnknown(message) => StoreError::Connectivity(message),
        other => other,
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::ConnectionAcquire(_) => Self::Connectivity(err.to_string()),
            DbErr::Conn(RuntimeErr::SqlxError(inner)) => classify_sqlx(inner, false),
            DbErr::Exec(RuntimeErr::SqlxError(inner))
            | DbErr::Query(RuntimeErr::SqlxError(inner)) => classify_sqlx(inner, true),
            DbErr::Conn(_) => Self::Connectivity(err.to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<LedgerError> for StoreError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                account_id,
                balance,
            } => Self::InsufficientFunds {
                account_id,
                balance,
            },
            LedgerError::NonPositiveAmount(_)
            | LedgerError::CurrencyMismatch { .. } => Self::invalid(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound { .. } => Self::NotFound(message),
            StoreError::ConstraintViolation {
                kind: ConstraintKind::ForeignKey | ConstraintKind::Unique,
                ..
            } => Self::Conflict(message),
            StoreError::ConstraintViolation { .. } => Self::Validation(message),
            StoreError::InsufficientFunds { .. } => Self::BusinessRule(message),
            StoreError::SerializationFailure(_)
            | StoreError::Connectivity(_)
            | StoreError::Timeout
            | StoreError::OutcomeUnknown(_) => Self::ServiceUnavailable(message),
            StoreError::Database(_) => Self::Database(message),
        }
    }
}
