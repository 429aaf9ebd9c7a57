use crate::{Dialect, Error, TransactionState};
use std::{
    borrow::Cow,
    fmt::{self, Display},
};

/// Failures raised by the core itself, always carried inside [`Error`].
///
/// Use `error.downcast_ref::<SqlError>()` to inspect the kind.
#[derive(Debug, thiserror::Error)]
pub enum SqlError {
    #[error("Type mismatch: the {codec} codec cannot handle the value {found}")]
    TypeMismatch {
        codec: Cow<'static, str>,
        found: String,
    },
    #[error("{feature} is not supported by {dialect}")]
    UnsupportedByDialect {
        dialect: Dialect,
        feature: Cow<'static, str>,
    },
    #[error("Transient conflict reported by the database: {message}")]
    TransientConflict { message: String },
    #[error("Missing value for the identity column `{column}` of `{table}`")]
    MissingComponent { table: String, column: String },
    #[error("Column `{column}` is not part of the identity of `{table}`")]
    UnknownComponent { table: String, column: String },
    #[error("{expression} is not in record set")]
    NotInRecordSet { expression: String },
    #[error("{expression} is not initialized yet")]
    NotInitialized { expression: String },
    #[error("Identifier `{name}` has {length} characters but {dialect} allows at most {max}")]
    IdentifierTooLong {
        dialect: Dialect,
        name: String,
        length: usize,
        max: usize,
    },
    #[error("Expression {expression} references `{table}` which is not part of the statement source")]
    DanglingReference { expression: String, table: String },
    #[error("The transaction is {state:?}, it must be active")]
    TransactionNotActive { state: TransactionState },
    #[error("Savepoint `{name}` does not exist in the current transaction")]
    UnknownSavepoint { name: String },
    #[error("The having clause is already set")]
    DuplicateHaving,
}

impl SqlError {
    pub fn type_mismatch(codec: impl Into<Cow<'static, str>>, found: impl std::fmt::Debug) -> Error {
        Error::new(SqlError::TypeMismatch {
            codec: codec.into(),
            found: format!("{:?}", found),
        })
    }

    pub fn unsupported(dialect: Dialect, feature: impl Into<Cow<'static, str>>) -> Error {
        Error::new(SqlError::UnsupportedByDialect {
            dialect,
            feature: feature.into(),
        })
    }
}

/// Failure reported by a connection provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub message: String,
    pub sql_state: Option<String>,
    pub code: Option<i32>,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: None,
            code: None,
        }
    }

    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Serialization failures and deadlocks that can succeed when the work is repeated.
    pub fn is_transient(&self) -> bool {
        if let Some(state) = &self.sql_state {
            if matches!(state.as_str(), "40001" | "40P01") {
                return true;
            }
        }
        // MySQL deadlock and lock wait timeout, SQLite busy and locked
        matches!(self.code, Some(1213 | 1205 | 5 | 6))
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(state) = &self.sql_state {
            write!(f, " (SQLSTATE {})", state)?;
        }
        if let Some(code) = self.code {
            write!(f, " (code {})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for DriverError {}

/// The unit of work failed and the rollback that followed failed as well.
#[derive(Debug, thiserror::Error)]
#[error("{original:#}\nthe rollback that followed failed too: {cleanup:#}")]
pub struct CleanupError {
    #[source]
    pub original: Error,
    pub cleanup: Error,
}

/// Whether anything in the error chain is a retryable conflict.
pub fn is_transient(error: &Error) -> bool {
    error.chain().any(|e| {
        if let Some(SqlError::TransientConflict { .. }) = e.downcast_ref::<SqlError>() {
            return true;
        }
        e.downcast_ref::<DriverError>()
            .map(DriverError::is_transient)
            .unwrap_or(false)
    })
}

/// Finds the [`SqlError`] carried by the error, if any.
pub fn sql_error(error: &Error) -> Option<&SqlError> {
    error.chain().find_map(|e| e.downcast_ref::<SqlError>())
}
