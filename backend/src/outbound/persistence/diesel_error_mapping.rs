//! Shared classification of Diesel failures for the repository adapters.
//!
//! Each repository turns a [`DieselFailure`] into its own port error, so
//! constraint handling (duplicate slugs, categories still in use) stays in
//! one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Database failure reduced to what the ports distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// Any other failure.
    Query(String),
}

impl DieselFailure {
    /// Whether this is a unique violation on `constraint`.
    pub(crate) fn is_unique(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint: Some(name) } if name == constraint)
    }

    /// Whether this is any foreign key violation.
    pub(crate) fn is_foreign_key(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation { .. })
    }

    /// Human-readable message for the generic error variants.
    pub(crate) fn message(&self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message.clone(),
            Self::UniqueViolation { constraint } => {
                format!("unique constraint violated: {}", constraint.as_deref().unwrap_or("unknown"))
            }
            Self::ForeignKeyViolation { constraint } => format!(
                "foreign key constraint violated: {}",
                constraint.as_deref().unwrap_or("unknown")
            ),
        }
    }

    /// Whether the generic mapping should report a connection error.
    pub(crate) fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Classify a Diesel error, logging the raw cause at debug level.
pub(crate) fn classify(error: DieselError, operation: &str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(error = %error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error".to_owned()),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            },
            DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            },
            DatabaseErrorKind::ClosedConnection => {
                DieselFailure::Connection("database connection error".to_owned())
            }
            _ => DieselFailure::Query("database error".to_owned()),
        },
        _ => DieselFailure::Query("database error".to_owned()),
    }
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Implement the pool and generic Diesel mappings for a port error type
/// with `connection` and `query` constructors.
macro_rules! basic_error_mapping {
    ($error:ty) => {
        fn map_pool_error(error: $crate::outbound::persistence::pool::PoolError) -> $error {
            <$error>::connection($crate::outbound::persistence::diesel_error_mapping::pool_message(
                error,
            ))
        }

        fn map_failure(
            failure: $crate::outbound::persistence::diesel_error_mapping::DieselFailure,
        ) -> $error {
            if failure.is_connection() {
                <$error>::connection(failure.message())
            } else {
                <$error>::query(failure.message())
            }
        }
    };
}

pub(crate) use basic_error_mapping;
