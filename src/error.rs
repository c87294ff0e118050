use thiserror::Error;

/// Diagnostic code used when a failure carries no backend-reported SQLSTATE,
/// e.g. connection establishment failures or invalid fetch addressing.
pub const DRIVER_DIAG_CODE: &str = "PGSQL";

/// Errors surfaced across the host boundary.
///
/// Every variant carries the (code, message) pair the host protocol expects:
/// the backend's SQLSTATE and primary message when the backend produced a
/// diagnostic record, or a driver-synthesized pair otherwise. Host contract
/// violations (executing a never-prepared statement, wrong bind-value count)
/// are not represented here; they panic at the offending call site.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Session establishment or health failure; the connection must be
    /// reopened.
    #[error("connection failure [{code}]: {message}")]
    Connection { code: String, message: String },

    /// The backend rejected a statement at preparation time.
    #[error("prepare failure [{code}]: {message}")]
    Prepare { code: String, message: String },

    /// Execution-time failure, including constraint violations.
    #[error("execution failure [{code}]: {message}")]
    Exec { code: String, message: String },

    /// Invalid row or column addressing against the pending result.
    #[error("fetch failure [{code}]: {message}")]
    Fetch { code: String, message: String },

    /// A begin/commit/rollback or savepoint command failed.
    #[error("transaction failure [{code}]: {message}")]
    Transaction { code: String, message: String },
}

impl DriverError {
    pub(crate) fn connection(err: &tokio_postgres::Error) -> Self {
        let (code, message) = diagnostic(err);
        Self::Connection { code, message }
    }

    pub(crate) fn prepare(err: &tokio_postgres::Error) -> Self {
        let (code, message) = diagnostic(err);
        Self::Prepare { code, message }
    }

    pub(crate) fn exec(err: &tokio_postgres::Error) -> Self {
        let (code, message) = diagnostic(err);
        Self::Exec { code, message }
    }

    pub(crate) fn transaction(err: &tokio_postgres::Error) -> Self {
        let (code, message) = diagnostic(err);
        Self::Transaction { code, message }
    }

    pub(crate) fn connection_message(message: impl Into<String>) -> Self {
        Self::Connection {
            code: DRIVER_DIAG_CODE.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn prepare_message(message: impl Into<String>) -> Self {
        Self::Prepare {
            code: DRIVER_DIAG_CODE.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn exec_message(message: impl Into<String>) -> Self {
        Self::Exec {
            code: DRIVER_DIAG_CODE.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn fetch_message(message: impl Into<String>) -> Self {
        Self::Fetch {
            code: DRIVER_DIAG_CODE.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn transaction_message(message: impl Into<String>) -> Self {
        Self::Transaction {
            code: DRIVER_DIAG_CODE.to_string(),
            message: message.into(),
        }
    }

    /// The SQLSTATE-style diagnostic code for this failure.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Connection { code, .. }
            | Self::Prepare { code, .. }
            | Self::Exec { code, .. }
            | Self::Fetch { code, .. }
            | Self::Transaction { code, .. } => code,
        }
    }

    /// The primary diagnostic message for this failure.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message, .. }
            | Self::Prepare { message, .. }
            | Self::Exec { message, .. }
            | Self::Fetch { message, .. }
            | Self::Transaction { message, .. } => message,
        }
    }
}

/// Pull the SQLSTATE and primary message out of a client error, falling back
/// to a synthesized pair when the backend never produced a diagnostic record.
fn diagnostic(err: &tokio_postgres::Error) -> (String, String) {
    match err.as_db_error() {
        Some(db) => (db.code().code().to_string(), db.message().to_string()),
        None => (DRIVER_DIAG_CODE.to_string(), err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_errors_carry_the_driver_code() {
        let err = DriverError::connection_message("no route to backend");
        assert_eq!(err.code(), DRIVER_DIAG_CODE);
        assert_eq!(err.message(), "no route to backend");
        assert!(matches!(err, DriverError::Connection { .. }));
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = DriverError::fetch_message("no column at index 3");
        assert_eq!(
            err.to_string(),
            "fetch failure [PGSQL]: no column at index 3"
        );
    }
}
