use std::borrow::Cow;

use crate::connection::PgConnection;
use crate::error::DriverError;

/// Transaction operations the host may request. The enum is closed, so an
/// unrecognized command cannot reach the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionCommand {
    Begin,
    Commit,
    Rollback,
}

/// The four standard isolation levels, requested on the outermost begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "read uncommitted",
            Self::ReadCommitted => "read committed",
            Self::RepeatableRead => "repeatable read",
            Self::Serializable => "serializable",
        }
    }
}

/// Deterministic savepoint name for a nesting depth.
pub(crate) fn savepoint_name(depth: u32) -> String {
    format!("dbi_sp_{depth}")
}

/// The backend command for one host transaction call, or `None` when the
/// call requires no backend work: nested scopes commit implicitly by falling
/// out of scope, so only the outermost commit is real.
pub(crate) fn transaction_sql(
    depth: u32,
    cmd: TransactionCommand,
    isolation: IsolationLevel,
) -> Option<Cow<'static, str>> {
    match cmd {
        TransactionCommand::Begin if depth == 0 => {
            Some(format!("begin isolation level {}", isolation.as_sql()).into())
        }
        TransactionCommand::Begin => Some(format!("savepoint {}", savepoint_name(depth)).into()),
        TransactionCommand::Commit if depth == 0 => Some(Cow::Borrowed("commit")),
        TransactionCommand::Commit => None,
        TransactionCommand::Rollback if depth == 0 => Some(Cow::Borrowed("rollback")),
        TransactionCommand::Rollback => {
            Some(format!("rollback to savepoint {}", savepoint_name(depth)).into())
        }
    }
}

impl PgConnection {
    /// Issue the transaction command for the given nesting depth.
    ///
    /// Depth 0 is the outermost transaction (begin/commit/rollback with the
    /// requested isolation level); depth > 0 addresses the deterministically
    /// named savepoint for that depth. The driver stores no transaction
    /// state; depth is the host's to track and is passed on every call.
    /// Commands run over the simple-query protocol, outside the prepared
    /// statement machinery.
    ///
    /// # Errors
    /// Returns `DriverError::Transaction` with the backend's diagnostics
    /// when the command fails, or when the connection is not open.
    pub async fn transaction(
        &mut self,
        depth: u32,
        cmd: TransactionCommand,
        isolation: IsolationLevel,
    ) -> Result<(), DriverError> {
        let Some(sql) = transaction_sql(depth, cmd, isolation) else {
            return Ok(());
        };

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DriverError::transaction_message("connection is not open"))?;
        client
            .simple_query(&sql)
            .await
            .map_err(|err| DriverError::transaction(&err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: IsolationLevel = IsolationLevel::ReadCommitted;

    #[test]
    fn outermost_begin_carries_the_isolation_level() {
        assert_eq!(
            transaction_sql(0, TransactionCommand::Begin, IsolationLevel::Serializable).unwrap(),
            "begin isolation level serializable"
        );
        assert_eq!(
            transaction_sql(0, TransactionCommand::Begin, IsolationLevel::ReadUncommitted)
                .unwrap(),
            "begin isolation level read uncommitted"
        );
    }

    #[test]
    fn nested_begin_creates_a_depth_named_savepoint() {
        assert_eq!(
            transaction_sql(2, TransactionCommand::Begin, LEVEL).unwrap(),
            "savepoint dbi_sp_2"
        );
    }

    #[test]
    fn only_the_outermost_commit_reaches_the_backend() {
        assert_eq!(
            transaction_sql(0, TransactionCommand::Commit, LEVEL).unwrap(),
            "commit"
        );
        assert_eq!(transaction_sql(1, TransactionCommand::Commit, LEVEL), None);
        assert_eq!(transaction_sql(7, TransactionCommand::Commit, LEVEL), None);
    }

    #[test]
    fn rollback_targets_the_depth_named_savepoint() {
        assert_eq!(
            transaction_sql(0, TransactionCommand::Rollback, LEVEL).unwrap(),
            "rollback"
        );
        assert_eq!(
            transaction_sql(3, TransactionCommand::Rollback, LEVEL).unwrap(),
            "rollback to savepoint dbi_sp_3"
        );
    }

    #[test]
    fn every_isolation_level_renders() {
        assert_eq!(IsolationLevel::ReadUncommitted.as_sql(), "read uncommitted");
        assert_eq!(IsolationLevel::ReadCommitted.as_sql(), "read committed");
        assert_eq!(IsolationLevel::RepeatableRead.as_sql(), "repeatable read");
        assert_eq!(IsolationLevel::Serializable.as_sql(), "serializable");
    }
}
