use std::fmt;
use std::fmt::Write as _;

use tokio_postgres::Statement;

use crate::connection::PgConnection;
use crate::error::DriverError;

/// Host-assigned identifier for one parsed SQL text. The host allocates
/// these once per pool; the driver only uses them as cache keys and for
/// deterministic statement labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementId(pub u32);

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A statement prepared on one connection. Owns the backend-side prepared
/// statement handle; dropping it queues the protocol-level close.
pub(crate) struct PreparedStatement {
    pub(crate) name: String,
    pub(crate) statement: Statement,
    pub(crate) param_count: usize,
    pub(crate) column_count: usize,
}

/// Deterministic driver-side label for a statement identifier.
pub(crate) fn statement_name(id: StatementId) -> String {
    format!("dbi_s{}", id.0)
}

/// Append the backend's positional bind placeholder for a zero-based host
/// parameter index. Postgres numbering starts at `$1`.
pub fn render_bind_placeholder(sql: &mut String, bind_index: usize) {
    let _ = write!(sql, "${}", bind_index + 1);
}

impl PgConnection {
    /// Prepare `sql` on this connection under the host statement identifier
    /// and return its (parameter count, column count).
    ///
    /// Idempotent: a statement already prepared on this connection returns
    /// its cached counts without another backend preparation. Preparation
    /// runs the protocol-level parse and describe, so the counts come from
    /// the backend's own statement description.
    ///
    /// # Errors
    /// Returns `DriverError::Prepare` with the backend's diagnostics when the
    /// statement is rejected, or when the connection is not open. A failed
    /// preparation leaves no cache entry behind.
    pub async fn prepare(
        &mut self,
        id: StatementId,
        sql: &str,
    ) -> Result<(usize, usize), DriverError> {
        if let Some(prepared) = self.statements.get(&id) {
            return Ok((prepared.param_count, prepared.column_count));
        }

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DriverError::prepare_message("connection is not open"))?;

        let statement = client
            .prepare(sql)
            .await
            .map_err(|err| DriverError::prepare(&err))?;
        let param_count = statement.params().len();
        let column_count = statement.columns().len();
        let name = statement_name(id);
        tracing::debug!(%name, param_count, column_count, "prepared statement");

        self.statements.insert(
            id,
            PreparedStatement {
                name,
                statement,
                param_count,
                column_count,
            },
        );
        Ok((param_count, column_count))
    }

    /// Release the prepared statement for `id`, if any.
    ///
    /// The local cache entry goes away unconditionally. Dropping the owned
    /// statement handle queues the protocol-level deallocation while the
    /// session is alive and is silently inert once it is gone; deallocation
    /// is best-effort and never reported.
    pub fn prepare_close(&mut self, id: StatementId) {
        if let Some(prepared) = self.statements.remove(&id) {
            tracing::debug!(name = %prepared.name, "closed prepared statement");
        }
    }

    /// Whether `id` currently has a prepared statement cached on this
    /// connection.
    #[must_use]
    pub fn is_prepared(&self, id: StatementId) -> bool {
        self.statements.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_names_derive_from_the_id() {
        assert_eq!(statement_name(StatementId(0)), "dbi_s0");
        assert_eq!(statement_name(StatementId(42)), "dbi_s42");
        assert_eq!(statement_name(StatementId(42)), statement_name(StatementId(42)));
    }

    #[test]
    fn placeholders_use_one_based_postgres_numbering() {
        let mut sql = String::from("select * from t where a = ");
        render_bind_placeholder(&mut sql, 0);
        sql.push_str(" and b = ");
        render_bind_placeholder(&mut sql, 1);
        assert_eq!(sql, "select * from t where a = $1 and b = $2");
    }
}
