use tokio_postgres::types::ToSql;

use crate::connection::PgConnection;
use crate::error::DriverError;
use crate::result::{ResultSet, StreamedValue};
use crate::statement::StatementId;
use crate::value::{BindValue, read_column_text};

impl PgConnection {
    /// Bind `values` positionally and execute the statement prepared under
    /// `id`. Any previous result is discarded first, exactly as if [`flush`]
    /// had been called.
    ///
    /// Both row-returning and command completions count as success; on
    /// success the new result is materialized and the row cursor sits before
    /// the first row.
    ///
    /// # Errors
    /// Returns `DriverError::Exec` with the backend's diagnostics when
    /// execution fails, or when the connection is not open. A failed
    /// execution leaves no pending result.
    ///
    /// # Panics
    /// Executing a statement that was never prepared on this connection, or
    /// supplying a bind-value count that disagrees with the prepared
    /// parameter count, is a host contract violation and panics.
    ///
    /// [`flush`]: PgConnection::flush
    pub async fn exec(
        &mut self,
        id: StatementId,
        values: &[BindValue],
    ) -> Result<(), DriverError> {
        self.flush();

        let prepared = self.statements.get(&id).unwrap_or_else(|| {
            panic!("exec called for statement {id}, which was never prepared on this connection")
        });
        assert_eq!(
            values.len(),
            prepared.param_count,
            "statement {} expects {} bind values, got {}",
            prepared.name,
            prepared.param_count,
            values.len()
        );

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DriverError::exec_message("connection is not open"))?;

        let params: Vec<&(dyn ToSql + Sync)> = values
            .iter()
            .map(|value| value as &(dyn ToSql + Sync))
            .collect();
        let rows = client
            .query(&prepared.statement, &params)
            .await
            .map_err(|err| DriverError::exec(&err))?;

        let columns: Vec<String> = prepared
            .statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();
        let mut cells = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut decoded = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                decoded.push(read_column_text(row, idx)?);
            }
            cells.push(decoded);
        }

        self.result = Some(ResultSet::new(columns, cells));
        Ok(())
    }

    /// Discard the pending result immediately, releasing its memory. Always
    /// succeeds; implicitly invoked at the start of every [`exec`].
    ///
    /// [`exec`]: PgConnection::exec
    pub fn flush(&mut self) {
        self.result = None;
    }

    /// Advance the row cursor of the pending result. Returns whether a row
    /// is available.
    ///
    /// # Errors
    /// Returns `DriverError::Fetch` when no result is pending.
    pub fn next_row(&mut self) -> Result<bool, DriverError> {
        match self.result.as_mut() {
            Some(result) => Ok(result.next_row()),
            None => Err(DriverError::fetch_message(
                "no result is pending on this connection",
            )),
        }
    }

    /// Length of the current row's column, plus its binary flag. Nulls are
    /// zero length; results are always transferred to the host as text.
    ///
    /// # Errors
    /// Returns `DriverError::Fetch` on invalid row or column addressing.
    pub fn column_length(&self, index: usize) -> Result<(usize, bool), DriverError> {
        self.pending_result()?.column_length(index)
    }

    /// Copy the current row's column into `out`, truncating to its capacity.
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    /// Returns `DriverError::Fetch` on invalid row or column addressing.
    pub fn column_value(&self, index: usize, out: &mut [u8]) -> Result<usize, DriverError> {
        self.pending_result()?.column_value(index, out)
    }

    /// Name of the result column at `index`.
    ///
    /// # Errors
    /// Returns `DriverError::Fetch` when no result is pending or the index
    /// is out of range.
    pub fn column_name(&self, index: usize) -> Result<&str, DriverError> {
        self.pending_result()?.column_name(index)
    }

    /// Read one value of the pending result by explicit (row, column)
    /// coordinates (the flat value-stream consumption model). Signals
    /// [`StreamedValue::Done`] once `row` is past the available rows and
    /// keeps backend nulls distinct from empty values.
    ///
    /// # Errors
    /// Returns `DriverError::Fetch` when no result is pending or the column
    /// index is out of range.
    pub fn next_value(&self, row: usize, col: usize) -> Result<StreamedValue<'_>, DriverError> {
        self.pending_result()?.next_value(row, col)
    }

    fn pending_result(&self) -> Result<&ResultSet, DriverError> {
        self.result.as_ref().ok_or_else(|| {
            DriverError::fetch_message("no result is pending on this connection")
        })
    }
}
