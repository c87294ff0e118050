use crate::error::DriverError;

/// One step of the flat value-stream consumption model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamedValue<'a> {
    /// A non-null cell, as text bytes.
    Value(&'a [u8]),
    /// An SQL null. Never collapsed into a zero-length `Value`.
    Null,
    /// The requested row is past the end of the result.
    Done,
}

/// The materialized result of the most recent execution on a connection.
///
/// Cells are text bytes; `None` marks an SQL null, which keeps nulls
/// distinguishable from empty strings after the wire representation is gone.
/// The row cursor serves the row-oriented consumption model only; the flat
/// model addresses cells explicitly and never touches it.
#[derive(Debug, Default)]
pub(crate) struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Vec<u8>>>>,
    /// Row cursor. `None` = before the first row.
    cursor: Option<usize>,
}

impl ResultSet {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Option<Vec<u8>>>>) -> Self {
        Self {
            columns,
            rows,
            cursor: None,
        }
    }

    /// Advance the row cursor. Returns whether a row is available; keeps
    /// returning false once the cursor has run past the last row.
    pub(crate) fn next_row(&mut self) -> bool {
        let next = self.cursor.map_or(0, |idx| idx.saturating_add(1));
        self.cursor = Some(next);
        next < self.rows.len()
    }

    pub(crate) fn column_length(&self, index: usize) -> Result<(usize, bool), DriverError> {
        let cell = self.current_cell(index)?;
        // Nulls read as zero length; results are always text.
        Ok((cell.as_ref().map_or(0, Vec::len), false))
    }

    /// Copy the current row's column into `out`, truncating to its capacity.
    /// Returns the number of bytes copied; nulls copy nothing.
    pub(crate) fn column_value(&self, index: usize, out: &mut [u8]) -> Result<usize, DriverError> {
        let cell = self.current_cell(index)?;
        let src: &[u8] = cell.as_deref().unwrap_or(&[]);
        let len = src.len().min(out.len());
        out[..len].copy_from_slice(&src[..len]);
        Ok(len)
    }

    pub(crate) fn column_name(&self, index: usize) -> Result<&str, DriverError> {
        self.columns
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| DriverError::fetch_message(format!("no column at index {index}")))
    }

    /// Explicitly addressed read for the flat value-stream model.
    pub(crate) fn next_value(
        &self,
        row: usize,
        col: usize,
    ) -> Result<StreamedValue<'_>, DriverError> {
        let Some(cells) = self.rows.get(row) else {
            return Ok(StreamedValue::Done);
        };
        let cell = cells.get(col).ok_or_else(|| {
            DriverError::fetch_message(format!(
                "bad column index while fetching value: column: {col} row: {row}"
            ))
        })?;
        Ok(match cell {
            None => StreamedValue::Null,
            Some(bytes) => StreamedValue::Value(bytes),
        })
    }

    fn current_cell(&self, index: usize) -> Result<&Option<Vec<u8>>, DriverError> {
        let row = self.cursor.ok_or_else(|| {
            DriverError::fetch_message("no current row: the row cursor was never advanced")
        })?;
        let cells = self.rows.get(row).ok_or_else(|| {
            DriverError::fetch_message(format!("row index {row} is past the end of the result"))
        })?;
        cells.get(index).ok_or_else(|| {
            DriverError::fetch_message(format!(
                "bad column index while fetching value: column: {index} row: {row}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        ResultSet::new(
            vec!["id".to_string(), "note".to_string()],
            vec![
                vec![Some(b"1".to_vec()), Some(b"first".to_vec())],
                vec![Some(b"2".to_vec()), None],
                vec![Some(b"3".to_vec()), Some(Vec::new())],
            ],
        )
    }

    #[test]
    fn row_cursor_walks_every_row_then_stops() {
        let mut rs = sample();
        assert!(rs.next_row());
        assert!(rs.next_row());
        assert!(rs.next_row());
        assert!(!rs.next_row());
        assert!(!rs.next_row());
    }

    #[test]
    fn reading_before_the_first_row_is_a_fetch_error() {
        let rs = sample();
        let err = rs.column_length(0).unwrap_err();
        assert!(matches!(err, DriverError::Fetch { .. }));
    }

    #[test]
    fn null_columns_read_as_zero_length() {
        let mut rs = sample();
        rs.next_row();
        rs.next_row();
        assert_eq!(rs.column_length(1).unwrap(), (0, false));
        let mut buf = [0u8; 8];
        assert_eq!(rs.column_value(1, &mut buf).unwrap(), 0);
    }

    #[test]
    fn column_value_truncates_to_capacity() {
        let mut rs = sample();
        rs.next_row();
        let mut buf = [0u8; 3];
        let copied = rs.column_value(1, &mut buf).unwrap();
        assert_eq!(copied, 3);
        assert_eq!(&buf, b"fir");
    }

    #[test]
    fn bad_column_index_is_a_fetch_error() {
        let mut rs = sample();
        rs.next_row();
        assert!(matches!(
            rs.column_value(5, &mut [0u8; 4]),
            Err(DriverError::Fetch { .. })
        ));
        assert!(matches!(
            rs.column_name(9),
            Err(DriverError::Fetch { .. })
        ));
        assert!(matches!(
            rs.next_value(0, 5),
            Err(DriverError::Fetch { .. })
        ));
    }

    #[test]
    fn flat_model_keeps_null_and_empty_distinct() {
        let rs = sample();
        assert_eq!(rs.next_value(1, 1).unwrap(), StreamedValue::Null);
        assert_eq!(
            rs.next_value(2, 1).unwrap(),
            StreamedValue::Value(b"".as_slice())
        );
    }

    #[test]
    fn flat_model_signals_done_past_the_last_row() {
        let rs = sample();
        assert_eq!(rs.next_value(3, 0).unwrap(), StreamedValue::Done);
        assert_eq!(rs.next_value(100, 0).unwrap(), StreamedValue::Done);
    }

    #[test]
    fn both_models_yield_the_same_value_sequence() {
        let mut rs = sample();

        let mut by_rows: Vec<Vec<u8>> = Vec::new();
        while rs.next_row() {
            for col in 0..2 {
                let (len, _) = rs.column_length(col).unwrap();
                let mut buf = vec![0u8; len];
                rs.column_value(col, &mut buf).unwrap();
                by_rows.push(buf);
            }
        }

        // Nulls read as zero length in the row model, so they compare equal
        // to the flat model's Null rendered as empty bytes.
        let mut by_stream: Vec<Vec<u8>> = Vec::new();
        let mut row = 0;
        while !matches!(rs.next_value(row, 0).unwrap(), StreamedValue::Done) {
            for col in 0..2 {
                match rs.next_value(row, col).unwrap() {
                    StreamedValue::Value(bytes) => by_stream.push(bytes.to_vec()),
                    StreamedValue::Null => by_stream.push(Vec::new()),
                    StreamedValue::Done => unreachable!(),
                }
            }
            row += 1;
        }

        assert_eq!(by_rows, by_stream);
    }

    #[test]
    fn column_names_resolve_by_index() {
        let rs = sample();
        assert_eq!(rs.column_name(0).unwrap(), "id");
        assert_eq!(rs.column_name(1).unwrap(), "note");
    }
}
