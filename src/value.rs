use std::error::Error;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::Row;
use tokio_postgres::types::{Format, IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::error::DriverError;

/// A bind parameter as supplied by the host: raw bytes, a text/binary format
/// flag, and an explicit null marker.
///
/// The driver never interprets the bytes. They are forwarded verbatim to the
/// backend, which parses them according to the prepared parameter's type, so
/// the host can keep a single generic value buffer for every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindValue {
    data: Option<Vec<u8>>,
    binary: bool,
}

impl BindValue {
    /// A text-format value.
    pub fn text(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(data.into()),
            binary: false,
        }
    }

    /// A binary-format value.
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(data.into()),
            binary: true,
        }
    }

    /// An SQL null. Distinct from a zero-length text value.
    #[must_use]
    pub fn null() -> Self {
        Self {
            data: None,
            binary: false,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Length in bytes; nulls are zero length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.binary
    }
}

impl ToSql for BindValue {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match &self.data {
            None => Ok(IsNull::Yes),
            Some(data) => {
                out.extend_from_slice(data);
                Ok(IsNull::No)
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The backend parses the bytes against the prepared parameter type.
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        if self.binary {
            Format::Binary
        } else {
            Format::Text
        }
    }

    to_sql_checked!();
}

/// Render one result column as its canonical text representation, keeping
/// nulls distinct from empty strings.
///
/// The client library transfers result columns in binary, so each supported
/// type is decoded and re-rendered the way the backend would print it under
/// the session's ISO datestyle. Binary column transfer to the host is
/// deferred; everything the host sees is text bytes.
pub(crate) fn read_column_text(
    row: &Row,
    idx: usize,
) -> Result<Option<Vec<u8>>, DriverError> {
    let ty = row.columns()[idx].type_();

    let rendered = match ty.name() {
        "int2" => row
            .try_get::<_, Option<i16>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.to_string()),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.to_string()),
        "int8" => row
            .try_get::<_, Option<i64>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.to_string()),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.to_string()),
        "float8" => row
            .try_get::<_, Option<f64>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.to_string()),
        "bool" => row
            .try_get::<_, Option<bool>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| if v { "t" } else { "f" }.to_string()),
        "text" | "varchar" | "bpchar" | "name" => row
            .try_get::<_, Option<String>>(idx)
            .map_err(|e| DriverError::exec(&e))?,
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.format("%Y-%m-%d %H:%M:%S%.f+00").to_string()),
        "date" => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.format("%Y-%m-%d").to_string()),
        "json" | "jsonb" => row
            .try_get::<_, Option<serde_json::Value>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| v.to_string()),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .map_err(|e| DriverError::exec(&e))?
            .map(|v| render_bytea(&v)),
        other => row
            .try_get::<_, Option<String>>(idx)
            .map_err(|e| {
                DriverError::exec_message(format!(
                    "cannot render column type `{other}` as text: {e}"
                ))
            })?,
    };

    Ok(rendered.map(String::into_bytes))
}

/// The backend's text form for bytea: `\x` followed by lowercase hex.
fn render_bytea(data: &[u8]) -> String {
    let mut out = String::with_capacity(2 + data.len() * 2);
    out.push_str("\\x");
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
