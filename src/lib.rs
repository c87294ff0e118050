//! PostgreSQL backend driver for a generic database-access layer.
//!
//! The host layer owns connection pooling, configuration loading, and
//! statement-identifier allocation; this crate translates the host's
//! backend-neutral calls into `tokio-postgres` operations and back:
//!
//! - [`PgConnection::open`] / [`PgConnection::close`] /
//!   [`PgConnection::is_connected`] / [`PgConnection::reset`]: session
//!   lifecycle, with fixed UTF8/UTC/ISO session defaults and backend notices
//!   surfaced as log warnings.
//! - [`PgConnection::prepare`] / [`PgConnection::prepare_close`]: lazy,
//!   per-connection statement cache keyed by host [`StatementId`].
//! - [`PgConnection::exec`] plus two result-consumption models: the
//!   row-cursor operations ([`PgConnection::next_row`],
//!   [`PgConnection::column_length`], [`PgConnection::column_value`],
//!   [`PgConnection::column_name`]) and the explicitly addressed flat value
//!   stream ([`PgConnection::next_value`]). The models are distinct host
//!   protocol versions, so they are deliberately separate operation sets.
//! - [`PgConnection::transaction`]: depth-keyed begin/commit/rollback with
//!   deterministically named savepoints for nested scopes.
//! - [`render_bind_placeholder`]: the backend's `$N` positional syntax for
//!   the host's zero-based parameter numbering.
//!
//! Values cross the boundary as raw bytes with a text/binary flag and an
//! explicit null marker ([`BindValue`] inbound, [`StreamedValue`] outbound);
//! failures cross it as a `(code, message)` pair ([`DriverError`]).

mod config;
mod connection;
mod error;
mod execute;
mod result;
mod statement;
mod transaction;
mod value;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::DriverConfig;
pub use connection::PgConnection;
pub use error::{DRIVER_DIAG_CODE, DriverError};
pub use result::StreamedValue;
pub use statement::{StatementId, render_bind_placeholder};
pub use transaction::{IsolationLevel, TransactionCommand};
pub use value::BindValue;
