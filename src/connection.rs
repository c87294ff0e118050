use std::collections::HashMap;

use futures_util::StreamExt;
use futures_util::stream;
use tokio::task::JoinHandle;
use tokio_postgres::tls::NoTlsStream;
use tokio_postgres::{AsyncMessage, Client, NoTls, Socket};

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::result::ResultSet;
use crate::statement::{PreparedStatement, StatementId};

/// Session defaults applied to every new connection, in order. The backend
/// must speak UTF-8, report times in UTC, and print dates in ISO form so the
/// text values handed to the host are stable across server configurations.
const SESSION_DEFAULTS: [&str; 3] = [
    "set session client_encoding = 'UTF8'",
    "set session timezone = 'UTC'",
    "set session datestyle = 'ISO'",
];

/// One backend session, owned exclusively by one logical caller at a time.
///
/// The connection owns at most one pending [`ResultSet`] and the prepared
/// statements cached for it; both are released when the connection is closed
/// or dropped. Mutual exclusion between callers is the host pool's job; the
/// driver takes no locks.
pub struct PgConnection {
    pub(crate) client: Option<Client>,
    pub(crate) message_task: Option<JoinHandle<()>>,
    pub(crate) statements: HashMap<StatementId, PreparedStatement>,
    pub(crate) result: Option<ResultSet>,
}

impl PgConnection {
    /// Open a session against the configured datasource and apply the
    /// session defaults.
    ///
    /// The client library negotiates `client_encoding=UTF8` during startup
    /// and fails the handshake when the backend cannot honor it. Each
    /// session default is applied as an individual statement; if any of them
    /// fails the session is torn down and no connection is returned.
    ///
    /// # Errors
    /// Returns `DriverError::Connection` when the datasource does not parse,
    /// the backend is unreachable, or a session default cannot be applied.
    pub async fn open(config: &DriverConfig) -> Result<Self, DriverError> {
        let backend_config = config.backend_config()?;

        let (client, connection) = backend_config
            .connect(NoTls)
            .await
            .map_err(|err| DriverError::connection(&err))?;
        let message_task = tokio::spawn(drain_backend_messages(connection));

        for sql in SESSION_DEFAULTS {
            if let Err(err) = client.simple_query(sql).await {
                // Dropping the client terminates the session; the message
                // task drains the stream and exits on its own.
                drop(client);
                return Err(DriverError::connection(&err));
            }
        }

        tracing::debug!("postgres session established, UTF8/UTC/ISO defaults applied");

        Ok(Self {
            client: Some(client),
            message_task: Some(message_task),
            statements: HashMap::new(),
            result: None,
        })
    }

    /// Release the pending result, the cached statements, and the session.
    /// Never fails; safe to call repeatedly or after [`reset`] cleared the
    /// session.
    ///
    /// [`reset`]: PgConnection::reset
    pub fn close(&mut self) {
        self.result = None;
        // Statement drops queue protocol-level closes while the session is
        // still up; they are inert once the client goes away.
        self.statements.clear();
        self.client = None;
        self.message_task = None;
    }

    /// Whether a session exists and has not reported itself closed.
    /// Side-effect-free; performs no backend round trip.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.client
            .as_ref()
            .is_some_and(|client| !client.is_closed())
    }

    /// Validate session health between checkouts.
    ///
    /// A healthy session passes through untouched. An unrecoverable one is
    /// released locally, leaving the connection consistent for a later
    /// [`close`], and reported as an error so the host reopens.
    ///
    /// # Errors
    /// Returns `DriverError::Connection` when the session is gone.
    ///
    /// [`close`]: PgConnection::close
    pub fn reset(&mut self) -> Result<(), DriverError> {
        if self.is_connected() {
            return Ok(());
        }
        self.close();
        Err(DriverError::connection_message(
            "backend session is unrecoverable; the connection must be reopened",
        ))
    }
}

/// Drive the connection stream, surfacing backend notices as log warnings.
/// Runs until the session ends; errors only terminate the stream.
async fn drain_backend_messages(mut connection: tokio_postgres::Connection<Socket, NoTlsStream>) {
    let mut messages = stream::poll_fn(move |cx| connection.poll_message(cx));
    while let Some(message) = messages.next().await {
        match message {
            Ok(AsyncMessage::Notice(notice)) => {
                tracing::warn!(
                    code = notice.code().code(),
                    "postgres notice: {}",
                    notice.message()
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!("postgres connection stream ended: {err}");
                break;
            }
        }
    }
}
