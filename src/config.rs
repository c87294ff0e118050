use std::time::Duration;

use serde::Deserialize;

use crate::error::DriverError;

/// Connect timeout applied when the datasource does not specify one.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Driver configuration, as handed over by the host's configuration loader.
///
/// The whole surface is a single backend connection string in the usual
/// `key=value` form, e.g. `host=db.internal user=app dbname=app`. Anything
/// beyond that (pool sizing, handle counts) belongs to the host layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    datasource: String,
}

impl DriverConfig {
    pub fn new(datasource: impl Into<String>) -> Self {
        Self {
            datasource: datasource.into(),
        }
    }

    #[must_use]
    pub fn datasource(&self) -> &str {
        &self.datasource
    }

    /// Parse the datasource into the backend client configuration, applying
    /// the default connect timeout when none is given.
    ///
    /// # Errors
    /// Returns `DriverError::Connection` when the datasource does not parse.
    pub(crate) fn backend_config(&self) -> Result<tokio_postgres::Config, DriverError> {
        let mut config: tokio_postgres::Config = self
            .datasource
            .parse()
            .map_err(|err: tokio_postgres::Error| DriverError::connection(&err))?;
        if config.get_connect_timeout().is_none() {
            config.connect_timeout(DEFAULT_CONNECT_TIMEOUT);
        }
        Ok(config)
    }
}
