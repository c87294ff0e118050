//! Embedded PostgreSQL server for the live integration tests.
//!
//! Each test provisions its own database on a private server instance so
//! tests can run in parallel without sharing session state.

use postgresql_embedded::PostgreSQL;

/// A running embedded PostgreSQL instance plus the datasource string that
/// reaches the provisioned test database.
pub struct EmbeddedBackend {
    pub postgresql: PostgreSQL,
    pub datasource: String,
}

/// Set up and start an embedded server, then create `dbname` on it.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, or
/// if database provisioning fails.
pub async fn start_embedded_backend(
    dbname: &str,
) -> Result<EmbeddedBackend, Box<dyn std::error::Error>> {
    let mut postgresql = PostgreSQL::default();

    // Bundled binaries, so no download races between parallel tests.
    postgresql.setup().await?;
    postgresql.start().await?;
    postgresql.create_database(dbname).await?;

    let settings = postgresql.settings();
    let datasource = format!(
        "host={} port={} user={} password={} dbname={}",
        settings.host, settings.port, settings.username, settings.password, dbname
    );

    Ok(EmbeddedBackend {
        postgresql,
        datasource,
    })
}

/// Stop a previously started embedded server.
pub async fn stop_embedded_backend(backend: EmbeddedBackend) {
    let _ = backend.postgresql.stop().await;
}
