use super::spec::ConnectionSpec;
use crate::error::{PgExecError, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const MAX_CONNECTIONS: u32 = 10;

const DEFAULT_HOST: &str = "localhost";

pub fn connect_options(spec: &ConnectionSpec) -> Result<PgConnectOptions> {
    match spec {
        ConnectionSpec::Url(url) => PgConnectOptions::from_str(url)
            .map_err(|e| PgExecError::Config(format!("invalid connection url: {}", e))),
        ConnectionSpec::Params(params) => {
            // Every field is overwritten so PG* variables never leak in.
            let host = if params.host.is_empty() {
                DEFAULT_HOST
            } else {
                params.host.as_str()
            };
            Ok(PgConnectOptions::new_without_pgpass()
                .host(host)
                .port(params.port)
                .username(&params.user)
                .password(&params.password)
                .database(&params.database)
                .ssl_mode(PgSslMode::Prefer))
        }
    }
}

pub async fn connect(spec: &ConnectionSpec) -> Result<PgPool> {
    let options = connect_options(spec)?;
    info!(target_db = %spec, max_connections = MAX_CONNECTIONS, "Opening connection pool");

    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .map_err(PgExecError::Connection)
}

/// Asks the server to abort whatever `backend_pid` is running, over a
/// separate pooled connection.
pub async fn cancel_backend(pool: &PgPool, backend_pid: i32, limit: Duration) {
    let request = sqlx::query_scalar::<_, bool>("SELECT pg_cancel_backend($1)")
        .bind(backend_pid)
        .fetch_one(pool);

    match tokio::time::timeout(limit, request).await {
        Ok(Ok(true)) => info!(backend_pid, "Cancelled running statement"),
        Ok(Ok(false)) => debug!(backend_pid, "No running statement to cancel"),
        Ok(Err(e)) => warn!(backend_pid, error = %e, "Cancel request failed"),
        Err(_) => warn!(backend_pid, "Cancel request timed out"),
    }
}

/// Waits at most `limit` for checked-out connections to come back.
pub async fn close(pool: PgPool, limit: Duration) {
    match tokio::time::timeout(limit, pool.close()).await {
        Ok(()) => debug!("Connection pool closed"),
        Err(_) => warn!(
            limit_ms = limit.as_millis() as u64,
            "Gave up waiting for busy connections to close"
        ),
    }
}
