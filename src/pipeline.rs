use crate::connection::{self, ConnectionArgs, ConnectionSpec};
use crate::error::{PgExecError, Result};
use crate::executor::QueryRunner;
use std::future::Future;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

const CANCEL_TIMEOUT: Duration = Duration::from_secs(3);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolve, connect, run `sql` in a transaction and write the table to `out`.
/// Ctrl-C aborts the statement on the server.
pub async fn execute<W: Write>(args: ConnectionArgs, sql: &str, out: &mut W) -> Result<()> {
    execute_until(args, sql, out, interrupted()).await
}

/// Same as [`execute`], but stops as soon as `shutdown` completes. The pool is
/// closed on every path out of here.
pub async fn execute_until<W, S>(
    args: ConnectionArgs,
    sql: &str,
    out: &mut W,
    shutdown: S,
) -> Result<()>
where
    W: Write,
    S: Future<Output = ()>,
{
    let spec = ConnectionSpec::resolve(&args)?;
    debug!(connection = %spec, "Resolved connection");

    tokio::pin!(shutdown);
    let pool = cancellable(connection::connect(&spec), &mut shutdown).await?;

    let backend_pid = OnceLock::new();
    let runner = QueryRunner::new(&pool).track_backend(&backend_pid);
    let outcome = cancellable(runner.run(sql, |table| table.write_to(out)), &mut shutdown).await;

    if matches!(outcome, Err(PgExecError::Cancelled)) {
        if let Some(&pid) = backend_pid.get() {
            connection::cancel_backend(&pool, pid, CANCEL_TIMEOUT).await;
        }
    }

    connection::close(pool, CLOSE_TIMEOUT).await;
    outcome
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn cancellable<T, F, S>(work: F, shutdown: S) -> Result<T>
where
    F: Future<Output = Result<T>>,
    S: Future<Output = ()>,
{
    tokio::select! {
        result = work => result,
        () = shutdown => {
            warn!("Interrupted, abandoning in-flight work");
            Err(PgExecError::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bad_port_fails_before_connecting() {
        let args = ConnectionArgs {
            host: "db.invalid".to_string(),
            port: "five-four-three-two".to_string(),
            ..Default::default()
        };
        let mut out = Vec::new();

        let err = execute(args, "SELECT 1", &mut out).await.unwrap_err();

        assert!(matches!(err, PgExecError::Config(_)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_url_fails_before_connecting() {
        let args = ConnectionArgs {
            url: "postgres://localhost:port/db".to_string(),
            port: "5432".to_string(),
            ..Default::default()
        };
        let mut out = Vec::new();

        let err = execute(args, "SELECT 1", &mut out).await.unwrap_err();

        assert!(matches!(err, PgExecError::Config(_)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_passthrough_when_not_interrupted() {
        let value = cancellable(
            async { Ok::<_, PgExecError>(7) },
            std::future::pending::<()>(),
        )
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_shutdown_abandons_stuck_work() {
        let started = std::time::Instant::now();

        let err = cancellable(
            std::future::pending::<Result<()>>(),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PgExecError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
