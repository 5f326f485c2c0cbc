use super::materializer::materialize;
use super::value::ColumnDescriptor;
use crate::error::{PgExecError, Result};
use crate::output::DisplayTable;
use sqlx::postgres::{PgConnection, PgPool};
use sqlx::{Executor, Statement};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub struct QueryRunner<'p> {
    pool: &'p PgPool,
    backend_pid: Option<&'p OnceLock<i32>>,
}

impl<'p> QueryRunner<'p> {
    pub fn new(pool: &'p PgPool) -> Self {
        Self {
            pool,
            backend_pid: None,
        }
    }

    /// Records the server process id of the transaction's connection in
    /// `slot`, so the statement can be cancelled from another connection.
    pub fn track_backend(mut self, slot: &'p OnceLock<i32>) -> Self {
        self.backend_pid = Some(slot);
        self
    }

    /// Runs `sql` in its own transaction and hands the materialized table to
    /// `render`. The transaction is committed only when both succeed; every
    /// other path rolls it back.
    pub async fn run<F>(&self, sql: &str, render: F) -> Result<()>
    where
        F: FnOnce(&DisplayTable) -> Result<()>,
    {
        let mut tx = self.pool.begin().await.map_err(PgExecError::Connection)?;
        debug!("Transaction started");

        if let Some(slot) = self.backend_pid {
            let pid: i32 = sqlx::query_scalar("SELECT pg_backend_pid()")
                .fetch_one(&mut *tx)
                .await
                .map_err(PgExecError::Connection)?;
            let _ = slot.set(pid);
            debug!(backend_pid = pid, "Tracking backend");
        }

        let outcome = match Self::fetch_table(&mut tx, sql).await {
            Ok(table) => render(&table),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                tx.commit().await.map_err(PgExecError::Commit)?;
                info!("Transaction committed");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                } else {
                    debug!("Transaction rolled back");
                }
                Err(e)
            }
        }
    }

    /// Prepares first so the column list is known even for empty results and
    /// multi-statement input is refused before anything executes.
    pub async fn fetch_table(conn: &mut PgConnection, sql: &str) -> Result<DisplayTable> {
        let statement = (&mut *conn)
            .prepare(sql)
            .await
            .map_err(PgExecError::Query)?;
        let descriptors: Vec<ColumnDescriptor> = statement
            .columns()
            .iter()
            .map(ColumnDescriptor::from_column)
            .collect();
        debug!(columns = descriptors.len(), "Statement prepared");

        // Unprepared execution returns every value in its text form.
        let rows = materialize(&descriptors, (&mut *conn).fetch(sql)).await?;

        let header = descriptors.into_iter().map(|d| d.name).collect();
        Ok(DisplayTable::new(header, rows))
    }
}
