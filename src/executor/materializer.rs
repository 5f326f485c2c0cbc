use super::value::{Cell, ColumnDescriptor, RawValue};
use crate::error::{PgExecError, Result};
use futures::{Stream, TryStreamExt};
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::debug;

/// One materialized row: display strings keyed by column name, in column order.
/// Duplicate column names are kept side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    entries: Vec<(String, String)>,
}

impl ResultRow {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn materialize_values<'r, I>(descriptors: &[ColumnDescriptor], values: I) -> Result<ResultRow>
where
    I: IntoIterator<Item = RawValue<'r>>,
{
    let mut entries = Vec::with_capacity(descriptors.len());
    let mut values = values.into_iter();

    for descriptor in descriptors {
        let raw = values.next().ok_or_else(|| {
            PgExecError::scan(
                &descriptor.name,
                format!(
                    "row has fewer values than the {} described columns",
                    descriptors.len()
                ),
            )
        })?;
        let cell = Cell::decode(descriptor, raw)?;
        entries.push((descriptor.name.clone(), cell.to_string()));
    }

    if values.next().is_some() {
        return Err(PgExecError::scan(
            "<row>",
            format!(
                "row has more values than the {} described columns",
                descriptors.len()
            ),
        ));
    }

    Ok(ResultRow::new(entries))
}

pub fn materialize_row(descriptors: &[ColumnDescriptor], row: &PgRow) -> Result<ResultRow> {
    if row.len() != descriptors.len() {
        return Err(PgExecError::scan(
            "<row>",
            format!(
                "row has {} values but {} columns were described",
                row.len(),
                descriptors.len()
            ),
        ));
    }

    let values = descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            let value = row
                .try_get_raw(index)
                .map_err(|e| PgExecError::scan(&descriptor.name, e.to_string()))?;
            RawValue::from_pg(&descriptor.name, value)
        })
        .collect::<Result<Vec<_>>>()?;

    materialize_values(descriptors, values)
}

/// Drains the cursor in order, one row at a time.
pub async fn materialize<S>(descriptors: &[ColumnDescriptor], mut rows: S) -> Result<Vec<ResultRow>>
where
    S: Stream<Item = std::result::Result<PgRow, sqlx::Error>> + Unpin,
{
    let mut materialized = Vec::new();
    while let Some(row) = rows.try_next().await.map_err(PgExecError::Query)? {
        materialized.push(materialize_row(descriptors, &row)?);
    }
    debug!(
        rows = materialized.len(),
        columns = descriptors.len(),
        "Materialized result set"
    );
    Ok(materialized)
}
