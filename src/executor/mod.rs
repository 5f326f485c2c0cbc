mod materializer;
mod runner;
mod value;

pub use materializer::{materialize, materialize_row, materialize_values, ResultRow};
pub use runner::QueryRunner;
pub use value::{Cell, ColumnDescriptor, ColumnType, RawValue, NULL_DISPLAY};
