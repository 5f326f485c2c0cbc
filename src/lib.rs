pub mod cli;
pub mod connection;
pub mod error;
pub mod executor;
pub mod logging;
pub mod output;
pub mod pipeline;

pub use cli::Cli;
pub use connection::{ConnectionArgs, ConnectionParams, ConnectionSpec};
pub use error::{PgExecError, Result};
pub use executor::{Cell, ColumnDescriptor, ColumnType, QueryRunner, RawValue, ResultRow};
pub use output::DisplayTable;
pub use pipeline::{execute, execute_until};
