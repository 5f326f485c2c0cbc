mod pool;
mod spec;

pub use pool::{cancel_backend, close, connect, connect_options, MAX_CONNECTIONS};
pub use spec::{ConnectionArgs, ConnectionParams, ConnectionSpec};
