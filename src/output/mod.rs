mod table;

pub use table::DisplayTable;
