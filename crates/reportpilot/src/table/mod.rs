//! The tabular data model shared by every stage.

mod table;
mod types;
mod value;

pub use table::Table;
pub use types::ColumnType;
pub use value::{Value, parse_date, parse_number};
