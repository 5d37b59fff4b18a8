pub use crate::database::{Column, ColumnDefault, ColumnType, IntoTableSchema, TableSchema};
pub use crate::product::Product;
