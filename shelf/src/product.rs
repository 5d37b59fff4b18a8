use crate::database::{Column, ColumnDefault, ColumnType, IntoTableSchema, TableSchema};

/// A row of the `products` catalog table.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub avg_price: f64,
}

impl Product {
    pub const TABLE_NAME: &'static str = "products";
    pub const DEFAULT_AVG_PRICE: f64 = 5.0;
}

impl IntoTableSchema for Product {
    fn table_schema() -> TableSchema {
        TableSchema {
            table_name: Product::TABLE_NAME.to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    ty: ColumnType::BigInt,
                    nullable: false,
                    default: None,
                    primary_key: true,
                    auto_increment: true,
                },
                Column {
                    name: "name".to_string(),
                    ty: ColumnType::Text,
                    nullable: false,
                    default: None,
                    primary_key: false,
                    auto_increment: false,
                },
                Column {
                    name: "avg_price".to_string(),
                    ty: ColumnType::Double,
                    nullable: false,
                    default: Some(ColumnDefault::Float(Product::DEFAULT_AVG_PRICE)),
                    primary_key: false,
                    auto_increment: false,
                },
            ],
        }
    }
}
