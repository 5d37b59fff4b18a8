use std::fmt::{self, Write};

use shelf::database::{Column, ColumnType, TableSchema};
use sqlx::AnyConnection;

use crate::error::SchemaError;

/// The relational stores a reset can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Maps the backend name reported by an [`sqlx::AnyConnection`].
    pub fn from_backend_name(name: &str) -> Option<Dialect> {
        match name {
            "PostgreSQL" => Some(Dialect::Postgres),
            "MySQL" => Some(Dialect::MySql),
            "SQLite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    pub fn detect(conn: &AnyConnection) -> Result<Dialect, SchemaError> {
        let backend_name = conn.backend_name();
        Dialect::from_backend_name(backend_name)
            .ok_or_else(|| SchemaError::UnsupportedStore(backend_name.to_string()))
    }

    /// Whether `DROP TABLE` and `CREATE TABLE` can share a transaction.
    ///
    /// MySQL commits implicitly before and after every DDL statement.
    pub fn transactional_ddl(self) -> bool {
        match self {
            Dialect::Postgres | Dialect::Sqlite => true,
            Dialect::MySql => false,
        }
    }

    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Postgres | Dialect::Sqlite => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Quotes `ident`, prefixed with `schema` when given.
    pub fn qualified_ident(self, schema: Option<&str>, ident: &str) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quote_ident(schema), self.quote_ident(ident)),
            None => self.quote_ident(ident),
        }
    }

    pub fn type_name(self, ty: ColumnType) -> &'static str {
        match (self, ty) {
            (Dialect::Postgres, ColumnType::BigInt) => "bigint",
            (Dialect::Postgres, ColumnType::Text) => "text",
            (Dialect::Postgres, ColumnType::Double) => "double precision",
            (Dialect::MySql, ColumnType::BigInt) => "BIGINT",
            (Dialect::MySql, ColumnType::Text) => "TEXT",
            (Dialect::MySql, ColumnType::Double) => "DOUBLE",
            // sqlite only treats the exact name INTEGER as a rowid alias, which is 64-bit
            (Dialect::Sqlite, ColumnType::BigInt) => "INTEGER",
            (Dialect::Sqlite, ColumnType::Text) => "TEXT",
            (Dialect::Sqlite, ColumnType::Double) => "REAL",
        }
    }

    /// Parses a type name as reported by the store's catalog.
    pub fn parse_type(self, name: &str) -> Option<ColumnType> {
        let name = name.trim().to_ascii_lowercase();

        let ty = match (self, name.as_str()) {
            (Dialect::Postgres, "bigint" | "int8") => ColumnType::BigInt,
            (Dialect::Postgres, "text") => ColumnType::Text,
            (Dialect::Postgres, "double precision" | "float8") => ColumnType::Double,
            (Dialect::MySql, "bigint") => ColumnType::BigInt,
            (Dialect::MySql, "text") => ColumnType::Text,
            (Dialect::MySql, "double") => ColumnType::Double,
            (Dialect::Sqlite, "integer" | "bigint" | "int8") => ColumnType::BigInt,
            (Dialect::Sqlite, "text") => ColumnType::Text,
            (Dialect::Sqlite, "real" | "double" | "double precision" | "float") => {
                ColumnType::Double
            }
            _ => return None,
        };

        Some(ty)
    }

    /// Drops the table if it exists, refusing to cascade into dependents.
    pub fn drop_table_sql(self, schema: Option<&str>, table_name: &str) -> String {
        let table = self.qualified_ident(schema, table_name);
        match self {
            Dialect::Postgres | Dialect::MySql => format!("DROP TABLE IF EXISTS {} RESTRICT", table),
            Dialect::Sqlite => format!("DROP TABLE IF EXISTS {}", table),
        }
    }

    pub fn create_table_sql(self, schema: Option<&str>, table: &TableSchema) -> String {
        let mut sql = String::new();

        writeln!(
            sql,
            "CREATE TABLE {} (",
            self.qualified_ident(schema, &table.table_name)
        )
        .unwrap();

        for (i, column) in table.columns.iter().enumerate() {
            write!(sql, "  {}", self.column_sql(column)).unwrap();

            if i < table.columns.len() - 1 {
                writeln!(sql, ",").unwrap();
            } else {
                writeln!(sql).unwrap();
            }
        }

        write!(sql, ")").unwrap();

        sql
    }

    fn column_sql(self, column: &Column) -> String {
        let mut sql = String::new();

        write!(
            sql,
            "{} {}",
            self.quote_ident(&column.name),
            self.type_name(column.ty)
        )
        .unwrap();

        if !column.nullable {
            write!(sql, " NOT NULL").unwrap();
        }

        match (self, column.auto_increment, column.primary_key) {
            (Dialect::Postgres, true, pk) => {
                write!(sql, " GENERATED ALWAYS AS IDENTITY").unwrap();
                if pk {
                    write!(sql, " PRIMARY KEY").unwrap();
                }
            }
            (Dialect::MySql, true, pk) => {
                write!(sql, " AUTO_INCREMENT").unwrap();
                if pk {
                    write!(sql, " PRIMARY KEY").unwrap();
                }
            }
            // AUTOINCREMENT is only valid directly after PRIMARY KEY
            (Dialect::Sqlite, true, _) => write!(sql, " PRIMARY KEY AUTOINCREMENT").unwrap(),
            (_, false, true) => write!(sql, " PRIMARY KEY").unwrap(),
            (_, false, false) => {}
        }

        if let Some(default) = &column.default {
            write!(sql, " DEFAULT {}", default).unwrap();
        }

        sql
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "PostgreSQL"),
            Dialect::MySql => write!(f, "MySQL"),
            Dialect::Sqlite => write!(f, "SQLite"),
        }
    }
}
