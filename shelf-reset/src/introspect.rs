//! Reads a table's shape back out of the store's catalog and compares it
//! against the schema it was created from.

use std::fmt;

use shelf::database::{ColumnDefault, ColumnType, TableSchema};
use sqlx::{Any, AnyConnection};

use crate::dialect::Dialect;

/// A column as the store's catalog reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub primary_key: bool,
    pub auto_increment: bool,
}

/// An object that would be broken by dropping the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dependent {
    View(String),
    ForeignKey(String),
}

impl fmt::Display for Dependent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependent::View(name) => write!(f, "view `{}`", name),
            Dependent::ForeignKey(table) => write!(f, "foreign key on table `{}`", table),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mismatch {
    MissingTable,
    MissingColumn(String),
    UnexpectedColumn(String),
    Type {
        column: String,
        expected: ColumnType,
        found: String,
    },
    Nullable {
        column: String,
        expected: bool,
    },
    Default {
        column: String,
        expected: Option<ColumnDefault>,
        found: Option<String>,
    },
    PrimaryKey {
        column: String,
        expected: bool,
    },
    AutoIncrement {
        column: String,
        expected: bool,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::MissingTable => write!(f, "table does not exist"),
            Mismatch::MissingColumn(column) => write!(f, "column `{}` is missing", column),
            Mismatch::UnexpectedColumn(column) => write!(f, "unexpected column `{}`", column),
            Mismatch::Type {
                column,
                expected,
                found,
            } => write!(
                f,
                "column `{}` has type `{}`, expected {}",
                column, found, expected
            ),
            Mismatch::Nullable { column, expected } => {
                if *expected {
                    write!(f, "column `{}` is NOT NULL, expected nullable", column)
                } else {
                    write!(f, "column `{}` is nullable, expected NOT NULL", column)
                }
            }
            Mismatch::Default {
                column,
                expected,
                found,
            } => write!(
                f,
                "column `{}` defaults to {}, expected {}",
                column,
                found.as_deref().unwrap_or("nothing"),
                expected
                    .as_ref()
                    .map_or_else(|| "nothing".to_string(), ToString::to_string)
            ),
            Mismatch::PrimaryKey { column, expected } => {
                if *expected {
                    write!(f, "column `{}` is not the primary key", column)
                } else {
                    write!(f, "column `{}` is unexpectedly part of the primary key", column)
                }
            }
            Mismatch::AutoIncrement { column, expected } => {
                if *expected {
                    write!(f, "column `{}` is not generated by the store", column)
                } else {
                    write!(f, "column `{}` is unexpectedly generated by the store", column)
                }
            }
        }
    }
}

pub struct Introspector<'a> {
    dialect: Dialect,
    table_name: &'a str,
}

impl<'a> Introspector<'a> {
    pub fn new(dialect: Dialect, table_name: &'a str) -> Self {
        Introspector {
            dialect,
            table_name,
        }
    }

    /// The schema unqualified PostgreSQL DDL creates tables in. Column
    /// introspection is scoped to it, so the drop must be too.
    pub async fn current_schema(&self, conn: &mut AnyConnection) -> Result<Option<String>, sqlx::Error> {
        match self.dialect {
            Dialect::Postgres => {
                sqlx::query_scalar::<Any, Option<String>>("SELECT current_schema()::text")
                    .fetch_one(&mut *conn)
                    .await
            }
            Dialect::MySql | Dialect::Sqlite => Ok(None),
        }
    }

    /// Fetches the table's columns in declaration order, empty if the table does not exist.
    pub async fn columns(&self, conn: &mut AnyConnection) -> Result<Vec<StoreColumn>, sqlx::Error> {
        #[derive(Debug, sqlx::FromRow)]
        struct ColumnsQuery {
            column_name: String,
            data_type: String,
            is_nullable: String,
            column_default: Option<String>,
            is_primary_key: i64,
            is_auto_increment: i64,
        }

        let query = match self.dialect {
            Dialect::Postgres => FETCH_COLUMNS_POSTGRES,
            Dialect::MySql => FETCH_COLUMNS_MYSQL,
            Dialect::Sqlite => FETCH_COLUMNS_SQLITE,
        };

        let raw_columns: Vec<ColumnsQuery> = sqlx::query_as(query)
            .bind(self.table_name)
            .fetch_all(&mut *conn)
            .await?;

        Ok(raw_columns
            .into_iter()
            .map(|col| StoreColumn {
                name: col.column_name,
                data_type: col.data_type,
                nullable: col.is_nullable.eq_ignore_ascii_case("YES"),
                default: col.column_default,
                primary_key: col.is_primary_key > 0,
                auto_increment: col.is_auto_increment > 0,
            })
            .collect())
    }

    /// Finds views and foreign keys that depend on the table.
    ///
    /// PostgreSQL refuses a non-cascading drop through dependents on its own,
    /// so only SQLite and MySQL are inspected here.
    pub async fn dependents(&self, conn: &mut AnyConnection) -> Result<Vec<Dependent>, sqlx::Error> {
        let (views_query, foreign_keys_query) = match self.dialect {
            Dialect::Postgres => return Ok(Vec::new()),
            Dialect::MySql => (FETCH_VIEWS_MYSQL, FETCH_FOREIGN_KEYS_MYSQL),
            Dialect::Sqlite => (FETCH_VIEWS_SQLITE, FETCH_FOREIGN_KEYS_SQLITE),
        };

        let views: Vec<(String, String)> = sqlx::query_as(views_query)
            .bind(self.table_name)
            .fetch_all(&mut *conn)
            .await?;

        let mut foreign_keys = sqlx::query_scalar::<Any, String>(foreign_keys_query).bind(self.table_name);
        if self.dialect == Dialect::MySql {
            foreign_keys = foreign_keys.bind(self.table_name);
        }
        let foreign_keys = foreign_keys.fetch_all(&mut *conn).await?;

        Ok(views
            .into_iter()
            .filter(|(_, definition)| references_identifier(definition, self.table_name))
            .map(|(name, _)| Dependent::View(name))
            .chain(foreign_keys.into_iter().map(Dependent::ForeignKey))
            .collect())
    }
}

/// Compares catalog columns against the expected schema.
pub fn compare(dialect: Dialect, expected: &TableSchema, found: &[StoreColumn]) -> Vec<Mismatch> {
    if found.is_empty() {
        return vec![Mismatch::MissingTable];
    }

    let mut mismatches = Vec::new();

    for schema_col in &expected.columns {
        let db_col = match found.iter().find(|db_col| db_col.name == schema_col.name) {
            Some(db_col) => db_col,
            None => {
                mismatches.push(Mismatch::MissingColumn(schema_col.name.clone()));
                continue;
            }
        };

        if dialect.parse_type(&db_col.data_type) != Some(schema_col.ty) {
            mismatches.push(Mismatch::Type {
                column: schema_col.name.clone(),
                expected: schema_col.ty,
                found: db_col.data_type.clone(),
            });
        }

        if schema_col.nullable != db_col.nullable {
            mismatches.push(Mismatch::Nullable {
                column: schema_col.name.clone(),
                expected: schema_col.nullable,
            });
        }

        if schema_col.primary_key != db_col.primary_key {
            mismatches.push(Mismatch::PrimaryKey {
                column: schema_col.name.clone(),
                expected: schema_col.primary_key,
            });
        }

        if schema_col.auto_increment != db_col.auto_increment {
            mismatches.push(Mismatch::AutoIncrement {
                column: schema_col.name.clone(),
                expected: schema_col.auto_increment,
            });
        }

        // Generated columns report sequence defaults in some stores
        if !schema_col.auto_increment {
            let default_matches = match (&schema_col.default, &db_col.default) {
                (Some(expected), Some(found)) => expected.matches(found),
                (None, None) => true,
                _ => false,
            };
            if !default_matches {
                mismatches.push(Mismatch::Default {
                    column: schema_col.name.clone(),
                    expected: schema_col.default.clone(),
                    found: db_col.default.clone(),
                });
            }
        }
    }

    mismatches.extend(
        found
            .iter()
            .filter(|db_col| expected.column(&db_col.name).is_none())
            .map(|db_col| Mismatch::UnexpectedColumn(db_col.name.clone())),
    );

    mismatches
}

/// Whether `sql` mentions `ident` as a whole identifier, quoted or not.
fn references_identifier(sql: &str, ident: &str) -> bool {
    sql.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .any(|token| token.eq_ignore_ascii_case(ident))
}

const FETCH_COLUMNS_POSTGRES: &str = "
SELECT
    c.column_name::text AS column_name,
    c.data_type::text AS data_type,
    c.is_nullable::text AS is_nullable,
    c.column_default::text AS column_default,
    (
        SELECT
            COUNT(*)
        FROM information_schema.table_constraints tco
        JOIN information_schema.key_column_usage kcu
        ON kcu.constraint_name = tco.constraint_name
        AND kcu.constraint_schema = tco.constraint_schema
        WHERE
            tco.constraint_type = 'PRIMARY KEY' AND
            kcu.table_schema = c.table_schema AND
            kcu.table_name = c.table_name AND
            kcu.column_name = c.column_name
    ) AS is_primary_key,
    (
        CASE WHEN c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%'
        THEN 1 ELSE 0 END
    )::int8 AS is_auto_increment
FROM information_schema.columns c
WHERE c.table_schema = current_schema()
AND c.table_name = $1
ORDER BY c.ordinal_position
";

const FETCH_COLUMNS_MYSQL: &str = "
SELECT
    CAST(COLUMN_NAME AS CHAR) AS column_name,
    CAST(DATA_TYPE AS CHAR) AS data_type,
    CAST(IS_NULLABLE AS CHAR) AS is_nullable,
    CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
    CAST(CASE WHEN COLUMN_KEY = 'PRI' THEN 1 ELSE 0 END AS SIGNED) AS is_primary_key,
    CAST(CASE WHEN EXTRA LIKE '%auto_increment%' THEN 1 ELSE 0 END AS SIGNED) AS is_auto_increment
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE()
AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION
";

const FETCH_COLUMNS_SQLITE: &str = "
SELECT
    CAST(p.name AS TEXT) AS column_name,
    CAST(p.type AS TEXT) AS data_type,
    CASE WHEN p.\"notnull\" = 1 THEN 'NO' ELSE 'YES' END AS is_nullable,
    CAST(p.dflt_value AS TEXT) AS column_default,
    CASE WHEN p.pk > 0 THEN 1 ELSE 0 END AS is_primary_key,
    CASE WHEN p.pk > 0 AND EXISTS (
        SELECT 1 FROM sqlite_master m
        WHERE m.type = 'table' AND m.name = ?1 AND upper(m.sql) LIKE '%AUTOINCREMENT%'
    ) THEN 1 ELSE 0 END AS is_auto_increment
FROM pragma_table_info(?1) p
ORDER BY p.cid
";

const FETCH_VIEWS_MYSQL: &str = "
SELECT CAST(TABLE_NAME AS CHAR), CAST(VIEW_DEFINITION AS CHAR)
FROM information_schema.VIEWS
WHERE TABLE_SCHEMA = DATABASE()
AND VIEW_DEFINITION LIKE CONCAT('%', ?, '%')
";

const FETCH_FOREIGN_KEYS_MYSQL: &str = "
SELECT DISTINCT CAST(TABLE_NAME AS CHAR)
FROM information_schema.REFERENTIAL_CONSTRAINTS
WHERE CONSTRAINT_SCHEMA = DATABASE()
AND UNIQUE_CONSTRAINT_SCHEMA = DATABASE()
AND REFERENCED_TABLE_NAME = ?
AND TABLE_NAME <> ?
";

const FETCH_VIEWS_SQLITE: &str = "
SELECT CAST(name AS TEXT), CAST(sql AS TEXT)
FROM sqlite_master
WHERE type = 'view'
AND lower(sql) LIKE '%' || lower(?1) || '%'
UNION ALL
SELECT CAST(name AS TEXT), CAST(sql AS TEXT)
FROM sqlite_temp_master
WHERE type = 'view'
AND lower(sql) LIKE '%' || lower(?1) || '%'
";

const FETCH_FOREIGN_KEYS_SQLITE: &str = "
SELECT DISTINCT CAST(m.name AS TEXT)
FROM sqlite_master m, pragma_foreign_key_list(m.name) p
WHERE m.type = 'table'
AND m.name <> ?1
AND lower(p.\"table\") = lower(?1)
";
