use std::{fmt, time::Duration};

use sqlx::mysql::MySqlDatabaseError;

use crate::{dialect::Dialect, introspect::Mismatch};

/// What a failed reset left behind in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreState {
    /// Nothing was applied, any previous table and its rows survive.
    Unchanged,
    /// The previous table was dropped and no replacement exists.
    TableMissing,
    /// A new, empty table exists but it failed verification.
    TableRecreated,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreState::Unchanged => write!(f, "store left unchanged"),
            StoreState::TableMissing => write!(f, "table is now missing"),
            StoreState::TableRecreated => write!(f, "table was recreated"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("could not reach the store: {source}; {state}")]
    Connection {
        #[source]
        source: sqlx::Error,
        state: StoreState,
    },
    #[error("permission denied executing `{statement}`: {message}; {state}")]
    Permission {
        statement: String,
        message: String,
        state: StoreState,
    },
    #[error("conflict executing `{statement}`: {message}; {state}")]
    Conflict {
        statement: String,
        message: String,
        state: StoreState,
    },
    #[error("table `{table}` does not match the expected schema: {}; {state}", join(.mismatches))]
    SchemaMismatch {
        table: String,
        mismatches: Vec<Mismatch>,
        state: StoreState,
    },
    #[error(
        "table `{table}` {} `{statement}` failed: {source}; table is now missing",
        partial_outcome(.replaced_existing)
    )]
    PartialApplication {
        table: String,
        statement: String,
        replaced_existing: bool,
        #[source]
        source: sqlx::Error,
    },
    #[error("timed out after {timeout:?} during {phase}; {state}")]
    TimedOut {
        phase: &'static str,
        timeout: Duration,
        state: StoreState,
    },
    #[error("unsupported store `{0}`, expected PostgreSQL, MySQL or SQLite")]
    UnsupportedStore(String),
    #[error("store error executing `{statement}`: {source}; {state}")]
    Store {
        statement: String,
        #[source]
        source: sqlx::Error,
        state: StoreState,
    },
}

impl SchemaError {
    /// Sorts a store error into the taxonomy, using the dialect's error codes.
    pub fn from_store(
        dialect: Dialect,
        statement: impl Into<String>,
        err: sqlx::Error,
        state: StoreState,
    ) -> SchemaError {
        let statement = statement.into();

        match classify(dialect, &err) {
            ErrorKind::Connection => SchemaError::Connection { source: err, state },
            ErrorKind::Permission => SchemaError::Permission {
                statement,
                message: store_message(&err),
                state,
            },
            ErrorKind::Conflict => SchemaError::Conflict {
                statement,
                message: store_message(&err),
                state,
            },
            ErrorKind::Other => SchemaError::Store {
                statement,
                source: err,
                state,
            },
        }
    }

    pub fn state(&self) -> StoreState {
        match self {
            SchemaError::Connection { state, .. }
            | SchemaError::Permission { state, .. }
            | SchemaError::Conflict { state, .. }
            | SchemaError::SchemaMismatch { state, .. }
            | SchemaError::TimedOut { state, .. }
            | SchemaError::Store { state, .. } => *state,
            SchemaError::PartialApplication { .. } => StoreState::TableMissing,
            SchemaError::UnsupportedStore(_) => StoreState::Unchanged,
        }
    }

    /// Process exit code for the cli.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchemaError::UnsupportedStore(_) | SchemaError::Store { .. } => 1,
            SchemaError::Connection { .. } => 2,
            SchemaError::Permission { .. } => 3,
            SchemaError::Conflict { .. } => 4,
            SchemaError::SchemaMismatch { .. } => 5,
            SchemaError::PartialApplication { .. } => 6,
            SchemaError::TimedOut { .. } => 7,
        }
    }
}

fn join(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn partial_outcome(replaced_existing: &bool) -> &'static str {
    if *replaced_existing {
        "was dropped but"
    } else {
        "does not exist because"
    }
}

fn store_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    Connection,
    Permission,
    Conflict,
    Other,
}

pub(crate) fn classify(dialect: Dialect, err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => ErrorKind::Connection,
        sqlx::Error::Database(db_err) => {
            // MySQL reports SQLSTATE through `code`, which lumps access errors in with syntax errors
            let code = match dialect {
                Dialect::MySql => db_err
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .map(|err| err.number().to_string()),
                _ => db_err.code().map(|code| code.into_owned()),
            };

            code.map_or(ErrorKind::Other, |code| classify_code(dialect, &code))
        }
        _ => ErrorKind::Other,
    }
}

/// Classifies a store error code.
///
/// PostgreSQL codes are SQLSTATEs, MySQL codes are server error numbers and
/// SQLite codes are extended result codes.
pub(crate) fn classify_code(dialect: Dialect, code: &str) -> ErrorKind {
    match dialect {
        Dialect::Postgres => match code {
            "42501" => ErrorKind::Permission,
            "2BP01" | "55006" | "42P07" | "40P01" => ErrorKind::Conflict,
            "57P01" | "57P02" | "57P03" => ErrorKind::Connection,
            code if code.starts_with("08") => ErrorKind::Connection,
            _ => ErrorKind::Other,
        },
        Dialect::MySql => match code {
            "1044" | "1142" | "1227" | "1370" => ErrorKind::Permission,
            "1050" | "1205" | "1213" | "1217" | "1451" | "3730" => ErrorKind::Conflict,
            "1045" | "1053" | "1927" | "2002" | "2003" | "2006" | "2013" => {
                ErrorKind::Connection
            }
            _ => ErrorKind::Other,
        },
        Dialect::Sqlite => {
            let extended = match code.parse::<i32>() {
                Ok(extended) => extended,
                Err(_) => return ErrorKind::Other,
            };

            // SQLITE_CONSTRAINT_FOREIGNKEY
            if extended == 787 {
                return ErrorKind::Conflict;
            }

            match extended & 0xff {
                3 | 8 | 23 => ErrorKind::Permission,
                5 | 6 => ErrorKind::Conflict,
                14 | 26 => ErrorKind::Connection,
                _ => ErrorKind::Other,
            }
        }
    }
}
