use std::fmt;

/// Logical column types, rendered to each store's nearest native type by the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    /// 64-bit signed integer.
    BigInt,
    /// Variable length text with no maximum.
    Text,
    /// Double precision floating point.
    Double,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BigInt => write!(f, "bigint"),
            Self::Text => write!(f, "text"),
            Self::Double => write!(f, "double precision"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum ColumnDefault {
    Float(f64),
    Int(i64),
    String(String),
}

impl ColumnDefault {
    /// Checks a default expression as reported by a store's catalog against this default.
    ///
    /// Stores echo defaults back in their own spelling (`5.0`, `'5'::double precision`,
    /// `(5.0)`), so casts, parentheses and quotes are stripped before comparing.
    pub fn matches(&self, raw: &str) -> bool {
        let raw = normalize_default(raw);

        match self {
            ColumnDefault::Float(val) => raw.parse::<f64>().map_or(false, |num| num == *val),
            ColumnDefault::Int(val) => raw.parse::<i64>().map_or(false, |num| num == *val),
            ColumnDefault::String(val) => raw == *val,
        }
    }
}

impl fmt::Display for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Debug keeps the fractional part, `5.0` instead of `5`
            ColumnDefault::Float(val) => write!(f, "{:?}", val),
            ColumnDefault::Int(val) => write!(f, "{}", val),
            ColumnDefault::String(val) => write!(f, "'{}'", val.replace('\'', "''")),
        }
    }
}

fn normalize_default(raw: &str) -> String {
    let mut raw = raw.trim();

    if let Some(idx) = raw.find("::") {
        raw = raw[..idx].trim();
    }

    while raw.len() >= 2 && raw.starts_with('(') && raw.ends_with(')') {
        raw = raw[1..raw.len() - 1].trim();
    }

    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].replace("''", "'");
    }

    raw.to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
    pub primary_key: bool,
    /// Values are generated by the store and never supplied by the caller.
    pub auto_increment: bool,
}

pub trait IntoTableSchema {
    fn table_schema() -> TableSchema;
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn float_default_matches_store_spellings() {
        let default = ColumnDefault::Float(5.0);

        assert!(default.matches("5.0"));
        assert!(default.matches("5"));
        assert!(default.matches("(5.0)"));
        assert!(default.matches("'5'::double precision"));
        assert!(default.matches(" 5.0 "));
        assert!(!default.matches("5.5"));
        assert!(!default.matches("nextval('products_id_seq'::regclass)"));
    }

    #[test]
    fn string_default_matches_quoted() {
        let default = ColumnDefault::String("it's".to_string());

        assert!(default.matches("'it''s'::text"));
        assert!(!default.matches("'its'"));
    }

    #[test]
    fn display() {
        assert_eq!(ColumnDefault::Float(5.0).to_string(), "5.0");
        assert_eq!(ColumnDefault::Int(3).to_string(), "3");
        assert_eq!(ColumnDefault::String("a'b".to_string()).to_string(), "'a''b'");
        assert_eq!(ColumnType::Double.to_string(), "double precision");
    }
}
