//! SQL generation utilities.

use url::Url;

use crate::error::{RelationError, RelationResult};

/// Escape a string for use in SQL (for identifiers, not values).
pub fn escape_identifier(name: &str) -> String {
    // Double any existing quotes
    let escaped = name.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Check if an identifier needs quoting.
pub fn needs_quoting(name: &str) -> bool {
    // Reserved keywords or names with special characters need quoting
    let reserved = [
        "user", "order", "group", "select", "from", "where", "table", "index",
        "key", "primary", "foreign", "check", "default", "null", "not", "and",
        "or", "in", "is", "like", "between", "case", "when", "then", "else",
        "end", "as", "on", "join", "left", "right", "inner", "outer", "cross",
        "natural", "using", "limit", "offset", "union", "intersect", "except",
        "all", "distinct", "having", "exists", "values", "set",
    ];

    if reserved.contains(&name.to_lowercase().as_str()) {
        return true;
    }

    !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote an identifier if needed.
pub fn quote_identifier(name: &str) -> String {
    if needs_quoting(name) {
        escape_identifier(name)
    } else {
        name.to_string()
    }
}

/// Qualify a column with its table, quoting both sides as needed.
pub fn qualify(table: &str, column: &str) -> String {
    format!("{}.{}", quote_identifier(table), quote_identifier(column))
}

/// The SQL dialect a relation compiles against.
///
/// Selected once at relation-definition time, never inferred from a live
/// query object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// PostgreSQL uses $1, $2, etc.
    PostgreSQL,
    /// MySQL uses ?, ?, etc.
    MySQL,
    /// SQLite uses ?, ?, etc.
    SQLite,
}

impl DatabaseType {
    /// Get the parameter placeholder for this database type.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${}", index),
            Self::MySQL | Self::SQLite => "?".to_string(),
        }
    }

    /// Get the dialect name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
            Self::SQLite => "sqlite",
        }
    }

    /// Select the dialect from a connection string scheme.
    ///
    /// ```rust
    /// use jsonfk::sql::DatabaseType;
    ///
    /// let db = DatabaseType::from_url("postgres://localhost/app").unwrap();
    /// assert_eq!(db, DatabaseType::PostgreSQL);
    /// ```
    pub fn from_url(url: &str) -> RelationResult<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| RelationError::invalid_connection_string(url, e.to_string()))?;

        match parsed.scheme().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::PostgreSQL),
            "mysql" | "mariadb" => Ok(Self::MySQL),
            "sqlite" | "file" => Ok(Self::SQLite),
            scheme => Err(RelationError::invalid_connection_string(
                url,
                format!("unsupported scheme '{}'", scheme),
            )),
        }
    }
}

impl Default for DatabaseType {
    fn default() -> Self {
        Self::PostgreSQL
    }
}
