//! Dialect-specific JSON containment SQL.
//!
//! Different backends encode "value appears inside a JSON array" and "value
//! appears as a field inside an array of JSON objects" with different SQL.
//! The relation layer only chooses *which* compiler to invoke (array vs
//! object shape); the grammar decides *how* the SQL is emitted.
//!
//! | Predicate        | PostgreSQL            | MySQL            | SQLite               |
//! |------------------|-----------------------|------------------|----------------------|
//! | array contains   | `@> to_jsonb(col)`    | `json_contains`  | `json_each` + EXISTS |
//! | object contains  | `@>` + build_object   | `json_contains`  | `json_each` + extract|
//!
//! The object-containment key field is always bound as a query parameter,
//! never inlined into the SQL text.

use crate::path::KeyPath;
use crate::sql::{self, DatabaseType};
use crate::value::Key;

/// A compiled containment fragment: SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// The SQL text.
    pub sql: String,
    /// Parameters bound by the fragment, in placeholder order.
    pub params: Vec<Key>,
}

impl Fragment {
    fn new(sql: String) -> Self {
        Self { sql, params: Vec::new() }
    }

    fn with_params(sql: String, params: Vec<Key>) -> Self {
        Self { sql, params }
    }
}

/// Backend JSON grammar capability.
///
/// One implementation per supported dialect, selected from
/// [`DatabaseType`] at setup time.
pub trait JsonGrammar: std::fmt::Debug + Send + Sync {
    /// Render the expression addressing the key array inside the parent's
    /// JSON column, qualified with the parent table.
    fn path_expr(&self, table: &str, path: &KeyPath) -> String;

    /// Predicate testing that `column` is a member of the JSON array at
    /// `path_expr`. Binds no parameters.
    fn array_contains(&self, path_expr: &str, column: &str) -> Fragment;

    /// Predicate testing that an object pairing `key_field` with `column`
    /// appears in the JSON array at `path_expr`. The key field name is
    /// bound as a parameter; `index` is its 1-based position within the
    /// enclosing query.
    fn object_contains(&self, path_expr: &str, key_field: &str, column: &str, index: usize)
        -> Fragment;
}

/// Select the grammar for a configured dialect.
pub fn grammar_for(db: DatabaseType) -> &'static dyn JsonGrammar {
    match db {
        DatabaseType::PostgreSQL => &PostgresGrammar,
        DatabaseType::MySQL => &MySqlGrammar,
        DatabaseType::SQLite => &SqliteGrammar,
    }
}

/// PostgreSQL grammar: jsonb containment operators.
#[derive(Debug, Clone, Copy)]
pub struct PostgresGrammar;

impl JsonGrammar for PostgresGrammar {
    fn path_expr(&self, table: &str, path: &KeyPath) -> String {
        let mut expr = format!("({})::jsonb", sql::qualify(table, path.column()));
        for segment in path.segments() {
            expr.push_str(" -> '");
            expr.push_str(segment);
            expr.push('\'');
        }
        expr
    }

    fn array_contains(&self, path_expr: &str, column: &str) -> Fragment {
        // jsonb containment treats a scalar right-hand side as a
        // single-element array, so no wrapping is needed.
        Fragment::new(format!("{} @> to_jsonb({})", path_expr, column))
    }

    fn object_contains(
        &self,
        path_expr: &str,
        key_field: &str,
        column: &str,
        index: usize,
    ) -> Fragment {
        let placeholder = DatabaseType::PostgreSQL.placeholder(index);
        Fragment::with_params(
            format!(
                "{} @> jsonb_build_array(jsonb_build_object({}::text, {}))",
                path_expr, placeholder, column
            ),
            vec![Key::String(key_field.to_string())],
        )
    }
}

/// MySQL grammar: `json_contains` with `json_array`/`json_object` candidates.
#[derive(Debug, Clone, Copy)]
pub struct MySqlGrammar;

impl JsonGrammar for MySqlGrammar {
    fn path_expr(&self, table: &str, path: &KeyPath) -> String {
        let column = sql::qualify(table, path.column());
        if path.segments().is_empty() {
            return column;
        }
        format!("json_extract({}, '{}')", column, path.jsonpath_string())
    }

    fn array_contains(&self, path_expr: &str, column: &str) -> Fragment {
        Fragment::new(format!("json_contains({}, json_array({}))", path_expr, column))
    }

    fn object_contains(
        &self,
        path_expr: &str,
        key_field: &str,
        column: &str,
        index: usize,
    ) -> Fragment {
        let placeholder = DatabaseType::MySQL.placeholder(index);
        Fragment::with_params(
            format!(
                "json_contains({}, json_array(json_object({}, {})))",
                path_expr, placeholder, column
            ),
            vec![Key::String(key_field.to_string())],
        )
    }
}

/// SQLite grammar: correlated `json_each` table-valued function.
#[derive(Debug, Clone, Copy)]
pub struct SqliteGrammar;

impl JsonGrammar for SqliteGrammar {
    fn path_expr(&self, table: &str, path: &KeyPath) -> String {
        let column = sql::qualify(table, path.column());
        if path.segments().is_empty() {
            return column;
        }
        format!("json_extract({}, '{}')", column, path.jsonpath_string())
    }

    fn array_contains(&self, path_expr: &str, column: &str) -> Fragment {
        Fragment::new(format!(
            "exists (select 1 from json_each({}) where json_each.value = {})",
            path_expr, column
        ))
    }

    fn object_contains(
        &self,
        path_expr: &str,
        key_field: &str,
        column: &str,
        index: usize,
    ) -> Fragment {
        let placeholder = DatabaseType::SQLite.placeholder(index);
        Fragment::with_params(
            format!(
                "exists (select 1 from json_each({}) \
                 where json_extract(json_each.value, '$.' || {}) = {})",
                path_expr, placeholder, column
            ),
            vec![Key::String(key_field.to_string())],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scalar_path() -> KeyPath {
        KeyPath::parse("options->recommendation_ids").unwrap()
    }

    fn object_path() -> KeyPath {
        KeyPath::parse("options->recommendations[]->post_id").unwrap()
    }

    #[test]
    fn test_postgres_path_expr() {
        let grammar = grammar_for(DatabaseType::PostgreSQL);
        assert_eq!(
            grammar.path_expr("posts", &scalar_path()),
            "(posts.options)::jsonb -> 'recommendation_ids'"
        );
    }

    #[test]
    fn test_postgres_array_contains() {
        let grammar = grammar_for(DatabaseType::PostgreSQL);
        let expr = grammar.path_expr("posts", &scalar_path());
        let fragment = grammar.array_contains(&expr, "posts.id");
        assert_eq!(
            fragment.sql,
            "(posts.options)::jsonb -> 'recommendation_ids' @> to_jsonb(posts.id)"
        );
        assert!(fragment.params.is_empty());
    }

    #[test]
    fn test_postgres_object_contains_binds_key_field() {
        let grammar = grammar_for(DatabaseType::PostgreSQL);
        let expr = grammar.path_expr("posts", &object_path());
        let fragment = grammar.object_contains(&expr, "post_id", "posts.id", 1);
        assert_eq!(
            fragment.sql,
            "(posts.options)::jsonb -> 'recommendations' \
             @> jsonb_build_array(jsonb_build_object($1::text, posts.id))"
        );
        assert_eq!(fragment.params, vec![Key::String("post_id".into())]);
    }

    #[test]
    fn test_mysql_fragments() {
        let grammar = grammar_for(DatabaseType::MySQL);
        let expr = grammar.path_expr("posts", &scalar_path());
        assert_eq!(expr, "json_extract(posts.options, '$.recommendation_ids')");

        let fragment = grammar.array_contains(&expr, "posts.id");
        assert_eq!(
            fragment.sql,
            "json_contains(json_extract(posts.options, '$.recommendation_ids'), json_array(posts.id))"
        );

        let expr = grammar.path_expr("posts", &object_path());
        let fragment = grammar.object_contains(&expr, "post_id", "posts.id", 1);
        assert_eq!(
            fragment.sql,
            "json_contains(json_extract(posts.options, '$.recommendations'), \
             json_array(json_object(?, posts.id)))"
        );
        assert_eq!(fragment.params, vec![Key::String("post_id".into())]);
    }

    #[test]
    fn test_sqlite_fragments() {
        let grammar = grammar_for(DatabaseType::SQLite);
        let expr = grammar.path_expr("posts", &scalar_path());
        let fragment = grammar.array_contains(&expr, "posts.id");
        assert_eq!(
            fragment.sql,
            "exists (select 1 from json_each(json_extract(posts.options, '$.recommendation_ids')) \
             where json_each.value = posts.id)"
        );

        let expr = grammar.path_expr("posts", &object_path());
        let fragment = grammar.object_contains(&expr, "post_id", "posts.id", 1);
        assert_eq!(
            fragment.sql,
            "exists (select 1 from json_each(json_extract(posts.options, '$.recommendations')) \
             where json_extract(json_each.value, '$.' || ?) = posts.id)"
        );
        assert_eq!(fragment.params, vec![Key::String("post_id".into())]);
    }

    #[test]
    fn test_marker_on_column_uses_bare_column() {
        let path = KeyPath::parse("recommendations[]->post_id").unwrap();
        let grammar = grammar_for(DatabaseType::MySQL);
        assert_eq!(grammar.path_expr("posts", &path), "posts.recommendations");
    }
}
