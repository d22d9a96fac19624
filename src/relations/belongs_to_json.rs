//! The belongs-to-JSON relation.
//!
//! A parent record stores the foreign keys of the records it belongs to
//! inside a JSON column, either as a flat array of scalars or as an array
//! of objects carrying pivot metadata next to each key:
//!
//! ```json
//! {"recommendation_ids": [2, 5]}
//! {"recommendations": [{"post_id": 2, "score": 0.9}]}
//! ```
//!
//! ```rust
//! use jsonfk::prelude::*;
//!
//! let relation = BelongsToJson::new("users", "posts", "options->recommendation_ids")
//!     .unwrap()
//!     .database(DatabaseType::PostgreSQL);
//!
//! let (sql, params) = relation.existence_query(&["*"]);
//! assert!(sql.contains("@>"));
//! assert!(params.is_empty());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::engine::QueryEngine;
use crate::error::RelationResult;
use crate::grammar::{grammar_for, JsonGrammar};
use crate::model::{Model, Record, RelatedModel};
use crate::path::KeyPath;
use crate::relations::collector::collect_eager_keys;
use crate::relations::matcher::match_parents;
use crate::relations::pivot::pivot_attributes;
use crate::sql::{self, DatabaseType};
use crate::value::Key;

/// Counter backing self-join alias generation. Process-wide so two
/// sequential existence queries never share an alias.
static SELF_JOIN_COUNT: AtomicU64 = AtomicU64::new(0);

/// A belongs-to relation whose foreign keys live in a parent JSON column.
#[derive(Debug, Clone)]
pub struct BelongsToJson {
    path: KeyPath,
    parent_table: String,
    related_table: String,
    owner_key: String,
    db: DatabaseType,
}

impl BelongsToJson {
    /// Define the relation.
    ///
    /// The path string is parsed and validated here; a malformed path fails
    /// the definition, never a later query. The owner key defaults to `id`
    /// and the dialect to PostgreSQL.
    pub fn new(
        parent_table: impl Into<String>,
        related_table: impl Into<String>,
        path: &str,
    ) -> RelationResult<Self> {
        Ok(Self {
            path: KeyPath::parse(path)?,
            parent_table: parent_table.into(),
            related_table: related_table.into(),
            owner_key: "id".to_string(),
            db: DatabaseType::default(),
        })
    }

    /// Set the owner-key attribute on the related model.
    pub fn owner_key(mut self, key: impl Into<String>) -> Self {
        self.owner_key = key.into();
        self
    }

    /// Set the SQL dialect the relation compiles against.
    pub fn database(mut self, db: DatabaseType) -> Self {
        self.db = db;
        self
    }

    /// The parsed foreign-key path.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// The related table name.
    pub fn related_table(&self) -> &str {
        &self.related_table
    }

    fn grammar(&self) -> &'static dyn JsonGrammar {
        grammar_for(self.db)
    }

    /// Compile the membership query for a single loaded parent.
    ///
    /// Reads the parent's key array and constrains the related table's
    /// owner key to it. An empty key array compiles `1 = 0`: well-formed,
    /// zero matches.
    pub fn constraint_query<P: Model>(&self, parent: &P, columns: &[&str]) -> (String, Vec<Key>) {
        let keys: Vec<Key> = self
            .path
            .keys_in(parent.json_attribute(self.path.column()))
            .into_vec();
        self.membership_query(keys, columns)
    }

    /// Compile the membership query over a collected foreign-key set.
    pub fn eager_query(&self, keys: Vec<Key>, columns: &[&str]) -> (String, Vec<Key>) {
        self.membership_query(keys, columns)
    }

    fn membership_query(&self, keys: Vec<Key>, columns: &[&str]) -> (String, Vec<Key>) {
        let table = sql::quote_identifier(&self.related_table);
        let owner = sql::qualify(&self.related_table, &self.owner_key);

        if keys.is_empty() {
            let sql = format!("select {} from {} where 1 = 0", columns.join(", "), table);
            return (sql, keys);
        }

        let placeholders: Vec<String> = (1..=keys.len())
            .map(|i| self.db.placeholder(i))
            .collect();
        let sql = format!(
            "select {} from {} where {} in ({})",
            columns.join(", "),
            table,
            owner,
            placeholders.join(", ")
        );

        debug!(sql = %sql, keys = keys.len(), "compiled membership query");
        (sql, keys)
    }

    /// Compile the correlated containment predicate for relation-existence
    /// queries.
    ///
    /// When parent and related queries target the same physical table, the
    /// related side is aliased to a freshly generated identifier before the
    /// predicate is built, so column references stay unambiguous.
    pub fn existence_query(&self, columns: &[&str]) -> (String, Vec<Key>) {
        let grammar = self.grammar();
        let path_expr = grammar.path_expr(&self.parent_table, &self.path);

        let (from, owner) = if self.parent_table == self.related_table {
            let alias = self.self_join_alias();
            let from = format!(
                "{} as {}",
                sql::quote_identifier(&self.related_table),
                sql::quote_identifier(&alias)
            );
            (from, sql::qualify(&alias, &self.owner_key))
        } else {
            (
                sql::quote_identifier(&self.related_table),
                sql::qualify(&self.related_table, &self.owner_key),
            )
        };

        let fragment = match self.path.pivot_key() {
            Some(key_field) => grammar.object_contains(&path_expr, key_field, &owner, 1),
            None => grammar.array_contains(&path_expr, &owner),
        };

        let sql = format!(
            "select {} from {} where {}",
            columns.join(", "),
            from,
            fragment.sql
        );
        debug!(sql = %sql, "compiled existence query");
        (sql, fragment.params)
    }

    /// Generate a unique alias for the self-referencing case.
    fn self_join_alias(&self) -> String {
        let n = SELF_JOIN_COUNT.fetch_add(1, Ordering::Relaxed);
        format!("{}_self_{}", self.related_table, n)
    }

    /// Load the relation for one parent.
    ///
    /// One query round-trip; for object-array paths the pivot attributes
    /// are hydrated on every returned record from this parent.
    pub async fn load<E, P>(&self, engine: &E, parent: &P) -> RelationResult<Vec<Record>>
    where
        E: QueryEngine,
        P: Model,
    {
        let (sql, params) = self.constraint_query(parent, &["*"]);
        let mut records = engine.query(&sql, params).await?;

        if self.path.is_object_array() {
            self.hydrate_pivots(parent, &mut records);
        }

        Ok(records)
    }

    /// Eagerly load the relation for a batch of parents.
    ///
    /// One query over the union of all parents' keys, then in-memory
    /// matching in each parent's own key order.
    pub async fn eager_load<E>(
        &self,
        engine: &E,
        parents: &mut [Record],
        relation: &str,
    ) -> RelationResult<()>
    where
        E: QueryEngine,
    {
        let keys = collect_eager_keys(&self.path, parents);
        let (sql, params) = self.eager_query(keys, &["*"]);
        let results = engine.query(&sql, params).await?;

        match_parents(&self.path, &self.owner_key, parents, &results, relation);
        Ok(())
    }

    /// Recompute and attach pivot attributes on already-loaded records.
    pub fn hydrate_pivots<P, R>(&self, parent: &P, records: &mut [R])
    where
        P: Model,
        R: RelatedModel,
    {
        for record in records.iter_mut() {
            let Some(owner_value) = record.attribute(&self.owner_key) else {
                continue;
            };
            record.set_pivot(pivot_attributes(&self.path, parent, &owner_value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn scalar_relation() -> BelongsToJson {
        BelongsToJson::new("users", "posts", "options->recommendation_ids").unwrap()
    }

    fn pivot_relation() -> BelongsToJson {
        BelongsToJson::new("users", "posts", "options->recommendations[]->post_id").unwrap()
    }

    #[test]
    fn test_definition_rejects_malformed_path() {
        assert!(BelongsToJson::new("users", "posts", "options").is_err());
        assert!(BelongsToJson::new("users", "posts", "options->recs[]").is_err());
    }

    #[test]
    fn test_constraint_query_uses_parent_keys() {
        let relation = scalar_relation();
        let parent =
            Record::from_json(json!({"id": 1, "options": {"recommendation_ids": [2, 5]}})).unwrap();

        let (sql, params) = relation.constraint_query(&parent, &["*"]);
        assert_eq!(sql, "select * from posts where posts.id in ($1, $2)");
        assert_eq!(params, vec![Key::Int(2), Key::Int(5)]);
    }

    #[test]
    fn test_constraint_query_empty_keys_compiles_false_predicate() {
        let relation = scalar_relation();
        let parent = Record::from_json(json!({"id": 1, "options": {}})).unwrap();

        let (sql, params) = relation.constraint_query(&parent, &["*"]);
        assert_eq!(sql, "select * from posts where 1 = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_mysql_placeholders() {
        let relation = scalar_relation().database(DatabaseType::MySQL);
        let parent =
            Record::from_json(json!({"options": {"recommendation_ids": [2, 5]}})).unwrap();

        let (sql, _) = relation.constraint_query(&parent, &["*"]);
        assert_eq!(sql, "select * from posts where posts.id in (?, ?)");
    }

    #[test]
    fn test_existence_query_scalar_shape() {
        let relation = scalar_relation();
        let (sql, params) = relation.existence_query(&["*"]);

        assert_eq!(
            sql,
            "select * from posts where (users.options)::jsonb -> 'recommendation_ids' \
             @> to_jsonb(posts.id)"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_existence_query_object_shape_binds_key_field() {
        let relation = pivot_relation();
        let (sql, params) = relation.existence_query(&["count(*)"]);

        assert_eq!(
            sql,
            "select count(*) from posts where (users.options)::jsonb -> 'recommendations' \
             @> jsonb_build_array(jsonb_build_object($1::text, posts.id))"
        );
        assert_eq!(params, vec![Key::String("post_id".into())]);
    }

    #[test]
    fn test_self_referencing_existence_query_aliases_table() {
        let relation =
            BelongsToJson::new("posts", "posts", "options->recommendation_ids").unwrap();
        let (sql, _) = relation.existence_query(&["*"]);

        assert!(sql.contains("from posts as posts_self_"));
        assert!(sql.contains("to_jsonb(posts_self_"));
        // The parent side keeps the unaliased table.
        assert!(sql.contains("(posts.options)::jsonb"));
    }

    #[test]
    fn test_self_join_aliases_are_unique() {
        let relation =
            BelongsToJson::new("posts", "posts", "options->recommendation_ids").unwrap();

        let (first, _) = relation.existence_query(&["*"]);
        let (second, _) = relation.existence_query(&["*"]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_owner_key_override() {
        let relation = scalar_relation().owner_key("uuid");
        let parent =
            Record::from_json(json!({"options": {"recommendation_ids": ["a"]}})).unwrap();

        let (sql, _) = relation.constraint_query(&parent, &["*"]);
        assert_eq!(sql, "select * from posts where posts.uuid in ($1)");
    }
}
