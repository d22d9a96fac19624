//! # jsonfk
//!
//! Belongs-to relations resolved through JSON foreign-key arrays.
//!
//! Some schemas store the foreign keys of a belongs-to-many relationship
//! inside a JSON column on the parent row instead of a join table. This
//! crate resolves those relations: it parses the declarative path to the
//! keys, compiles dialect-aware membership and containment SQL, collects
//! keys across a batch for eager loading, matches results back to their
//! parents, and synthesizes transient pivot metadata from array-of-objects
//! shapes.
//!
//! ## Path shapes
//!
//! Two shapes are supported, declared as a path string:
//!
//! ```rust
//! use jsonfk::path::KeyPath;
//!
//! // A flat array of scalar keys: {"recommendation_ids": [2, 5]}
//! let scalar = KeyPath::parse("options->recommendation_ids").unwrap();
//! assert!(!scalar.is_object_array());
//!
//! // An array of objects with pivot metadata:
//! // {"recommendations": [{"post_id": 2, "score": 0.9}]}
//! let pivot = KeyPath::parse("options->recommendations[]->post_id").unwrap();
//! assert_eq!(pivot.pivot_key(), Some("post_id"));
//! ```
//!
//! Malformed paths fail at relation-definition time, never at query time.
//!
//! ## Defining and compiling a relation
//!
//! ```rust
//! use jsonfk::prelude::*;
//! use serde_json::json;
//!
//! let relation = BelongsToJson::new("users", "posts", "options->recommendation_ids")
//!     .unwrap()
//!     .database(DatabaseType::PostgreSQL);
//!
//! let parent = Record::from_json(json!({
//!     "id": 1,
//!     "options": {"recommendation_ids": [2, 5]}
//! })).unwrap();
//!
//! let (sql, params) = relation.constraint_query(&parent, &["*"]);
//! assert_eq!(sql, "select * from posts where posts.id in ($1, $2)");
//! assert_eq!(params, vec![Key::Int(2), Key::Int(5)]);
//! ```
//!
//! ## Eager loading
//!
//! Batch resolution is one query regardless of batch size: the keys of all
//! parents are deduplicated and sorted into a deterministic parameter list,
//! and matching preserves each parent's own key order.
//!
//! ```rust
//! use jsonfk::path::KeyPath;
//! use jsonfk::relations::collector::collect_eager_keys;
//! use jsonfk::{Key, Record};
//! use serde_json::json;
//!
//! let path = KeyPath::parse("options->recommendation_ids").unwrap();
//! let parents = vec![
//!     Record::from_json(json!({"options": {"recommendation_ids": [3, 1, 2]}})).unwrap(),
//!     Record::from_json(json!({"options": {"recommendation_ids": [2, 2, 5]}})).unwrap(),
//! ];
//!
//! let keys = collect_eager_keys(&path, &parents);
//! assert_eq!(keys, vec![Key::Int(1), Key::Int(2), Key::Int(3), Key::Int(5)]);
//! ```

pub mod engine;
pub mod error;
pub mod grammar;
pub mod logging;
pub mod model;
pub mod path;
pub mod relations;
pub mod sql;
pub mod value;

pub use engine::QueryEngine;
pub use error::{ErrorCode, RelationError, RelationResult};
pub use model::{Model, ParentModel, PivotAttributes, Record, RelatedModel};
pub use path::KeyPath;
pub use relations::BelongsToJson;
pub use sql::DatabaseType;
pub use value::Key;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::engine::QueryEngine;
    pub use crate::error::{ErrorCode, RelationError, RelationResult};
    pub use crate::model::{Model, ParentModel, PivotAttributes, Record, RelatedModel};
    pub use crate::path::KeyPath;
    pub use crate::relations::BelongsToJson;
    pub use crate::sql::DatabaseType;
    pub use crate::value::Key;
}
