//! Foreign-key path specifications.
//!
//! A path describes where foreign keys live inside a parent's JSON column.
//! Two shapes are supported:
//!
//! - `"options->recommendation_ids"` — the addressed value is a flat array
//!   of scalar keys.
//! - `"options->recommendations[]->post_id"` — the addressed value is an
//!   array of objects; `post_id` is the key field inside each object and the
//!   remaining fields act as transient pivot metadata. The `[]`-marked
//!   segment may itself be the column, as in `"recommendations[]->post_id"`.
//!
//! Paths are parsed once at relation-definition time and validated eagerly;
//! a malformed path never reaches query construction.
//!
//! ```rust
//! use jsonfk::path::KeyPath;
//!
//! let path = KeyPath::parse("options->recommendation_ids").unwrap();
//! assert!(!path.is_object_array());
//!
//! let path = KeyPath::parse("options->recommendations[]->post_id").unwrap();
//! assert_eq!(path.pivot_key(), Some("post_id"));
//! ```

use serde_json::Value as JsonValue;
use smallvec::SmallVec;

use crate::error::{RelationError, RelationResult};
use crate::value::Key;

/// The separator between path segments.
const SEPARATOR: &str = "->";

/// The marker that flags a segment as an array of objects.
const ARRAY_MARKER: &str = "[]";

/// A parsed foreign-key path.
///
/// Immutable once built; the object-array invariant (`pivot_key` is set iff
/// the path is object-array shaped) holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    /// The JSON-typed column on the parent model.
    column: String,
    /// Field segments inside the column leading to the key array.
    segments: Vec<String>,
    /// Key field inside each array element (object-array form only).
    pivot_key: Option<String>,
}

impl KeyPath {
    /// Parse a declarative path string.
    ///
    /// Fails with [`crate::error::ErrorCode::InvalidPath`] on a missing
    /// separator, empty segments, unbalanced or misplaced `[]` markers, or
    /// anything other than exactly one segment after `[]->`.
    pub fn parse(raw: &str) -> RelationResult<Self> {
        if !raw.contains(SEPARATOR) {
            return Err(RelationError::invalid_path(raw, "missing '->' separator"));
        }

        let parts: Vec<&str> = raw.split(SEPARATOR).collect();
        let mut fields = Vec::with_capacity(parts.len());
        let mut marker_at = None;

        for (idx, part) in parts.iter().enumerate() {
            let (name, marked) = match part.strip_suffix(ARRAY_MARKER) {
                Some(name) => (name, true),
                None => (*part, false),
            };

            if name.is_empty() {
                return Err(RelationError::invalid_path(raw, "empty path segment"));
            }
            if name.contains('[') || name.contains(']') {
                return Err(RelationError::invalid_path(raw, "unbalanced '[]' marker"));
            }
            if marked {
                if marker_at.is_some() {
                    return Err(RelationError::invalid_path(raw, "multiple '[]' markers"));
                }
                marker_at = Some(idx);
            }

            fields.push(name.to_string());
        }

        match marker_at {
            None => {
                let column = fields.remove(0);
                Ok(Self {
                    column,
                    segments: fields,
                    pivot_key: None,
                })
            }
            Some(idx) => {
                // The marked segment addresses the object array; exactly one
                // segment (the key field) must follow it.
                if idx + 2 != fields.len() {
                    let reason = if idx + 1 >= fields.len() {
                        "no key field after '[]->'"
                    } else {
                        "more than one segment after '[]->'"
                    };
                    return Err(RelationError::invalid_path(raw, reason));
                }
                let pivot_key = fields.pop();
                let column = fields.remove(0);
                Ok(Self {
                    column,
                    segments: fields,
                    pivot_key,
                })
            }
        }
    }

    /// The JSON-typed column on the parent model.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Nested field segments inside the column, excluding the key field.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The key field inside each array element, if object-array shaped.
    pub fn pivot_key(&self) -> Option<&str> {
        self.pivot_key.as_deref()
    }

    /// Whether the addressed value is an array of objects.
    pub fn is_object_array(&self) -> bool {
        self.pivot_key.is_some()
    }

    /// Render the nested segments as a JSONPath string (e.g., `$.a.b`).
    pub fn jsonpath_string(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.segments {
            path.push('.');
            path.push_str(segment);
        }
        path
    }

    /// Descend the nested segments within the decoded column value.
    fn resolve<'a>(&self, root: &'a JsonValue) -> Option<&'a JsonValue> {
        let mut current = root;
        for segment in &self.segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Extract the foreign keys from a parent's decoded column value.
    ///
    /// The addressed value is always coerced to array context: a missing
    /// value or JSON null yields nothing, a bare scalar yields itself, and
    /// an array yields its elements. For object-array paths each element is
    /// plucked at the key field. Non-scalar elements and elements missing
    /// the key field are skipped.
    pub fn keys_in(&self, root: Option<&JsonValue>) -> SmallVec<[Key; 4]> {
        let mut keys = SmallVec::new();
        let Some(value) = root.and_then(|r| self.resolve(r)) else {
            return keys;
        };

        match (&self.pivot_key, value) {
            (None, JsonValue::Array(elements)) => {
                keys.extend(elements.iter().filter_map(Key::from_scalar));
            }
            (None, scalar) => {
                // Bare scalar stored where an array is expected.
                keys.extend(Key::from_scalar(scalar));
            }
            (Some(field), JsonValue::Array(elements)) => {
                keys.extend(
                    elements
                        .iter()
                        .filter_map(|e| e.get(field))
                        .filter_map(Key::from_scalar),
                );
            }
            (Some(field), JsonValue::Object(_)) => {
                keys.extend(value.get(field).and_then(Key::from_scalar));
            }
            (Some(_), _) => {}
        }

        keys
    }

    /// Borrow the elements of the object array (pivot synthesis input).
    ///
    /// Empty for scalar paths and for values that are not arrays.
    pub fn objects_in<'a>(&self, root: Option<&'a JsonValue>) -> &'a [JsonValue] {
        if !self.is_object_array() {
            return &[];
        }
        root.and_then(|r| self.resolve(r))
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column)?;
        for (idx, segment) in self.segments.iter().enumerate() {
            let last = idx + 1 == self.segments.len();
            if last && self.pivot_key.is_some() {
                write!(f, "->{}[]", segment)?;
            } else {
                write!(f, "->{}", segment)?;
            }
        }
        if let Some(key) = &self.pivot_key {
            if self.segments.is_empty() {
                // Marker sits on the column itself.
                write!(f, "[]")?;
            }
            write!(f, "->{}", key)?;
        }
        Ok(())
    }
}
