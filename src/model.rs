//! Record access traits and the dynamic `Record` type.
//!
//! The relation engine never reads struct fields directly; it goes through
//! the small traits in this module. `Record` is the attribute-map
//! implementation used by the execution path and by tests; typed models can
//! implement the traits themselves.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{RelationError, RelationResult};
use crate::value::Key;

/// Transient pivot metadata attached to a matched related record.
///
/// Insertion-ordered so attributes keep the JSON object's field order.
pub type PivotAttributes = IndexMap<String, JsonValue>;

/// Read access to a record's attributes.
pub trait Model {
    /// Read a scalar attribute as a key value.
    ///
    /// Returns `None` when the attribute is absent or composite; a stored
    /// JSON null reads as `Some(Key::Null)`.
    fn attribute(&self, name: &str) -> Option<Key>;

    /// Read a JSON-decoded attribute (the column a [`crate::path::KeyPath`]
    /// addresses).
    fn json_attribute(&self, name: &str) -> Option<&JsonValue>;
}

/// A record that can carry pivot metadata after matching.
pub trait RelatedModel: Model + Clone {
    /// Attach the synthesized pivot attributes.
    fn set_pivot(&mut self, pivot: PivotAttributes);
}

/// A record that can hold a loaded relation.
pub trait ParentModel<R>: Model {
    /// Assign the matched related records under the relation name.
    fn set_relation(&mut self, name: &str, related: Vec<R>);
}

/// A dynamic record backed by an attribute map.
///
/// ```rust
/// use jsonfk::model::{Model, Record};
/// use serde_json::json;
///
/// let record = Record::from_json(json!({"id": 1, "title": "intro"})).unwrap();
/// assert_eq!(record.attribute("id"), Some(jsonfk::Key::Int(1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    attributes: IndexMap<String, JsonValue>,
    #[serde(skip)]
    relations: IndexMap<String, Vec<Record>>,
    #[serde(skip)]
    pivot: Option<PivotAttributes>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object.
    ///
    /// Fails when the value is not an object.
    pub fn from_json(value: JsonValue) -> RelationResult<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self {
                attributes: map.into_iter().collect(),
                relations: IndexMap::new(),
                pivot: None,
            }),
            other => Err(RelationError::deserialization(format!(
                "expected a JSON object row, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Read a raw attribute value.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.attributes.get(name)
    }

    /// All attributes, in insertion order.
    pub fn attributes(&self) -> &IndexMap<String, JsonValue> {
        &self.attributes
    }

    /// A loaded relation, if assigned.
    pub fn relation(&self, name: &str) -> Option<&[Record]> {
        self.relations.get(name).map(Vec::as_slice)
    }

    /// The pivot attributes attached during matching, if any.
    pub fn pivot(&self) -> Option<&PivotAttributes> {
        self.pivot.as_ref()
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

impl Model for Record {
    fn attribute(&self, name: &str) -> Option<Key> {
        let value = self.attributes.get(name)?;
        if value.is_null() {
            return Some(Key::Null);
        }
        Key::from_scalar(value)
    }

    fn json_attribute(&self, name: &str) -> Option<&JsonValue> {
        self.attributes.get(name)
    }
}

impl RelatedModel for Record {
    fn set_pivot(&mut self, pivot: PivotAttributes) {
        self.pivot = Some(pivot);
    }
}

impl ParentModel<Record> for Record {
    fn set_relation(&mut self, name: &str, related: Vec<Record>) {
        self.relations.insert(name.to_string(), related);
    }
}
