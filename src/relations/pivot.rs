//! Pivot-attribute synthesis for array-of-objects paths.

use crate::model::{Model, PivotAttributes};
use crate::path::KeyPath;
use crate::value::Key;

/// Derive the pivot attributes for one matched related record.
///
/// Scans the parent's array-of-objects value for the first element whose
/// key field equals `owner_value` and returns that element's fields minus
/// the key field. A missing element yields an empty map — never an error.
/// The result is recomputed on every call and never persisted.
pub fn pivot_attributes<P: Model>(
    path: &KeyPath,
    parent: &P,
    owner_value: &Key,
) -> PivotAttributes {
    let Some(key_field) = path.pivot_key() else {
        return PivotAttributes::new();
    };

    let elements = path.objects_in(parent.json_attribute(path.column()));

    let record = elements.iter().find(|element| {
        element
            .get(key_field)
            .and_then(Key::from_scalar)
            .is_some_and(|key| key == *owner_value)
    });

    match record.and_then(|r| r.as_object()) {
        Some(object) => object
            .iter()
            .filter(|(field, _)| field.as_str() != key_field)
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect(),
        None => PivotAttributes::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parent() -> Record {
        Record::from_json(json!({
            "options": {"recommendations": [
                {"post_id": 3, "score": 0.9},
                {"post_id": 9, "score": 0.5}
            ]}
        }))
        .unwrap()
    }

    #[test]
    fn test_pivot_excludes_key_field() {
        let path = KeyPath::parse("options->recommendations[]->post_id").unwrap();
        let pivot = pivot_attributes(&path, &parent(), &Key::Int(3));

        assert_eq!(pivot.len(), 1);
        assert_eq!(pivot["score"], json!(0.9));
        assert!(!pivot.contains_key("post_id"));
    }

    #[test]
    fn test_missing_element_yields_empty_map() {
        let path = KeyPath::parse("options->recommendations[]->post_id").unwrap();
        let pivot = pivot_attributes(&path, &parent(), &Key::Int(42));
        assert!(pivot.is_empty());
    }

    #[test]
    fn test_first_matching_element_wins() {
        let path = KeyPath::parse("recommendations[]->post_id").unwrap();
        let parent = Record::from_json(json!({
            "recommendations": [
                {"post_id": 3, "rank": 1},
                {"post_id": 3, "rank": 2}
            ]
        }))
        .unwrap();

        let pivot = pivot_attributes(&path, &parent, &Key::Int(3));
        assert_eq!(pivot["rank"], json!(1));
    }

    #[test]
    fn test_recomputation_is_deterministic() {
        let path = KeyPath::parse("options->recommendations[]->post_id").unwrap();
        let parent = parent();
        let first = pivot_attributes(&path, &parent, &Key::Int(9));
        let second = pivot_attributes(&path, &parent, &Key::Int(9));
        assert_eq!(first, second);
    }

    #[test]
    fn test_scalar_path_yields_empty_map() {
        let path = KeyPath::parse("options->recommendation_ids").unwrap();
        let parent = Record::from_json(json!({"options": {"recommendation_ids": [3]}})).unwrap();
        assert!(pivot_attributes(&path, &parent, &Key::Int(3)).is_empty());
    }
}
