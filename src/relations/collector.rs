//! Batch foreign-key collection for eager loading.

use crate::model::Model;
use crate::path::KeyPath;
use crate::value::Key;

/// Gather the foreign keys from a batch of parent records.
///
/// Every parent's key array is appended, then the union is sorted ascending
/// and deduplicated, producing a deterministic parameter list regardless of
/// parent order. An empty union collapses to a single null sentinel so the
/// membership query stays well-formed and matches nothing.
///
/// This sorted order is a query-construction detail only; per-parent
/// matching keeps each parent's own key order (see
/// [`super::matcher::match_parents`]).
pub fn collect_eager_keys<P: Model>(path: &KeyPath, parents: &[P]) -> Vec<Key> {
    let mut keys: Vec<Key> = Vec::new();

    for parent in parents {
        keys.extend(path.keys_in(parent.json_attribute(path.column())));
    }

    if keys.is_empty() {
        return vec![Key::Null];
    }

    keys.sort_unstable();
    keys.dedup();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parent(ids: serde_json::Value) -> Record {
        Record::from_json(json!({"options": {"recommendation_ids": ids}})).unwrap()
    }

    #[test]
    fn test_sorted_deduplicated_union() {
        let path = KeyPath::parse("options->recommendation_ids").unwrap();
        let parents = vec![parent(json!([3, 1, 2])), parent(json!([2, 2, 5]))];

        let keys = collect_eager_keys(&path, &parents);
        assert_eq!(keys, vec![Key::Int(1), Key::Int(2), Key::Int(3), Key::Int(5)]);
    }

    #[test]
    fn test_empty_batch_yields_null_sentinel() {
        let path = KeyPath::parse("options->recommendation_ids").unwrap();
        let parents = vec![parent(json!([])), parent(json!([]))];

        assert_eq!(collect_eager_keys(&path, &parents), vec![Key::Null]);
        assert_eq!(collect_eager_keys::<Record>(&path, &[]), vec![Key::Null]);
    }

    #[test]
    fn test_order_independent_of_parent_order() {
        let path = KeyPath::parse("options->recommendation_ids").unwrap();
        let forward = vec![parent(json!([3, 1])), parent(json!([5]))];
        let reversed = vec![parent(json!([5])), parent(json!([3, 1]))];

        assert_eq!(
            collect_eager_keys(&path, &forward),
            collect_eager_keys(&path, &reversed)
        );
    }

    #[test]
    fn test_object_array_keys() {
        let path = KeyPath::parse("options->recommendations[]->post_id").unwrap();
        let parent = Record::from_json(json!({
            "options": {"recommendations": [
                {"post_id": 9, "score": 0.5},
                {"post_id": 3, "score": 0.9}
            ]}
        }))
        .unwrap();

        let keys = collect_eager_keys(&path, std::slice::from_ref(&parent));
        assert_eq!(keys, vec![Key::Int(3), Key::Int(9)]);
    }
}
