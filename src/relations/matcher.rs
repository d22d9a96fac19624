//! Dictionary construction and per-parent matching for eager loads.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{Model, ParentModel, RelatedModel};
use crate::path::KeyPath;
use crate::value::Key;

use super::pivot::pivot_attributes;

/// Build the owner-key dictionary from a query result set.
///
/// Duplicate owner keys resolve last-write-wins; uniqueness is a caller
/// convention, not enforced here.
pub fn build_dictionary<'a, R: Model>(owner_key: &str, results: &'a [R]) -> HashMap<Key, &'a R> {
    let mut dictionary = HashMap::with_capacity(results.len());

    for result in results {
        if let Some(key) = result.attribute(owner_key) {
            dictionary.insert(key, result);
        }
    }

    dictionary
}

/// Match eagerly loaded results to their parents.
///
/// Each parent's matches follow the order of its own key array, not
/// dictionary or result order. Keys with no dictionary entry are silently
/// dropped. For object-array paths, pivot attributes are synthesized from
/// the current parent for every matched record before assignment.
pub fn match_parents<P, R>(
    path: &KeyPath,
    owner_key: &str,
    parents: &mut [P],
    results: &[R],
    relation: &str,
) where
    P: ParentModel<R>,
    R: RelatedModel,
{
    let dictionary = build_dictionary(owner_key, results);
    debug!(
        relation = relation,
        parents = parents.len(),
        results = results.len(),
        "matching eager results"
    );

    for parent in parents.iter_mut() {
        let keys = path.keys_in(parent.json_attribute(path.column()));
        let mut matches = Vec::with_capacity(keys.len());

        for key in &keys {
            let Some(&result) = dictionary.get(key) else {
                continue;
            };
            let mut matched = result.clone();
            if path.is_object_array() {
                matched.set_pivot(pivot_attributes(path, parent, key));
            }
            matches.push(matched);
        }

        parent.set_relation(relation, matches);
    }
}
