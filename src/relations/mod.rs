//! Relation resolution for JSON foreign-key columns.
//!
//! The pipeline for an eager load: [`collector::collect_eager_keys`]
//! gathers the batch's keys, [`BelongsToJson::eager_query`] compiles one
//! membership query over the union, and [`matcher::match_parents`] builds
//! the dictionary and assigns each parent its matches — synthesizing
//! [`pivot`] attributes when the path is array-of-objects shaped.
//!
//! A single load is the same shape without the batch step:
//! [`BelongsToJson::constraint_query`], then pivot hydration.

mod belongs_to_json;
pub mod collector;
pub mod matcher;
pub mod pivot;

pub use belongs_to_json::BelongsToJson;
