//! Fleet polling and per-node merging.

pub mod aggregator;
pub mod poller;

pub use aggregator::{merge_categories, SnapshotAggregator};
pub use poller::{poll_category, CategoryResults};
