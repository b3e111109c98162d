//! Ordering Layer
//!
//! Comparator, hierarchy analysis, sort-key encodings and the resolver
//! that ties them together.

mod comparator;
mod hierarchy;
mod keys;
mod resolver;

pub use comparator::{SortDirection, SortSpec};
pub use hierarchy::{Hierarchy, HierarchyIssue, IssueKind};
pub use resolver::{resolve_order, resolve_order_by, ChipOrderResolver, Resolution};
