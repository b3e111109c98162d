//! chip-order
//!
//! Hierarchical ordering of feedback-template chips.
//!
//! Layered architecture:
//! - domain: chip records and errors
//! - ordering: comparator, hierarchy analysis and the order resolver
//! - tree / editor / picker: consumers of a resolved order
//! - source: where chip collections come from
//!
//! ```
//! use chip_order::{resolve_order, Chip, SortSpec};
//!
//! let chips = vec![
//!     Chip::group(1, "B"),
//!     Chip::group(2, "A").under(1),
//!     Chip::leaf(3, "x").under(2),
//!     Chip::leaf(4, "y").under(1),
//!     Chip::group(5, "A"),
//! ];
//! let ids: Vec<u32> = resolve_order(&chips, &SortSpec::default())
//!     .iter()
//!     .map(|chip| chip.id)
//!     .collect();
//! assert_eq!(ids, vec![5, 1, 2, 3, 4]);
//! ```

pub mod config;
pub mod domain;
pub mod editor;
pub mod ordering;
pub mod picker;
pub mod source;
pub mod tree;

pub use config::{HierarchyPolicy, KeyEncoding, ResolverConfig};
pub use domain::{
    Chip, ChipId, ChipKind, ChipRecord, DomainError, DomainResult, Entity, FeedbackTemplate,
    SortField, TaskStatus,
};
pub use ordering::{
    resolve_order, resolve_order_by, ChipOrderResolver, Hierarchy, HierarchyIssue, IssueKind,
    Resolution, SortDirection, SortSpec,
};
