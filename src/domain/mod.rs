//! Domain Layer
//!
//! Chip records and the contract the ordering code works against.
//! This layer has NO external dependencies (except serde/thiserror).

mod entity;
mod chip;
mod feedback_template;

pub use entity::{Entity, DomainError, DomainResult};
pub use chip::{Chip, ChipId, ChipKind, ChipRecord, SortField};
pub use feedback_template::{FeedbackTemplate, TaskStatus};
