//! Feedback Template Entity
//!
//! The full record behind a chip: what the marker sees, the comment it
//! inserts, and the learning outcome it belongs to.

use serde::{Deserialize, Serialize};
use super::chip::{ChipId, ChipKind, ChipRecord, SortField};
use super::entity::Entity;

/// Task status a template suggests when applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    FixAndResubmit,
    Discuss,
    Redo,
    Complete,
    FeedbackExceeded,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::FixAndResubmit => "fix_and_resubmit",
            TaskStatus::Discuss => "discuss",
            TaskStatus::Redo => "redo",
            TaskStatus::Complete => "complete",
            TaskStatus::FeedbackExceeded => "feedback_exceeded",
        }
    }

    /// Position in the marking workflow; lower is more severe
    pub fn seq(&self) -> u8 {
        match self {
            TaskStatus::FeedbackExceeded => 1,
            TaskStatus::Redo => 2,
            TaskStatus::FixAndResubmit => 3,
            TaskStatus::Discuss => 4,
            TaskStatus::Complete => 5,
        }
    }
}

/// A feedback template or template group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTemplate {
    /// Unique identifier (0 = not yet saved)
    pub id: ChipId,
    /// Group or template
    #[serde(rename = "type")]
    pub kind: ChipKind,
    /// Short label shown on the chip
    pub chip_text: String,
    #[serde(default)]
    pub description: String,
    /// Text inserted into the comment
    #[serde(default)]
    pub comment_text: Option<String>,
    /// Line used when summarising selected feedback
    #[serde(default)]
    pub summary_text: Option<String>,
    #[serde(default)]
    pub task_status: Option<TaskStatus>,
    /// Parent group (None = root level)
    #[serde(default)]
    pub parent_chip_id: Option<ChipId>,
    #[serde(default)]
    pub learning_outcome_id: Option<u32>,
}

impl FeedbackTemplate {
    /// Create a new root template with empty texts
    pub fn new(id: ChipId, kind: ChipKind, chip_text: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            chip_text: chip_text.into(),
            description: String::new(),
            comment_text: None,
            summary_text: None,
            task_status: None,
            parent_chip_id: None,
            learning_outcome_id: None,
        }
    }

    /// Create a new template under a parent group
    pub fn new_child(
        id: ChipId,
        kind: ChipKind,
        chip_text: impl Into<String>,
        parent_chip_id: ChipId,
    ) -> Self {
        Self {
            parent_chip_id: Some(parent_chip_id),
            ..Self::new(id, kind, chip_text)
        }
    }

    /// Unsaved templates carry id 0
    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }
}

impl Entity for FeedbackTemplate {
    type Id = ChipId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl ChipRecord for FeedbackTemplate {
    fn kind(&self) -> ChipKind {
        self.kind
    }

    fn parent_id(&self) -> Option<ChipId> {
        self.parent_chip_id
    }

    fn sort_text(&self, field: SortField) -> Option<&str> {
        match field {
            SortField::ChipText => Some(&self.chip_text),
            SortField::Description => Some(&self.description),
            SortField::CommentText => self.comment_text.as_deref(),
            SortField::SummaryText => self.summary_text.as_deref(),
        }
    }
}
