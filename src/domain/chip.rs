//! Chip Entity
//!
//! A chip is one node of a feedback hierarchy: a group that may hold other
//! chips, or a leaf template that cannot.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Identifier of a chip within one collection
pub type ChipId = u32;

/// Chip kind determines whether a chip can have children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChipKind {
    /// Container for other chips
    Group,
    /// Terminal template chip
    #[default]
    #[serde(rename = "template", alias = "leaf")]
    Leaf,
}

impl ChipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChipKind::Group => "group",
            ChipKind::Leaf => "template",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "group" => ChipKind::Group,
            _ => ChipKind::Leaf,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ChipKind::Group)
    }
}

/// Named text fields a chip can be compared on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    #[default]
    ChipText,
    Description,
    CommentText,
    SummaryText,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::ChipText => "chip-text",
            SortField::Description => "description",
            SortField::CommentText => "comment-text",
            SortField::SummaryText => "summary-text",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "chip-text" | "chiptext" | "text" => Ok(SortField::ChipText),
            "description" => Ok(SortField::Description),
            "comment-text" | "commenttext" | "comment" => Ok(SortField::CommentText),
            "summary-text" | "summarytext" | "summary" => Ok(SortField::SummaryText),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid values: {}",
                s,
                "chip-text, description, comment-text, summary-text"
            )),
        }
    }
}

/// Everything the order resolver needs to know about a record
pub trait ChipRecord: Entity<Id = ChipId> {
    fn kind(&self) -> ChipKind;

    /// Parent chip (None = root level)
    fn parent_id(&self) -> Option<ChipId>;

    /// Text for the given field, if the record carries it
    fn sort_text(&self, field: SortField) -> Option<&str>;
}

/// Minimal chip: identity, hierarchy link and display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chip {
    pub id: ChipId,
    pub kind: ChipKind,
    #[serde(default)]
    pub parent_id: Option<ChipId>,
    /// Primary key for the default comparator
    pub text: String,
}

impl Chip {
    /// Create a root-level group
    pub fn group(id: ChipId, text: impl Into<String>) -> Self {
        Self {
            id,
            kind: ChipKind::Group,
            parent_id: None,
            text: text.into(),
        }
    }

    /// Create a root-level leaf
    pub fn leaf(id: ChipId, text: impl Into<String>) -> Self {
        Self {
            id,
            kind: ChipKind::Leaf,
            parent_id: None,
            text: text.into(),
        }
    }

    /// Place this chip under a parent
    pub fn under(mut self, parent_id: ChipId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Check if this is a root chip (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Entity for Chip {
    type Id = ChipId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl ChipRecord for Chip {
    fn kind(&self) -> ChipKind {
        self.kind
    }

    fn parent_id(&self) -> Option<ChipId> {
        self.parent_id
    }

    fn sort_text(&self, field: SortField) -> Option<&str> {
        match field {
            SortField::ChipText => Some(&self.text),
            _ => None,
        }
    }
}
