//! Primary Comparator
//!
//! Named comparison strategies over chip text fields. The base order of a
//! resolve comes from here (or from a caller-supplied closure).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::{ChipRecord, SortField};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Which field to compare and in which direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Compare two chips on the configured field
    ///
    /// Case-insensitive first, raw text as tie-break. A chip without the
    /// field sorts before one that has it.
    pub fn compare<T: ChipRecord>(&self, a: &T, b: &T) -> Ordering {
        let a = a.sort_text(self.field).map(TextKey::new);
        let b = b.sort_text(self.field).map(TextKey::new);
        self.direction.apply(a.cmp(&b))
    }

    /// Indices of `chips` in comparator order (stable)
    pub(crate) fn sorted_indices<T: ChipRecord>(&self, chips: &[T]) -> Vec<usize> {
        let keys: Vec<Option<TextKey<'_>>> = chips
            .iter()
            .map(|chip| chip.sort_text(self.field).map(TextKey::new))
            .collect();

        let mut indices: Vec<usize> = (0..chips.len()).collect();
        indices.sort_by(|&a, &b| self.direction.apply(keys[a].cmp(&keys[b])));
        indices
    }
}

/// Folded text followed by the original, compared in that order
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct TextKey<'a> {
    folded: String,
    raw: &'a str,
}

impl<'a> TextKey<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            folded: raw.to_lowercase(),
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chip, ChipKind, FeedbackTemplate};

    fn ids<T: ChipRecord>(chips: &[T], order: &[usize]) -> Vec<u32> {
        order.iter().map(|&i| chips[i].id()).collect()
    }

    #[test]
    fn test_case_insensitive() {
        let chips = vec![
            Chip::leaf(1, "beta"),
            Chip::leaf(2, "Alpha"),
            Chip::leaf(3, "alpha"),
            Chip::leaf(4, "Gamma"),
        ];
        let order = SortSpec::default().sorted_indices(&chips);
        // "Alpha" < "alpha" on the raw tie-break
        assert_eq!(ids(&chips, &order), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_descending() {
        let chips = vec![Chip::leaf(1, "a"), Chip::leaf(2, "c"), Chip::leaf(3, "b")];
        let order = SortSpec::desc(SortField::ChipText).sorted_indices(&chips);
        assert_eq!(ids(&chips, &order), vec![2, 3, 1]);
    }

    #[test]
    fn test_stable_on_full_ties() {
        let chips = vec![Chip::leaf(9, "same"), Chip::leaf(4, "same"), Chip::leaf(6, "same")];
        let order = SortSpec::default().sorted_indices(&chips);
        assert_eq!(ids(&chips, &order), vec![9, 4, 6]);
    }

    #[test]
    fn test_missing_field_sorts_first() {
        let mut with_comment = FeedbackTemplate::new(1, ChipKind::Leaf, "a");
        with_comment.comment_text = Some("Nice work".to_string());
        let without = FeedbackTemplate::new(2, ChipKind::Leaf, "b");

        let spec = SortSpec::asc(SortField::CommentText);
        assert_eq!(spec.compare(&without, &with_comment), Ordering::Less);
        assert_eq!(
            SortSpec::desc(SortField::CommentText).compare(&without, &with_comment),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_matches_sorted_indices() {
        let chips = vec![Chip::leaf(1, "b"), Chip::leaf(2, "A"), Chip::leaf(3, "c")];
        let spec = SortSpec::default();
        let mut by_compare: Vec<usize> = (0..chips.len()).collect();
        by_compare.sort_by(|&a, &b| spec.compare(&chips[a], &chips[b]));
        assert_eq!(by_compare, spec.sorted_indices(&chips));
    }
}
