//! Tree Utilities
//!
//! Helper functions for tree rendering. Rows come out in resolved order;
//! nothing here re-sorts them.

use std::collections::HashSet;

use crate::domain::{ChipId, ChipRecord, SortField};
use crate::ordering::Resolution;

/// A resolved chip with its indentation level
#[derive(Debug)]
pub struct DisplayRow<'a, T> {
    pub chip: &'a T,
    pub depth: usize,
}

impl<T> Clone for DisplayRow<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DisplayRow<'_, T> {}

/// Pair each resolved chip with its depth
///
/// `chips` must be the slice `resolution` was built from.
pub fn display_rows<'a, T>(chips: &'a [T], resolution: &Resolution) -> Vec<DisplayRow<'a, T>> {
    let hierarchy = resolution.hierarchy();
    resolution
        .order()
        .iter()
        .filter_map(|&index| {
            chips.get(index).map(|chip| DisplayRow {
                chip,
                depth: hierarchy.depth(index),
            })
        })
        .collect()
}

/// Drop the rows below collapsed groups (the groups themselves stay)
pub fn collapse<'a, T: ChipRecord>(
    rows: &[DisplayRow<'a, T>],
    collapsed: &HashSet<ChipId>,
) -> Vec<DisplayRow<'a, T>> {
    let mut result = Vec::with_capacity(rows.len());
    let mut hidden_below: Option<usize> = None;

    for row in rows {
        if let Some(depth) = hidden_below {
            if row.depth > depth {
                continue;
            }
            hidden_below = None;
        }
        if row.chip.kind().is_group() && collapsed.contains(&row.chip.id()) {
            hidden_below = Some(row.depth);
        }
        result.push(*row);
    }

    result
}

/// Render rows as an indented outline, two spaces per level
pub fn render<T: ChipRecord>(rows: &[DisplayRow<'_, T>]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if row.chip.kind().is_group() { '+' } else { '-' };
        let text = row.chip.sort_text(SortField::ChipText).unwrap_or("");
        out.push_str(&format!(
            "{:indent$}{} {} (#{})\n",
            "",
            marker,
            text,
            row.chip.id(),
            indent = row.depth * 2
        ));
    }
    out
}
