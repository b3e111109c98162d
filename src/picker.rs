//! Template Picker
//!
//! Drill-down navigation over the template tree of each learning outcome,
//! plus search and summary composition for the comment composer.

use std::collections::HashMap;

use crate::domain::{ChipId, FeedbackTemplate, TaskStatus};

/// Opened groups per learning outcome, most recent last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationStack {
    stacks: HashMap<u32, Vec<ChipId>>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a group, or close it if it is already open
    ///
    /// Returns whether the group is open afterwards. Leaves are ignored.
    pub fn toggle(&mut self, group: &FeedbackTemplate) -> bool {
        if !group.is_group() {
            return false;
        }
        let outcome = group.learning_outcome_id.unwrap_or_default();
        let stack = self.stacks.entry(outcome).or_default();
        match stack.iter().position(|&id| id == group.id) {
            Some(index) => {
                stack.remove(index);
                false
            }
            None => {
                stack.push(group.id);
                true
            }
        }
    }

    pub fn is_expanded(&self, group: &FeedbackTemplate) -> bool {
        let outcome = group.learning_outcome_id.unwrap_or_default();
        self.stacks
            .get(&outcome)
            .is_some_and(|stack| stack.contains(&group.id))
    }

    /// Most recently opened group for an outcome
    pub fn current_group(&self, outcome_id: u32) -> Option<ChipId> {
        self.stacks.get(&outcome_id).and_then(|stack| stack.last().copied())
    }

    /// Close everything (a new task was selected)
    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}

fn matches_search(template: &FeedbackTemplate, search: &str) -> bool {
    template.chip_text.to_lowercase().contains(&search.to_lowercase())
}

/// Chips shown for one outcome
///
/// With a group open: that group, then its direct children. Otherwise the
/// outcome's root chips. Either way filtered by chip text.
pub fn templates_to_display<'a>(
    outcome_id: u32,
    templates: &'a [FeedbackTemplate],
    navigation: &NavigationStack,
    search: &str,
) -> Vec<&'a FeedbackTemplate> {
    let in_outcome = || {
        templates
            .iter()
            .filter(move |t| t.learning_outcome_id == Some(outcome_id))
    };

    let shown: Vec<&FeedbackTemplate> = match navigation.current_group(outcome_id) {
        Some(group_id) => in_outcome()
            .find(|t| t.id == group_id)
            .into_iter()
            .chain(in_outcome().filter(|t| t.parent_chip_id == Some(group_id)))
            .collect(),
        None => in_outcome().filter(|t| t.parent_chip_id.is_none()).collect(),
    };

    shown
        .into_iter()
        .filter(|t| matches_search(t, search))
        .collect()
}

/// Summary comment for the selected templates
///
/// None when nothing is selected; templates without a summary are skipped.
pub fn compose_summary(selected: &[&FeedbackTemplate]) -> Option<String> {
    if selected.is_empty() {
        return None;
    }

    let mut summary = String::from("Summary of the given feedback:");
    for line in selected
        .iter()
        .filter_map(|t| t.summary_text.as_deref())
        .filter(|s| !s.is_empty())
    {
        summary.push_str("\n- ");
        summary.push_str(line);
    }
    Some(summary)
}

/// Task status to suggest after `selected` is applied
///
/// The more severe of `current` and the template's status wins. Groups and
/// templates without a status leave the suggestion as it was.
pub fn suggest_task_status(
    current: Option<TaskStatus>,
    selected: &FeedbackTemplate,
) -> Option<TaskStatus> {
    if selected.is_group() {
        return current;
    }
    match (current, selected.task_status) {
        (Some(current), Some(status)) if status.seq() < current.seq() => Some(status),
        (Some(current), _) => Some(current),
        (None, status) => status,
    }
}
