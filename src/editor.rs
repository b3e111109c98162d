//! Template Editor Helpers
//!
//! Filtering, parent selection and field checks used when editing the
//! templates of one learning outcome.

use std::collections::HashMap;

use crate::domain::{ChipId, ChipKind, DomainError, DomainResult, FeedbackTemplate};

/// Templates that belong to one learning outcome
pub fn templates_for_outcome(
    templates: &[FeedbackTemplate],
    outcome_id: u32,
) -> Vec<&FeedbackTemplate> {
    templates
        .iter()
        .filter(|t| t.learning_outcome_id == Some(outcome_id))
        .collect()
}

/// Case-insensitive substring match over the searchable fields
///
/// `filter` is trimmed; `parent_text` is the chip text of the template's
/// parent group (empty when it has none).
pub fn matches_filter(template: &FeedbackTemplate, parent_text: &str, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&needle);

    hit(parent_text)
        || hit(&template.chip_text)
        || template.comment_text.as_deref().is_some_and(hit)
        || template.summary_text.as_deref().is_some_and(hit)
        || hit(&template.description)
}

/// Filter an already-resolved list without disturbing its order
///
/// Parent texts are looked up in `all`, so a match on a group's name keeps
/// its direct children even when they are the only rows passed in.
pub fn filter_templates<'a>(
    ordered: &[&'a FeedbackTemplate],
    all: &[FeedbackTemplate],
    filter: &str,
) -> Vec<&'a FeedbackTemplate> {
    let group_text: HashMap<ChipId, &str> = all
        .iter()
        .filter(|t| t.is_group())
        .map(|t| (t.id, t.chip_text.as_str()))
        .collect();

    ordered
        .iter()
        .copied()
        .filter(|t| {
            let parent_text = t
                .parent_chip_id
                .and_then(|id| group_text.get(&id).copied())
                .unwrap_or("");
            matches_filter(t, parent_text, filter)
        })
        .collect()
}

/// Whether `ancestor_id` is on the parent chain of `descendant`
///
/// Stops after visiting every template once, so cyclic data terminates.
pub fn is_ancestor(
    ancestor_id: ChipId,
    descendant: &FeedbackTemplate,
    templates: &[FeedbackTemplate],
) -> bool {
    let by_id: HashMap<ChipId, &FeedbackTemplate> =
        templates.iter().map(|t| (t.id, t)).collect();

    let mut parent_id = descendant.parent_chip_id;
    for _ in 0..=templates.len() {
        match parent_id {
            Some(id) if id == ancestor_id => return true,
            Some(id) => parent_id = by_id.get(&id).and_then(|t| t.parent_chip_id),
            None => return false,
        }
    }
    false
}

/// Groups that `selected` could be placed under
///
/// New templates may go under any group; existing ones must not go under
/// themselves or their own descendants.
pub fn possible_parents<'a>(
    templates: &'a [FeedbackTemplate],
    selected: Option<&FeedbackTemplate>,
) -> Vec<&'a FeedbackTemplate> {
    let groups = templates.iter().filter(|t| t.is_group());

    match selected {
        Some(selected) if !selected.is_new() => groups
            .filter(|candidate| {
                candidate.id != selected.id && !is_ancestor(selected.id, candidate, templates)
            })
            .collect(),
        _ => groups.collect(),
    }
}

/// Text of the parent group, or "" when there is none
pub fn parent_chip_text<'a>(
    parent_id: Option<ChipId>,
    templates: &'a [FeedbackTemplate],
) -> &'a str {
    parent_id
        .and_then(|id| templates.iter().find(|t| t.id == id && t.is_group()))
        .map_or("", |t| t.chip_text.as_str())
}

/// Check required fields before a save
pub fn validate_template(template: &FeedbackTemplate) -> DomainResult<()> {
    let blank = |text: Option<&str>| text.map_or(true, |t| t.trim().is_empty());

    if blank(Some(template.chip_text.as_str())) {
        return Err(DomainError::InvalidInput("chip text is required".to_string()));
    }
    if blank(Some(template.description.as_str())) {
        return Err(DomainError::InvalidInput("description is required".to_string()));
    }
    if template.kind == ChipKind::Leaf {
        if blank(template.comment_text.as_deref()) {
            return Err(DomainError::InvalidInput(
                "comment text is required for templates".to_string(),
            ));
        }
        if blank(template.summary_text.as_deref()) {
            return Err(DomainError::InvalidInput(
                "summary text is required for templates".to_string(),
            ));
        }
    }
    Ok(())
}
