//! Hierarchy Analysis
//!
//! Resolves `parent_id` links of a flat chip slice into parent indices,
//! depths and a list of problems. The slice is the arena; nothing here
//! holds references between chips.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::config::HierarchyPolicy;
use crate::domain::{ChipId, ChipRecord, DomainError, DomainResult};

/// What is wrong with one chip's place in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "kebab-case")]
pub enum IssueKind {
    /// Another chip earlier in the input has the same id
    DuplicateId,
    /// `parent_id` names a chip that is not in the collection
    MissingParent { parent_id: ChipId },
    /// `parent_id` names a template, which cannot have children
    ParentIsLeaf { parent_id: ChipId },
    /// The chip is its own ancestor
    Cycle,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::DuplicateId => write!(f, "duplicate id"),
            IssueKind::MissingParent { parent_id } => {
                write!(f, "parent {} not found", parent_id)
            }
            IssueKind::ParentIsLeaf { parent_id } => {
                write!(f, "parent {} is not a group", parent_id)
            }
            IssueKind::Cycle => write!(f, "chip is its own ancestor"),
        }
    }
}

/// A problem found in the input, tied to the offending chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HierarchyIssue {
    pub chip_id: ChipId,
    /// Position of the chip in the input slice
    pub index: usize,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl HierarchyIssue {
    pub fn to_error(&self) -> DomainError {
        DomainError::MalformedHierarchy {
            id: self.chip_id,
            reason: self.kind.to_string(),
        }
    }
}

impl fmt::Display for HierarchyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip {} (#{}): {}", self.chip_id, self.index, self.kind)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Parent links resolved to indices, with the issues that were tolerated
///
/// Broken links (missing parent, leaf parent, cycle member) are cut, so
/// `parent` always names a group and following it always ends at a root.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    parents: Vec<Option<usize>>,
    depths: Vec<usize>,
    groups: Vec<bool>,
    issues: Vec<HierarchyIssue>,
}

impl Hierarchy {
    pub fn analyze<T: ChipRecord>(chips: &[T]) -> Self {
        let mut issues = Vec::new();

        // Ids resolve to their first occurrence
        let mut index_of: HashMap<ChipId, usize> = HashMap::with_capacity(chips.len());
        for (index, chip) in chips.iter().enumerate() {
            match index_of.entry(chip.id()) {
                Entry::Occupied(_) => issues.push(HierarchyIssue {
                    chip_id: chip.id(),
                    index,
                    kind: IssueKind::DuplicateId,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
            }
        }

        let groups: Vec<bool> = chips.iter().map(|chip| chip.kind().is_group()).collect();

        let mut parents: Vec<Option<usize>> = Vec::with_capacity(chips.len());
        for (index, chip) in chips.iter().enumerate() {
            let parent = chip.parent_id().and_then(|parent_id| {
                let issue = |kind| HierarchyIssue {
                    chip_id: chip.id(),
                    index,
                    kind,
                };
                match index_of.get(&parent_id) {
                    None => {
                        issues.push(issue(IssueKind::MissingParent { parent_id }));
                        None
                    }
                    Some(&p) if !groups[p] => {
                        issues.push(issue(IssueKind::ParentIsLeaf { parent_id }));
                        None
                    }
                    Some(&p) => Some(p),
                }
            });
            parents.push(parent);
        }

        for index in find_cycle_members(&parents) {
            parents[index] = None;
            issues.push(HierarchyIssue {
                chip_id: chips[index].id(),
                index,
                kind: IssueKind::Cycle,
            });
        }

        issues.sort_by_key(|issue| issue.index);
        let depths = compute_depths(&parents);

        Self {
            parents,
            depths,
            groups,
            issues,
        }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Resolved parent index (None = root)
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    /// Resolved parent hops to a root
    pub fn depth(&self, index: usize) -> usize {
        self.depths.get(index).copied().unwrap_or(0)
    }

    pub fn is_group(&self, index: usize) -> bool {
        self.groups.get(index).copied().unwrap_or(false)
    }

    /// Greatest depth among groups (0 when there are none)
    pub fn max_group_depth(&self) -> usize {
        self.depths
            .iter()
            .zip(&self.groups)
            .filter(|(_, is_group)| **is_group)
            .map(|(depth, _)| *depth)
            .max()
            .unwrap_or(0)
    }

    /// Ancestors of `index`, nearest first
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parent(index), move |&p| self.parent(p))
    }

    /// Whether `ancestor` appears on the parent chain of `index`
    pub fn is_descendant_of(&self, index: usize, ancestor: usize) -> bool {
        self.ancestors(index).any(|p| p == ancestor)
    }

    pub fn issues(&self) -> &[HierarchyIssue] {
        &self.issues
    }

    pub fn is_well_formed(&self) -> bool {
        self.issues.is_empty()
    }

    /// Apply a policy to the issues found
    ///
    /// Strict fails on the first issue in input order; lenient logs each one.
    pub fn enforce(&self, policy: HierarchyPolicy) -> DomainResult<()> {
        match policy {
            HierarchyPolicy::Strict => match self.issues.first() {
                Some(issue) => Err(issue.to_error()),
                None => Ok(()),
            },
            HierarchyPolicy::Lenient => {
                self.log_issues();
                Ok(())
            }
        }
    }

    pub(crate) fn log_issues(&self) {
        for issue in &self.issues {
            tracing::warn!(
                chip_id = issue.chip_id,
                index = issue.index,
                "{}; treating chip as root where needed",
                issue.kind
            );
        }
    }
}

/// Indices that lie on a parent cycle
///
/// Each chip has at most one parent, so every walk either reaches a root,
/// reaches an already finished chip, or closes a loop on the current path.
fn find_cycle_members(parents: &[Option<usize>]) -> Vec<usize> {
    let mut marks = vec![Mark::Unvisited; parents.len()];
    let mut members = Vec::new();

    for start in 0..parents.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(index) = cursor {
            match marks[index] {
                Mark::Unvisited => {
                    marks[index] = Mark::OnPath;
                    path.push(index);
                    cursor = parents[index];
                }
                Mark::OnPath => {
                    if let Some(pos) = path.iter().position(|&p| p == index) {
                        members.extend_from_slice(&path[pos..]);
                    }
                    break;
                }
                Mark::Done => break,
            }
        }

        for index in path {
            marks[index] = Mark::Done;
        }
    }

    members.sort_unstable();
    members
}

/// Depth of every chip; `parents` must be acyclic
fn compute_depths(parents: &[Option<usize>]) -> Vec<usize> {
    let mut depths: Vec<Option<usize>> = vec![None; parents.len()];

    for start in 0..parents.len() {
        let mut chain = Vec::new();
        let mut known = None;
        let mut cursor = Some(start);
        while let Some(index) = cursor {
            if let Some(depth) = depths[index] {
                known = Some(depth);
                break;
            }
            chain.push(index);
            cursor = parents[index];
        }

        let mut next = known.map_or(0, |depth| depth + 1);
        for &index in chain.iter().rev() {
            depths[index] = Some(next);
            next += 1;
        }
    }

    depths.into_iter().map(|depth| depth.unwrap_or(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Chip;

    #[test]
    fn test_depths_and_parents() {
        let chips = vec![
            Chip::group(1, "root"),
            Chip::group(2, "mid").under(1),
            Chip::group(3, "deep").under(2),
            Chip::leaf(4, "leaf").under(3),
        ];
        let hierarchy = Hierarchy::analyze(&chips);

        assert!(hierarchy.is_well_formed());
        assert_eq!(hierarchy.parent(0), None);
        assert_eq!(hierarchy.parent(3), Some(2));
        assert_eq!(
            (0..4).map(|i| hierarchy.depth(i)).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(hierarchy.max_group_depth(), 2);
        assert_eq!(hierarchy.ancestors(3).collect::<Vec<_>>(), vec![2, 1, 0]);
        assert!(hierarchy.is_descendant_of(3, 0));
        assert!(!hierarchy.is_descendant_of(0, 3));
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let chips = vec![Chip::group(1, "a").under(99), Chip::leaf(2, "b").under(1)];
        let hierarchy = Hierarchy::analyze(&chips);

        assert_eq!(hierarchy.parent(0), None);
        assert_eq!(hierarchy.depth(0), 0);
        assert_eq!(hierarchy.depth(1), 1);
        assert_eq!(
            hierarchy.issues(),
            &[HierarchyIssue {
                chip_id: 1,
                index: 0,
                kind: IssueKind::MissingParent { parent_id: 99 },
            }]
        );
    }

    #[test]
    fn test_leaf_parent_is_cut() {
        let chips = vec![Chip::leaf(1, "t"), Chip::leaf(2, "u").under(1)];
        let hierarchy = Hierarchy::analyze(&chips);

        assert_eq!(hierarchy.parent(1), None);
        assert_eq!(hierarchy.issues()[0].kind, IssueKind::ParentIsLeaf { parent_id: 1 });
    }

    #[test]
    fn test_cycle_members_become_roots() {
        // 1 -> 2 -> 3 -> 1, with 4 hanging off the loop
        let chips = vec![
            Chip::group(1, "a").under(3),
            Chip::group(2, "b").under(1),
            Chip::group(3, "c").under(2),
            Chip::group(4, "d").under(2),
        ];
        let hierarchy = Hierarchy::analyze(&chips);

        assert_eq!(hierarchy.parent(0), None);
        assert_eq!(hierarchy.parent(1), None);
        assert_eq!(hierarchy.parent(2), None);
        assert_eq!(hierarchy.parent(3), Some(1));
        assert_eq!(hierarchy.depth(3), 1);

        let cycle_ids: Vec<u32> = hierarchy
            .issues()
            .iter()
            .filter(|issue| issue.kind == IssueKind::Cycle)
            .map(|issue| issue.chip_id)
            .collect();
        assert_eq!(cycle_ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_self_parent() {
        let chips = vec![Chip::group(5, "me").under(5)];
        let hierarchy = Hierarchy::analyze(&chips);

        assert_eq!(hierarchy.parent(0), None);
        assert_eq!(hierarchy.issues()[0].kind, IssueKind::Cycle);
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first() {
        let chips = vec![
            Chip::group(1, "first"),
            Chip::group(1, "second"),
            Chip::leaf(2, "child").under(1),
        ];
        let hierarchy = Hierarchy::analyze(&chips);

        assert_eq!(hierarchy.parent(2), Some(0));
        assert_eq!(hierarchy.issues().len(), 1);
        assert_eq!(hierarchy.issues()[0].index, 1);
        assert_eq!(hierarchy.issues()[0].kind, IssueKind::DuplicateId);
    }

    #[test]
    fn test_enforce_policies() {
        let chips = vec![Chip::leaf(7, "orphan").under(3)];
        let hierarchy = Hierarchy::analyze(&chips);

        assert!(hierarchy.enforce(HierarchyPolicy::Lenient).is_ok());
        assert_eq!(
            hierarchy.enforce(HierarchyPolicy::Strict),
            Err(DomainError::MalformedHierarchy {
                id: 7,
                reason: "parent 3 not found".to_string(),
            })
        );
    }

    #[test]
    fn test_issue_serialization() {
        let issue = HierarchyIssue {
            chip_id: 4,
            index: 2,
            kind: IssueKind::ParentIsLeaf { parent_id: 9 },
        };
        let json = serde_json::to_value(issue).unwrap();
        assert_eq!(json["issue"], "parent-is-leaf");
        assert_eq!(json["parent_id"], 9);
        assert_eq!(json["chip_id"], 4);
    }
}
