//! Chip Order Resolver
//!
//! Turns a flat chip list into a grouped, depth-first display order:
//! every group is followed by all of its descendants, and siblings keep
//! the order given by the primary comparator.

use std::cmp::Ordering;

use crate::config::{KeyEncoding, ResolverConfig};
use crate::domain::{ChipRecord, DomainResult};

use super::comparator::SortSpec;
use super::hierarchy::Hierarchy;
use super::keys;

/// Result of one resolve: the order plus the hierarchy it was built from
#[derive(Debug, Clone)]
pub struct Resolution {
    order: Vec<usize>,
    hierarchy: Hierarchy,
}

impl Resolution {
    fn build<T: ChipRecord>(chips: &[T], base_order: &[usize], encoding: KeyEncoding) -> Self {
        let hierarchy = Hierarchy::analyze(chips);

        // 1-based position under the primary comparator
        let mut ranks = vec![0; chips.len()];
        for (position, &index) in base_order.iter().enumerate() {
            ranks[index] = position + 1;
        }

        let order = match encoding {
            KeyEncoding::RankPath => {
                let paths = keys::rank_paths(&hierarchy, &ranks);
                keys::order_by(&paths, &ranks, |a, b| a.cmp(b))
            }
            KeyEncoding::Scaled => {
                let scaled = keys::scaled_keys(&hierarchy, &ranks);
                keys::order_by(&scaled, &ranks, |a, b| a.total_cmp(b))
            }
        };

        Self { order, hierarchy }
    }

    /// Input indices in resolved order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Borrow `chips` in resolved order
    ///
    /// `chips` must be the slice this resolution was built from.
    pub fn apply<'a, T>(&self, chips: &'a [T]) -> Vec<&'a T> {
        self.order.iter().filter_map(|&i| chips.get(i)).collect()
    }

    /// Move `chips` into resolved order
    pub fn apply_owned<T>(&self, chips: Vec<T>) -> Vec<T> {
        let mut slots: Vec<Option<T>> = chips.into_iter().map(Some).collect();
        self.order
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect()
    }
}

/// Orders chip collections according to a [`ResolverConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ChipOrderResolver {
    config: ResolverConfig,
}

impl ChipOrderResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve using the configured comparator
    pub fn resolve<'a, T: ChipRecord>(&self, chips: &'a [T]) -> DomainResult<Vec<&'a T>> {
        Ok(self.resolve_detailed(chips)?.apply(chips))
    }

    /// Resolve using an explicit comparator instead of the configured one
    pub fn resolve_by<'a, T, F>(&self, chips: &'a [T], cmp: F) -> DomainResult<Vec<&'a T>>
    where
        T: ChipRecord,
        F: Fn(&T, &T) -> Ordering,
    {
        let base_order = indices_by(chips, cmp);
        Ok(self.finish(chips, &base_order)?.apply(chips))
    }

    /// Resolve an owned collection, returning it reordered
    pub fn resolve_owned<T: ChipRecord>(&self, chips: Vec<T>) -> DomainResult<Vec<T>> {
        let resolution = self.resolve_detailed(&chips)?;
        Ok(resolution.apply_owned(chips))
    }

    /// Resolve and keep the hierarchy for display or inspection
    #[tracing::instrument(level = "debug", skip_all, fields(chips = chips.len()))]
    pub fn resolve_detailed<T: ChipRecord>(&self, chips: &[T]) -> DomainResult<Resolution> {
        let base_order = self.config.sort.sorted_indices(chips);
        self.finish(chips, &base_order)
    }

    fn finish<T: ChipRecord>(&self, chips: &[T], base_order: &[usize]) -> DomainResult<Resolution> {
        let resolution = Resolution::build(chips, base_order, self.config.encoding);
        resolution.hierarchy.enforce(self.config.policy)?;

        tracing::debug!(
            encoding = ?self.config.encoding,
            max_depth = resolution.hierarchy.max_group_depth(),
            issues = resolution.hierarchy.issues().len(),
            "resolved chip order"
        );
        Ok(resolution)
    }
}

fn indices_by<T, F>(chips: &[T], cmp: F) -> Vec<usize>
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut indices: Vec<usize> = (0..chips.len()).collect();
    indices.sort_by(|&a, &b| cmp(&chips[a], &chips[b]));
    indices
}

/// Resolve with lenient hierarchy handling and rank-path keys
pub fn resolve_order<'a, T: ChipRecord>(chips: &'a [T], sort: &SortSpec) -> Vec<&'a T> {
    let resolution = Resolution::build(chips, &sort.sorted_indices(chips), KeyEncoding::RankPath);
    resolution.hierarchy.log_issues();
    resolution.apply(chips)
}

/// Like [`resolve_order`] with a caller-supplied comparator
pub fn resolve_order_by<'a, T, F>(chips: &'a [T], cmp: F) -> Vec<&'a T>
where
    T: ChipRecord,
    F: Fn(&T, &T) -> Ordering,
{
    let resolution = Resolution::build(chips, &indices_by(chips, cmp), KeyEncoding::RankPath);
    resolution.hierarchy.log_issues();
    resolution.apply(chips)
}
