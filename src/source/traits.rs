//! Chip Source - Core Traits
//!
//! The resolver only ever sees snapshots; whoever owns the live collection
//! implements this trait.

use async_trait::async_trait;

use crate::domain::{ChipRecord, DomainResult};
use crate::ordering::ChipOrderResolver;

/// Supplier of chip records
///
/// Implementations own identity, persistence and mutation. Callers work on
/// the owned copy returned by `snapshot`.
#[async_trait]
pub trait ChipSource<T: ChipRecord>: Send + Sync {
    /// Copy of the current collection
    async fn snapshot(&self) -> DomainResult<Vec<T>>;

    /// Copy of the records matching `predicate`
    async fn snapshot_where<P>(&self, predicate: P) -> DomainResult<Vec<T>>
    where
        P: Fn(&T) -> bool + Send + 'static,
    {
        let mut chips = self.snapshot().await?;
        chips.retain(|chip| predicate(chip));
        Ok(chips)
    }
}

/// Snapshot `source` and resolve the copy
pub async fn resolve_from_source<T, S>(
    source: &S,
    resolver: &ChipOrderResolver,
) -> DomainResult<Vec<T>>
where
    T: ChipRecord,
    S: ChipSource<T>,
{
    let chips = source.snapshot().await?;
    resolver.resolve_owned(chips)
}
