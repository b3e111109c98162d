//! In-Memory Chip Source
//!
//! A shared collection behind an async RwLock, keyed by chip id.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ChipId, ChipRecord, DomainError, DomainResult};

use super::traits::ChipSource;

/// Chip source held entirely in memory
#[derive(Debug)]
pub struct InMemoryChipSource<T> {
    chips: RwLock<Vec<T>>,
}

impl<T> Default for InMemoryChipSource<T> {
    fn default() -> Self {
        Self {
            chips: RwLock::new(Vec::new()),
        }
    }
}

impl<T: ChipRecord> InMemoryChipSource<T> {
    pub fn new(chips: Vec<T>) -> Self {
        Self {
            chips: RwLock::new(chips),
        }
    }

    /// Insert a chip, replacing any chip with the same id in place
    pub async fn upsert(&self, chip: T) {
        let mut chips = self.chips.write().await;
        match chips.iter_mut().find(|existing| existing.id() == chip.id()) {
            Some(existing) => *existing = chip,
            None => chips.push(chip),
        }
    }

    /// Remove a chip by id, returning it
    pub async fn remove(&self, id: ChipId) -> DomainResult<T> {
        let mut chips = self.chips.write().await;
        let index = chips
            .iter()
            .position(|chip| chip.id() == id)
            .ok_or_else(|| DomainError::NotFound(format!("Chip {} not found", id)))?;
        Ok(chips.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.chips.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chips.read().await.is_empty()
    }
}

#[async_trait]
impl<T: ChipRecord> ChipSource<T> for InMemoryChipSource<T> {
    async fn snapshot(&self) -> DomainResult<Vec<T>> {
        Ok(self.chips.read().await.clone())
    }
}
