//! Storage for progress trails.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::ProgressEntry;
use crate::error::ServiceError;

/// Append-only progress log keyed by recipe id.
///
/// Implementations must accept concurrent appends for the same recipe.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn append(&self, recipe_id: Uuid, entry: ProgressEntry) -> Result<(), ServiceError>;

    /// Entries for a recipe in append order. Unknown recipes have none.
    async fn list(&self, recipe_id: Uuid) -> Result<Vec<ProgressEntry>, ServiceError>;
}

/// Progress store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    trails: DashMap<Uuid, Vec<ProgressEntry>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn append(&self, recipe_id: Uuid, entry: ProgressEntry) -> Result<(), ServiceError> {
        self.trails.entry(recipe_id).or_default().push(entry);
        Ok(())
    }

    async fn list(&self, recipe_id: Uuid) -> Result<Vec<ProgressEntry>, ServiceError> {
        Ok(self
            .trails
            .get(&recipe_id)
            .map(|trail| trail.value().clone())
            .unwrap_or_default())
    }
}
