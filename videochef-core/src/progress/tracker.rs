//! Step-facing wrapper around a progress store.

use std::sync::Arc;

use uuid::Uuid;

use super::{
    CreationState, ProgressDetail, ProgressEntry, ProgressStatus, ProgressStep, ProgressStore,
};
use crate::error::ServiceError;

/// Records progress for steps.
///
/// Recording never fails from the caller's point of view: a store error is
/// logged and dropped so it cannot replace the error of the step being
/// recorded.
#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn ProgressStore>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    pub async fn start(&self, recipe_id: Uuid, step: ProgressStep, detail: ProgressDetail) {
        self.record(recipe_id, step, detail, ProgressStatus::Started)
            .await
    }

    pub async fn success(&self, recipe_id: Uuid, step: ProgressStep, detail: ProgressDetail) {
        self.record(recipe_id, step, detail, ProgressStatus::Success)
            .await
    }

    pub async fn failed(&self, recipe_id: Uuid, step: ProgressStep, detail: ProgressDetail) {
        self.record(recipe_id, step, detail, ProgressStatus::Failed)
            .await
    }

    /// Full trail for a recipe, oldest first.
    pub async fn trail(&self, recipe_id: Uuid) -> Result<Vec<ProgressEntry>, ServiceError> {
        self.store.list(recipe_id).await
    }

    pub async fn state(&self, recipe_id: Uuid) -> Result<CreationState, ServiceError> {
        Ok(CreationState::from_entries(&self.trail(recipe_id).await?))
    }

    async fn record(
        &self,
        recipe_id: Uuid,
        step: ProgressStep,
        detail: ProgressDetail,
        status: ProgressStatus,
    ) {
        tracing::debug!(%recipe_id, ?step, ?detail, ?status, "recording progress");
        let entry = ProgressEntry::now(step, detail, status);
        if let Err(e) = self.store.append(recipe_id, entry).await {
            tracing::warn!(
                %recipe_id,
                ?step,
                ?detail,
                ?status,
                error = %e,
                "Failed to record progress"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::progress::InMemoryProgressStore;

    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl ProgressStore for BrokenStore {
        async fn append(&self, _: Uuid, _: ProgressEntry) -> Result<(), ServiceError> {
            Err(ServiceError::Persistence("disk full".to_string()))
        }

        async fn list(&self, _: Uuid) -> Result<Vec<ProgressEntry>, ServiceError> {
            Err(ServiceError::Persistence("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn records_in_order() {
        let tracker = ProgressTracker::new(Arc::new(InMemoryProgressStore::new()));
        let recipe_id = Uuid::new_v4();

        tracker
            .start(recipe_id, ProgressStep::Caption, ProgressDetail::Caption)
            .await;
        tracker
            .success(recipe_id, ProgressStep::Caption, ProgressDetail::Caption)
            .await;

        let trail = tracker.trail(recipe_id).await.unwrap();
        let statuses: Vec<_> = trail.iter().map(|e| e.status).collect();
        assert_eq!(statuses, vec![ProgressStatus::Started, ProgressStatus::Success]);
        assert!(trail[0].created_at <= trail[1].created_at);
        assert_eq!(
            tracker.state(recipe_id).await.unwrap(),
            CreationState::InProgress
        );
    }

    #[tokio::test]
    async fn store_errors_are_swallowed() {
        let tracker = ProgressTracker::new(Arc::new(BrokenStore));
        // Must not panic or propagate.
        tracker
            .failed(Uuid::new_v4(), ProgressStep::Step, ProgressDetail::Step)
            .await;
        assert!(tracker.trail(Uuid::new_v4()).await.is_err());
    }
}
