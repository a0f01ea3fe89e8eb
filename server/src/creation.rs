//! Recipe submission and the background creation runner.

use std::sync::Arc;

use uuid::Uuid;
use videochef_core::services::RecipeInfoService;
use videochef_core::{
    Collaborators, CreationPipeline, ExecutionContext, ProgressTracker, VideoRef, VideoUrlError,
    WorkerPool,
};

use crate::store::RecipeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub recipe_id: Uuid,
    /// False when an existing recipe for the same video was returned.
    pub created: bool,
}

/// Accepts video submissions and runs the creation pipeline for new recipes.
pub struct RecipeCreator {
    store: Arc<RecipeStore>,
    progress: ProgressTracker,
    pipeline: Arc<CreationPipeline>,
    recipes: Arc<dyn RecipeInfoService>,
    allowed_hosts: Vec<String>,
}

impl RecipeCreator {
    pub fn new(
        store: Arc<RecipeStore>,
        progress: ProgressTracker,
        services: &Collaborators,
        pool: WorkerPool,
        allowed_hosts: Vec<String>,
    ) -> Self {
        let pipeline = CreationPipeline::new(services, progress.clone(), pool);
        Self {
            store,
            progress,
            pipeline: Arc::new(pipeline),
            recipes: services.recipe_info.clone(),
            allowed_hosts,
        }
    }

    pub fn store(&self) -> &RecipeStore {
        &self.store
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Register a video and start creating its recipe in the background.
    ///
    /// `title` is the video's title as the client knows it; detail
    /// extraction falls back to it when it finds none. A video that already
    /// has a recipe which has not failed is returned as is and no pipeline is
    /// started.
    pub fn submit(
        &self,
        video_url: &str,
        title: Option<&str>,
    ) -> Result<Submission, VideoUrlError> {
        let video = VideoRef::parse(video_url)?;
        video.ensure_host_allowed(&self.allowed_hosts)?;

        let title = title.map(str::trim).filter(|t| !t.is_empty());
        let (record, created) = self.store.create_or_existing(&video, title);
        if created {
            tracing::info!(recipe_id = %record.id, video_id = %video.video_id, "starting recipe creation");
            let ctx = match record.title.as_deref() {
                Some(title) => {
                    ExecutionContext::of_titled(record.id, video.video_id, video.video_url, title)
                }
                None => ExecutionContext::of(record.id, video.video_id, video.video_url),
            };
            self.spawn(ctx);
        } else {
            tracing::debug!(recipe_id = %record.id, status = ?record.status, "reusing existing recipe");
        }

        Ok(Submission {
            recipe_id: record.id,
            created,
        })
    }

    fn spawn(&self, ctx: ExecutionContext) {
        let pipeline = Arc::clone(&self.pipeline);
        let recipes = Arc::clone(&self.recipes);
        tokio::spawn(async move {
            run_creation(pipeline, recipes.as_ref(), ctx).await;
        });
    }
}

/// Run the pipeline for one recipe and mark it failed if any stage fails.
///
/// The run gets its own task so a panicking step still leaves the recipe
/// marked failed instead of stuck in `Creating`.
pub async fn run_creation(
    pipeline: Arc<CreationPipeline>,
    recipes: &dyn RecipeInfoService,
    ctx: ExecutionContext,
) {
    let recipe_id = ctx.recipe_id();
    let outcome = tokio::spawn(async move { pipeline.run(ctx).await }).await;

    match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => tracing::error!(%recipe_id, error = %e, "recipe creation failed"),
        Err(e) => tracing::error!(%recipe_id, error = %e, "recipe creation task panicked"),
    }

    if let Err(e) = recipes.failed(recipe_id).await {
        tracing::error!(%recipe_id, error = %e, "failed to mark recipe as failed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use videochef_core::services::fake::{Call, FakeServices, Operation};
    use videochef_core::services::VerifyService;
    use videochef_core::{
        CreationState, InMemoryProgressStore, Ingredient, RecipeDetail, ServiceError, VideoFile,
    };

    use super::*;
    use crate::store::RecipeStatus;

    fn creator(fake: &Arc<FakeServices>, allowed_hosts: Vec<String>) -> RecipeCreator {
        RecipeCreator::new(
            Arc::new(RecipeStore::new()),
            ProgressTracker::new(Arc::new(InMemoryProgressStore::new())),
            &Collaborators::from_all(Arc::clone(fake)),
            WorkerPool::new(4),
            allowed_hosts,
        )
    }

    async fn wait_for_state(creator: &RecipeCreator, recipe_id: Uuid) -> CreationState {
        for _ in 0..200 {
            let state = creator.progress().state(recipe_id).await.unwrap();
            if state != CreationState::InProgress {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("recipe {} never left InProgress", recipe_id);
    }

    #[tokio::test]
    async fn submit_starts_pipeline_with_canonical_url() {
        let fake = Arc::new(FakeServices::new());
        let creator = creator(&fake, vec![]);

        let submission = creator
            .submit("https://youtu.be/video-456?si=share", None)
            .unwrap();
        assert!(submission.created);

        let state = wait_for_state(&creator, submission.recipe_id).await;
        assert_eq!(state, CreationState::Finished);
        assert_eq!(
            fake.calls()[0],
            Call::Verify {
                video_id: "video-456".to_string()
            }
        );

        let record = creator.store().get(submission.recipe_id).unwrap();
        assert_eq!(record.video_url, "https://www.youtube.com/watch?v=video-456");
    }

    #[tokio::test]
    async fn submitted_title_backs_up_a_missing_extracted_title() {
        let fake = Arc::new(FakeServices::new().with_detail(RecipeDetail {
            description: "A simple dish".to_string(),
            ingredients: vec![Ingredient::new("salt", 1.0, "tsp")],
            tags: vec!["tag1".to_string()],
            servings: 2,
            cook_time: 15,
            title: None,
        }));
        let creator = creator(&fake, vec![]);

        let submission = creator
            .submit("https://youtu.be/video-456", Some("  Grandma's soup "))
            .unwrap();
        wait_for_state(&creator, submission.recipe_id).await;

        let record = creator.store().get(submission.recipe_id).unwrap();
        assert_eq!(record.title.as_deref(), Some("Grandma's soup"));
        assert!(matches!(
            &fake.calls_to(Operation::RecipeDetails)[..],
            [Call::RecipeDetails { video_title: Some(t), .. }] if t == "Grandma's soup"
        ));
        assert!(matches!(
            &fake.calls_to(Operation::DetailMetaCreate)[..],
            [Call::DetailMetaCreate { title, .. }] if title == "Grandma's soup"
        ));
    }

    #[tokio::test]
    async fn blank_title_is_ignored() {
        let fake = Arc::new(FakeServices::new());
        let creator = creator(&fake, vec![]);

        let submission = creator
            .submit("https://youtu.be/video-456", Some("   "))
            .unwrap();
        wait_for_state(&creator, submission.recipe_id).await;

        assert_eq!(creator.store().get(submission.recipe_id).unwrap().title, None);
        assert!(matches!(
            &fake.calls_to(Operation::RecipeDetails)[..],
            [Call::RecipeDetails { video_title: None, .. }]
        ));
    }

    #[tokio::test]
    async fn resubmitting_a_live_video_reuses_the_recipe() {
        let fake = Arc::new(
            FakeServices::new().with_delay(Operation::Verify, Duration::from_millis(50)),
        );
        let creator = creator(&fake, vec![]);

        let first = creator
            .submit("https://www.youtube.com/watch?v=abc123", None)
            .unwrap();
        let second = creator.submit("https://youtu.be/abc123", None).unwrap();

        assert!(first.created);
        assert_eq!(
            second,
            Submission {
                recipe_id: first.recipe_id,
                created: false
            }
        );
        wait_for_state(&creator, first.recipe_id).await;
        assert_eq!(fake.call_count(Operation::Verify), 1);
    }

    #[tokio::test]
    async fn failed_recipe_can_be_resubmitted() {
        let fake = Arc::new(FakeServices::new());
        let creator = creator(&fake, vec![]);

        let first = creator.submit("https://youtu.be/abc123", None).unwrap();
        wait_for_state(&creator, first.recipe_id).await;
        creator
            .store()
            .set_status(first.recipe_id, RecipeStatus::Failed)
            .unwrap();

        let second = creator.submit("https://youtu.be/abc123", None).unwrap();
        assert!(second.created);
        assert_ne!(second.recipe_id, first.recipe_id);
    }

    #[tokio::test]
    async fn rejects_bad_urls_and_disallowed_hosts() {
        let fake = Arc::new(FakeServices::new());
        let creator = creator(&fake, vec!["youtu.be".to_string()]);

        assert!(matches!(
            creator.submit("not a url", None),
            Err(VideoUrlError::Invalid(_))
        ));
        assert!(matches!(
            creator.submit("https://www.youtube.com/watch?v=abc123", None),
            Err(VideoUrlError::UnsupportedHost(h)) if h == "www.youtube.com"
        ));
        assert!(creator.submit("https://youtu.be/abc123", None).is_ok());
    }

    #[tokio::test]
    async fn run_creation_marks_failure() {
        let fake = Arc::new(FakeServices::new().with_failure(
            Operation::CaptionCreate,
            ServiceError::ExtractionFailed("no captions".to_string()),
        ));
        let progress = ProgressTracker::new(Arc::new(InMemoryProgressStore::new()));
        let services = Collaborators::from_all(Arc::clone(&fake));
        let pipeline = CreationPipeline::new(&services, progress.clone(), WorkerPool::new(2));
        let recipe_id = Uuid::new_v4();

        run_creation(
            Arc::new(pipeline),
            fake.as_ref(),
            ExecutionContext::of(recipe_id, "abc123", "https://www.youtube.com/watch?v=abc123"),
        )
        .await;

        assert_eq!(
            fake.calls_to(Operation::RecipeFailed),
            vec![Call::RecipeFailed { recipe_id }]
        );
        assert_eq!(fake.call_count(Operation::Cleanup), 1);
        assert_eq!(
            progress.state(recipe_id).await.unwrap(),
            CreationState::Failed
        );
    }

    struct PanickingVerify;

    #[async_trait]
    impl VerifyService for PanickingVerify {
        async fn verify(&self, _video_id: &str) -> Result<VideoFile, ServiceError> {
            panic!("verify blew up");
        }

        async fn cleanup(&self, _file_uri: &str) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_creation_marks_failure_when_a_step_panics() {
        let fake = Arc::new(FakeServices::new());
        let services = Collaborators {
            verify: Arc::new(PanickingVerify),
            ..Collaborators::from_all(Arc::clone(&fake))
        };
        let pipeline = CreationPipeline::new(
            &services,
            ProgressTracker::new(Arc::new(InMemoryProgressStore::new())),
            WorkerPool::new(2),
        );
        let recipe_id = Uuid::new_v4();

        run_creation(
            Arc::new(pipeline),
            fake.as_ref(),
            ExecutionContext::of(recipe_id, "abc123", "https://www.youtube.com/watch?v=abc123"),
        )
        .await;

        assert_eq!(
            fake.calls_to(Operation::RecipeFailed),
            vec![Call::RecipeFailed { recipe_id }]
        );
    }

    #[tokio::test]
    async fn panicked_run_lets_the_video_be_resubmitted() {
        let fake = Arc::new(FakeServices::new());
        let store = Arc::new(RecipeStore::new());
        let backed = Arc::new(StoreStatus(Arc::clone(&store)));
        let services = Collaborators {
            verify: Arc::new(PanickingVerify),
            recipe_info: backed,
            ..Collaborators::from_all(Arc::clone(&fake))
        };
        let creator = RecipeCreator::new(
            Arc::clone(&store),
            ProgressTracker::new(Arc::new(InMemoryProgressStore::new())),
            &services,
            WorkerPool::new(2),
            vec![],
        );

        let first = creator.submit("https://youtu.be/abc123", None).unwrap();
        for _ in 0..200 {
            if store.get(first.recipe_id).unwrap().status == RecipeStatus::Failed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.get(first.recipe_id).unwrap().status, RecipeStatus::Failed);

        let second = creator.submit("https://youtu.be/abc123", None).unwrap();
        assert!(second.created);
    }

    /// Recipe status writes straight into the store.
    struct StoreStatus(Arc<RecipeStore>);

    #[async_trait]
    impl RecipeInfoService for StoreStatus {
        async fn success(&self, recipe_id: Uuid) -> Result<(), ServiceError> {
            Ok(self.0.set_status(recipe_id, RecipeStatus::Success)?)
        }

        async fn failed(&self, recipe_id: Uuid) -> Result<(), ServiceError> {
            Ok(self.0.set_status(recipe_id, RecipeStatus::Failed)?)
        }
    }

    #[tokio::test]
    async fn run_creation_leaves_successful_recipes_alone() {
        let fake = Arc::new(FakeServices::new());
        let progress = ProgressTracker::new(Arc::new(InMemoryProgressStore::new()));
        let pipeline = CreationPipeline::new(
            &Collaborators::from_all(Arc::clone(&fake)),
            progress,
            WorkerPool::new(2),
        );

        run_creation(
            Arc::new(pipeline),
            fake.as_ref(),
            ExecutionContext::of(Uuid::new_v4(), "abc123", "https://www.youtube.com/watch?v=abc123"),
        )
        .await;

        assert_eq!(fake.call_count(Operation::RecipeSuccess), 1);
        assert_eq!(fake.call_count(Operation::RecipeFailed), 0);
    }
}
