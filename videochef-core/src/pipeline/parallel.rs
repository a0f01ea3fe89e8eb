//! Concurrent execution of independent steps.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info_span, Instrument};

use crate::context::ExecutionContext;
use crate::error::CreationError;
use crate::pipeline::{CreationStep, StepMetadata};

/// Bounded pool of worker slots shared by every parallel group.
///
/// Steps run as tokio tasks; each holds a permit while it runs, so at most
/// `size` parallel steps execute at once across all pipeline runs.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// Runs a fixed set of steps concurrently against one shared context.
///
/// Every step receives the same `Arc` snapshot. The group returns that
/// snapshot unchanged once every step has finished; steps write disjoint
/// data through their collaborators and produce nothing later stages read.
/// The first error ends the wait and is returned as is. Steps still running
/// at that point are aborted, and the group only returns once every task
/// has stopped, so no step is left using the staged file.
pub struct ParallelStepGroup {
    steps: Vec<Arc<dyn CreationStep>>,
    pool: WorkerPool,
}

impl ParallelStepGroup {
    /// Step name constant.
    pub const NAME: &'static str = "parallel_group";

    pub fn new(steps: Vec<Arc<dyn CreationStep>>, pool: WorkerPool) -> Self {
        Self { steps, pool }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.metadata().name).collect()
    }
}

#[async_trait]
impl CreationStep for ParallelStepGroup {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Run independent steps concurrently",
        }
    }

    async fn run(
        &self,
        ctx: Arc<ExecutionContext>,
    ) -> Result<Arc<ExecutionContext>, CreationError> {
        let mut tasks = JoinSet::new();

        for step in &self.steps {
            let step = Arc::clone(step);
            let step_ctx = Arc::clone(&ctx);
            let permits = Arc::clone(&self.pool.permits);
            let name = step.metadata().name;
            let span = info_span!("creation_step", step = name, recipe_id = %ctx.recipe_id());

            tasks.spawn(
                async move {
                    let _permit =
                        permits
                            .acquire_owned()
                            .await
                            .map_err(|_| CreationError::StepPanicked {
                                step: name,
                                message: "worker pool closed".to_string(),
                            })?;
                    step.run(step_ctx).await.map(|_| ())
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(result) => result,
                Err(e) => Err(CreationError::StepPanicked {
                    step: Self::NAME,
                    message: e.to_string(),
                }),
            };

            if let Err(e) = outcome {
                tracing::warn!(
                    recipe_id = %ctx.recipe_id(),
                    still_running = tasks.len(),
                    error = %e,
                    "parallel step failed"
                );
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                return Err(e);
            }
        }

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::Barrier;
    use uuid::Uuid;

    use super::*;
    use crate::error::ServiceError;

    /// Test step that records the context it saw and optionally waits on a
    /// barrier or fails.
    struct ScriptedStep {
        name: &'static str,
        seen: Mutex<Vec<Arc<ExecutionContext>>>,
        barrier: Option<Arc<Barrier>>,
        delay: Duration,
        fail: bool,
        finished: AtomicUsize,
    }

    impl ScriptedStep {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                seen: Mutex::new(Vec::new()),
                barrier: None,
                delay: Duration::ZERO,
                fail: false,
                finished: AtomicUsize::new(0),
            }
        }

        fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
            self.barrier = Some(barrier);
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    #[async_trait]
    impl CreationStep for ScriptedStep {
        fn metadata(&self) -> StepMetadata {
            StepMetadata {
                name: self.name,
                description: "scripted",
            }
        }

        async fn run(
            &self,
            ctx: Arc<ExecutionContext>,
        ) -> Result<Arc<ExecutionContext>, CreationError> {
            self.seen.lock().unwrap().push(Arc::clone(&ctx));
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            tokio::time::sleep(self.delay).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ServiceError::ExtractionFailed(self.name.to_string()).into());
            }
            Ok(ctx)
        }
    }

    fn context() -> Arc<ExecutionContext> {
        Arc::new(
            ExecutionContext::of(Uuid::new_v4(), "video-456", "https://youtu.be/video-456")
                .with_file_info("s3://bucket/file.mp4", "video/mp4"),
        )
    }

    fn group(steps: &[Arc<ScriptedStep>], pool: WorkerPool) -> ParallelStepGroup {
        ParallelStepGroup::new(
            steps
                .iter()
                .map(|s| Arc::clone(s) as Arc<dyn CreationStep>)
                .collect(),
            pool,
        )
    }

    #[tokio::test]
    async fn every_step_gets_the_same_snapshot() {
        let steps: Vec<_> = ["detail", "instruction", "briefing"]
            .into_iter()
            .map(|n| Arc::new(ScriptedStep::new(n)))
            .collect();
        let ctx = context();

        let returned = group(&steps, WorkerPool::new(4))
            .run(Arc::clone(&ctx))
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&returned, &ctx));
        for step in &steps {
            let seen = step.seen.lock().unwrap();
            assert_eq!(seen.len(), 1, "{} ran once", step.name);
            assert!(Arc::ptr_eq(&seen[0], &ctx), "{} saw the input", step.name);
        }
    }

    #[tokio::test]
    async fn steps_run_concurrently() {
        // All three must be inside run() at the same time to pass the barrier.
        let barrier = Arc::new(Barrier::new(3));
        let steps: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|n| Arc::new(ScriptedStep::new(n).with_barrier(Arc::clone(&barrier))))
            .collect();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            group(&steps, WorkerPool::new(3)).run(context()),
        )
        .await;

        assert!(result.expect("steps did not overlap").is_ok());
    }

    #[tokio::test]
    async fn waits_for_slowest_step() {
        let steps = vec![
            Arc::new(ScriptedStep::new("fast")),
            Arc::new(ScriptedStep::new("slow").with_delay(Duration::from_millis(100))),
        ];

        group(&steps, WorkerPool::new(2)).run(context()).await.unwrap();

        for step in &steps {
            assert_eq!(step.finished.load(Ordering::SeqCst), 1, "{}", step.name);
        }
    }

    #[tokio::test]
    async fn pool_bounds_concurrency() {
        // With one slot the steps cannot meet at the barrier.
        let barrier = Arc::new(Barrier::new(2));
        let steps: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|n| Arc::new(ScriptedStep::new(n).with_barrier(Arc::clone(&barrier))))
            .collect();

        let result = tokio::time::timeout(
            Duration::from_millis(200),
            group(&steps, WorkerPool::new(1)).run(context()),
        )
        .await;

        assert!(result.is_err(), "second step should be waiting for a slot");
    }

    #[tokio::test]
    async fn failure_propagates() {
        let steps = vec![
            Arc::new(ScriptedStep::new("ok").with_delay(Duration::from_millis(50))),
            Arc::new(ScriptedStep::new("broken").failing()),
        ];

        let err = group(&steps, WorkerPool::new(2))
            .run(context())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CreationError::Service(ServiceError::ExtractionFailed(ref s)) if s == "broken"
        ));
    }

    #[tokio::test]
    async fn failure_stops_unfinished_steps() {
        let slow = Arc::new(ScriptedStep::new("slow").with_delay(Duration::from_millis(200)));
        let broken = Arc::new(ScriptedStep::new("broken").failing());
        let pool = WorkerPool::new(2);

        let err = group(&[Arc::clone(&slow), broken], pool.clone())
            .run(context())
            .await
            .unwrap_err();

        assert!(matches!(err, CreationError::Service(_)));
        // Every slot is back, so no task is still running.
        assert_eq!(pool.available(), 2);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(slow.seen.lock().unwrap().len(), 1);
        assert_eq!(slow.finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn panicking_step_becomes_an_error() {
        struct PanicStep;

        #[async_trait]
        impl CreationStep for PanicStep {
            fn metadata(&self) -> StepMetadata {
                StepMetadata {
                    name: "panic",
                    description: "panics",
                }
            }

            async fn run(
                &self,
                _ctx: Arc<ExecutionContext>,
            ) -> Result<Arc<ExecutionContext>, CreationError> {
                panic!("extractor exploded");
            }
        }

        let group = ParallelStepGroup::new(vec![Arc::new(PanicStep)], WorkerPool::new(1));
        let err = group.run(context()).await.unwrap_err();
        assert!(matches!(err, CreationError::StepPanicked { .. }));
    }

    #[test]
    fn pool_never_has_zero_slots() {
        assert_eq!(WorkerPool::new(0).available(), 1);
    }
}
