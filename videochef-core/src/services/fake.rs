//! Recording fakes for the pipeline collaborators.
//!
//! `FakeServices` implements every collaborator trait, records each call in
//! order, and can be told to fail or stall specific operations. Tests run
//! without network access.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    BriefingService, CaptionService, DetailMetaService, DetailService, IngredientService,
    RecipeInfoService, StepService, TagService, VerifyService,
};
use crate::error::ServiceError;
use crate::types::{
    CaptionSegment, Ingredient, RecipeCaption, RecipeDetail, RecipeStep, VideoFile,
};

/// Collaborator operations, used to target failures and delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Verify,
    Cleanup,
    CaptionCreate,
    CaptionGet,
    RecipeDetails,
    IngredientCreate,
    TagCreate,
    DetailMetaCreate,
    StepCreate,
    BriefingCreate,
    RecipeSuccess,
    RecipeFailed,
}

/// A recorded collaborator call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Verify {
        video_id: String,
    },
    Cleanup {
        file_uri: String,
    },
    CaptionCreate {
        recipe_id: Uuid,
        file_uri: String,
        mime_type: String,
    },
    CaptionGet {
        caption_id: Uuid,
    },
    RecipeDetails {
        video_id: String,
        file_uri: String,
        mime_type: String,
        video_title: Option<String>,
    },
    IngredientCreate {
        recipe_id: Uuid,
        ingredients: Vec<Ingredient>,
    },
    TagCreate {
        recipe_id: Uuid,
        tags: Vec<String>,
    },
    DetailMetaCreate {
        recipe_id: Uuid,
        cook_time: u32,
        servings: u32,
        description: String,
        title: String,
    },
    StepCreate {
        recipe_id: Uuid,
        file_uri: String,
        mime_type: String,
    },
    BriefingCreate {
        video_id: String,
        recipe_id: Uuid,
    },
    RecipeSuccess {
        recipe_id: Uuid,
    },
    RecipeFailed {
        recipe_id: Uuid,
    },
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Call::Verify { .. } => Operation::Verify,
            Call::Cleanup { .. } => Operation::Cleanup,
            Call::CaptionCreate { .. } => Operation::CaptionCreate,
            Call::CaptionGet { .. } => Operation::CaptionGet,
            Call::RecipeDetails { .. } => Operation::RecipeDetails,
            Call::IngredientCreate { .. } => Operation::IngredientCreate,
            Call::TagCreate { .. } => Operation::TagCreate,
            Call::DetailMetaCreate { .. } => Operation::DetailMetaCreate,
            Call::StepCreate { .. } => Operation::StepCreate,
            Call::BriefingCreate { .. } => Operation::BriefingCreate,
            Call::RecipeSuccess { .. } => Operation::RecipeSuccess,
            Call::RecipeFailed { .. } => Operation::RecipeFailed,
        }
    }
}

/// Fake implementation of every collaborator.
#[derive(Debug)]
pub struct FakeServices {
    calls: Mutex<Vec<Call>>,
    failures: HashMap<Operation, ServiceError>,
    delays: HashMap<Operation, Duration>,
    captions: Mutex<HashMap<Uuid, RecipeCaption>>,
    video_file: VideoFile,
    detail: RecipeDetail,
    steps: Vec<RecipeStep>,
}

impl Default for FakeServices {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServices {
    /// Fake that succeeds everywhere with a small canned recipe.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: HashMap::new(),
            delays: HashMap::new(),
            captions: Mutex::new(HashMap::new()),
            video_file: VideoFile {
                file_uri: "s3://bucket/file.mp4".to_string(),
                mime_type: "video/mp4".to_string(),
            },
            detail: RecipeDetail {
                description: "A simple dish".to_string(),
                ingredients: vec![Ingredient::new("salt", 1.0, "tsp")],
                tags: vec!["tag1".to_string()],
                servings: 2,
                cook_time: 15,
                title: Some("ai-generated-title".to_string()),
            },
            steps: vec![RecipeStep {
                step_order: 1,
                subtitle: "Season".to_string(),
                details: vec!["Add the salt".to_string()],
                start: 0.0,
            }],
        }
    }

    /// Make `operation` fail with `error`.
    pub fn with_failure(mut self, operation: Operation, error: ServiceError) -> Self {
        self.failures.insert(operation, error);
        self
    }

    /// Make `operation` wait before answering.
    pub fn with_delay(mut self, operation: Operation, delay: Duration) -> Self {
        self.delays.insert(operation, delay);
        self
    }

    pub fn with_video_file(mut self, file_uri: &str, mime_type: &str) -> Self {
        self.video_file = VideoFile {
            file_uri: file_uri.to_string(),
            mime_type: mime_type.to_string(),
        };
        self
    }

    pub fn with_detail(mut self, detail: RecipeDetail) -> Self {
        self.detail = detail;
        self
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls of one operation, in order.
    pub fn calls_to(&self, operation: Operation) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation() == operation)
            .collect()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls_to(operation).len()
    }

    /// Position of the first call to `operation`.
    pub fn position(&self, operation: Operation) -> Option<usize> {
        self.calls().iter().position(|c| c.operation() == operation)
    }

    async fn enter(&self, call: Call) -> Result<(), ServiceError> {
        let operation = call.operation();
        self.calls.lock().unwrap().push(call);

        if let Some(delay) = self.delays.get(&operation) {
            tokio::time::sleep(*delay).await;
        }

        match self.failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VerifyService for FakeServices {
    async fn verify(&self, video_id: &str) -> Result<VideoFile, ServiceError> {
        self.enter(Call::Verify {
            video_id: video_id.to_string(),
        })
        .await?;
        Ok(self.video_file.clone())
    }

    async fn cleanup(&self, file_uri: &str) -> Result<(), ServiceError> {
        self.enter(Call::Cleanup {
            file_uri: file_uri.to_string(),
        })
        .await
    }
}

#[async_trait]
impl CaptionService for FakeServices {
    async fn create(
        &self,
        recipe_id: Uuid,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<Uuid, ServiceError> {
        self.enter(Call::CaptionCreate {
            recipe_id,
            file_uri: file_uri.to_string(),
            mime_type: mime_type.to_string(),
        })
        .await?;

        let caption = RecipeCaption {
            id: Uuid::new_v4(),
            recipe_id,
            lang_code: "en".to_string(),
            segments: vec![CaptionSegment {
                start: 0.0,
                end: 2.5,
                text: "Add a teaspoon of salt".to_string(),
            }],
        };
        let id = caption.id;
        self.captions.lock().unwrap().insert(id, caption);
        Ok(id)
    }

    async fn get(&self, caption_id: Uuid) -> Result<RecipeCaption, ServiceError> {
        self.enter(Call::CaptionGet { caption_id }).await?;
        self.captions
            .lock()
            .unwrap()
            .get(&caption_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("caption {}", caption_id)))
    }
}

#[async_trait]
impl DetailService for FakeServices {
    async fn get_recipe_details(
        &self,
        video_id: &str,
        file_uri: &str,
        mime_type: &str,
        video_title: Option<&str>,
    ) -> Result<RecipeDetail, ServiceError> {
        self.enter(Call::RecipeDetails {
            video_id: video_id.to_string(),
            file_uri: file_uri.to_string(),
            mime_type: mime_type.to_string(),
            video_title: video_title.map(String::from),
        })
        .await?;
        Ok(self.detail.clone())
    }
}

#[async_trait]
impl IngredientService for FakeServices {
    async fn create(
        &self,
        recipe_id: Uuid,
        ingredients: &[Ingredient],
    ) -> Result<Vec<Uuid>, ServiceError> {
        self.enter(Call::IngredientCreate {
            recipe_id,
            ingredients: ingredients.to_vec(),
        })
        .await?;
        Ok(ingredients.iter().map(|_| Uuid::new_v4()).collect())
    }
}

#[async_trait]
impl TagService for FakeServices {
    async fn create(&self, recipe_id: Uuid, tags: &[String]) -> Result<Vec<Uuid>, ServiceError> {
        self.enter(Call::TagCreate {
            recipe_id,
            tags: tags.to_vec(),
        })
        .await?;
        Ok(tags.iter().map(|_| Uuid::new_v4()).collect())
    }
}

#[async_trait]
impl DetailMetaService for FakeServices {
    async fn create(
        &self,
        recipe_id: Uuid,
        cook_time: u32,
        servings: u32,
        description: &str,
        title: &str,
    ) -> Result<Uuid, ServiceError> {
        self.enter(Call::DetailMetaCreate {
            recipe_id,
            cook_time,
            servings,
            description: description.to_string(),
            title: title.to_string(),
        })
        .await?;
        Ok(Uuid::new_v4())
    }
}

#[async_trait]
impl StepService for FakeServices {
    async fn create(
        &self,
        recipe_id: Uuid,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<Vec<RecipeStep>, ServiceError> {
        self.enter(Call::StepCreate {
            recipe_id,
            file_uri: file_uri.to_string(),
            mime_type: mime_type.to_string(),
        })
        .await?;
        Ok(self.steps.clone())
    }
}

#[async_trait]
impl BriefingService for FakeServices {
    async fn create(&self, video_id: &str, recipe_id: Uuid) -> Result<(), ServiceError> {
        self.enter(Call::BriefingCreate {
            video_id: video_id.to_string(),
            recipe_id,
        })
        .await
    }
}

#[async_trait]
impl RecipeInfoService for FakeServices {
    async fn success(&self, recipe_id: Uuid) -> Result<(), ServiceError> {
        self.enter(Call::RecipeSuccess { recipe_id }).await
    }

    async fn failed(&self, recipe_id: Uuid) -> Result<(), ServiceError> {
        self.enter(Call::RecipeFailed { recipe_id }).await
    }
}
