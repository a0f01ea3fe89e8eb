//! Collaborator implementations backed by the extraction service and the
//! recipe store.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use videochef_core::services::{
    BriefingService, CaptionService, DetailMetaService, DetailService, IngredientService,
    RecipeInfoService, StepService, TagService, VerifyService,
};
use videochef_core::{
    ExtractionClient, Ingredient, RecipeCaption, RecipeDetail, RecipeStep, ServiceError,
    VideoFile,
};

use crate::store::{RecipeStatus, RecipeStore, StoreError};

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RecipeNotFound(_) => ServiceError::NotFound(e.to_string()),
            StoreError::InvalidTransition { .. } => ServiceError::Persistence(e.to_string()),
        }
    }
}

/// Extraction calls go to the remote service; results are kept in the store.
pub struct StoreBackedServices {
    client: ExtractionClient,
    store: Arc<RecipeStore>,
}

impl StoreBackedServices {
    pub fn new(client: ExtractionClient, store: Arc<RecipeStore>) -> Self {
        Self { client, store }
    }
}

#[async_trait]
impl VerifyService for StoreBackedServices {
    async fn verify(&self, video_id: &str) -> Result<VideoFile, ServiceError> {
        self.client.verify(video_id).await
    }

    async fn cleanup(&self, file_uri: &str) -> Result<(), ServiceError> {
        self.client.cleanup(file_uri).await
    }
}

#[async_trait]
impl CaptionService for StoreBackedServices {
    async fn create(
        &self,
        recipe_id: Uuid,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<Uuid, ServiceError> {
        let caption = self.client.extract_caption(file_uri, mime_type).await?;
        let id = self
            .store
            .save_caption(recipe_id, caption.lang_code, caption.segments)?;
        Ok(id)
    }

    async fn get(&self, caption_id: Uuid) -> Result<RecipeCaption, ServiceError> {
        self.store
            .caption(caption_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Caption not found: {}", caption_id)))
    }
}

#[async_trait]
impl DetailService for StoreBackedServices {
    async fn get_recipe_details(
        &self,
        video_id: &str,
        file_uri: &str,
        mime_type: &str,
        video_title: Option<&str>,
    ) -> Result<RecipeDetail, ServiceError> {
        self.client
            .extract_details(video_id, file_uri, mime_type, video_title)
            .await
    }
}

#[async_trait]
impl IngredientService for StoreBackedServices {
    async fn create(
        &self,
        recipe_id: Uuid,
        ingredients: &[Ingredient],
    ) -> Result<Vec<Uuid>, ServiceError> {
        Ok(self.store.add_ingredients(recipe_id, ingredients)?)
    }
}

#[async_trait]
impl TagService for StoreBackedServices {
    async fn create(&self, recipe_id: Uuid, tags: &[String]) -> Result<Vec<Uuid>, ServiceError> {
        Ok(self.store.add_tags(recipe_id, tags)?)
    }
}

#[async_trait]
impl DetailMetaService for StoreBackedServices {
    async fn create(
        &self,
        recipe_id: Uuid,
        cook_time: u32,
        servings: u32,
        description: &str,
        title: &str,
    ) -> Result<Uuid, ServiceError> {
        Ok(self
            .store
            .save_meta(recipe_id, cook_time, servings, description, title)?)
    }
}

#[async_trait]
impl StepService for StoreBackedServices {
    async fn create(
        &self,
        recipe_id: Uuid,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<Vec<RecipeStep>, ServiceError> {
        let steps = self.client.extract_steps(file_uri, mime_type).await?;
        self.store.save_steps(recipe_id, steps.clone())?;
        Ok(steps)
    }
}

#[async_trait]
impl BriefingService for StoreBackedServices {
    async fn create(&self, video_id: &str, recipe_id: Uuid) -> Result<(), ServiceError> {
        let generated = self.client.generate_briefings(video_id).await?;
        self.store.save_briefings(recipe_id, generated.briefings)?;
        Ok(())
    }
}

#[async_trait]
impl RecipeInfoService for StoreBackedServices {
    async fn success(&self, recipe_id: Uuid) -> Result<(), ServiceError> {
        Ok(self.store.set_status(recipe_id, RecipeStatus::Success)?)
    }

    async fn failed(&self, recipe_id: Uuid) -> Result<(), ServiceError> {
        Ok(self.store.set_status(recipe_id, RecipeStatus::Failed)?)
    }
}
