//! Collaborator contracts used by the creation pipeline.
//!
//! Steps depend only on these traits. The server wires in adapters that call
//! the extraction service and the recipe store; tests use [`fake::FakeServices`].

pub mod fake;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::types::{Ingredient, RecipeCaption, RecipeDetail, RecipeStep, VideoFile};

#[async_trait]
pub trait VerifyService: Send + Sync {
    /// Check the video is usable and stage a copy for extraction.
    async fn verify(&self, video_id: &str) -> Result<VideoFile, ServiceError>;

    /// Release a staged copy. Missing files are not an error.
    async fn cleanup(&self, file_uri: &str) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Extract and persist the caption, returning its id.
    async fn create(
        &self,
        recipe_id: Uuid,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<Uuid, ServiceError>;

    async fn get(&self, caption_id: Uuid) -> Result<RecipeCaption, ServiceError>;
}

#[async_trait]
pub trait DetailService: Send + Sync {
    async fn get_recipe_details(
        &self,
        video_id: &str,
        file_uri: &str,
        mime_type: &str,
        video_title: Option<&str>,
    ) -> Result<RecipeDetail, ServiceError>;
}

#[async_trait]
pub trait IngredientService: Send + Sync {
    async fn create(
        &self,
        recipe_id: Uuid,
        ingredients: &[Ingredient],
    ) -> Result<Vec<Uuid>, ServiceError>;
}

#[async_trait]
pub trait TagService: Send + Sync {
    async fn create(&self, recipe_id: Uuid, tags: &[String]) -> Result<Vec<Uuid>, ServiceError>;
}

#[async_trait]
pub trait DetailMetaService: Send + Sync {
    async fn create(
        &self,
        recipe_id: Uuid,
        cook_time: u32,
        servings: u32,
        description: &str,
        title: &str,
    ) -> Result<Uuid, ServiceError>;
}

#[async_trait]
pub trait StepService: Send + Sync {
    /// Extract and persist the ordered cooking steps.
    async fn create(
        &self,
        recipe_id: Uuid,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<Vec<RecipeStep>, ServiceError>;
}

#[async_trait]
pub trait BriefingService: Send + Sync {
    async fn create(&self, video_id: &str, recipe_id: Uuid) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait RecipeInfoService: Send + Sync {
    /// Mark the recipe as successfully created.
    async fn success(&self, recipe_id: Uuid) -> Result<(), ServiceError>;

    /// Mark the recipe as failed.
    async fn failed(&self, recipe_id: Uuid) -> Result<(), ServiceError>;
}

/// Every collaborator the pipeline needs, bundled for wiring.
#[derive(Clone)]
pub struct Collaborators {
    pub verify: Arc<dyn VerifyService>,
    pub caption: Arc<dyn CaptionService>,
    pub detail: Arc<dyn DetailService>,
    pub ingredient: Arc<dyn IngredientService>,
    pub tag: Arc<dyn TagService>,
    pub detail_meta: Arc<dyn DetailMetaService>,
    pub step: Arc<dyn StepService>,
    pub briefing: Arc<dyn BriefingService>,
    pub recipe_info: Arc<dyn RecipeInfoService>,
}

impl Collaborators {
    /// Use one object for every collaborator.
    pub fn from_all<T>(services: Arc<T>) -> Self
    where
        T: VerifyService
            + CaptionService
            + DetailService
            + IngredientService
            + TagService
            + DetailMetaService
            + StepService
            + BriefingService
            + RecipeInfoService
            + 'static,
    {
        Self {
            verify: services.clone(),
            caption: services.clone(),
            detail: services.clone(),
            ingredient: services.clone(),
            tag: services.clone(),
            detail_meta: services.clone(),
            step: services.clone(),
            briefing: services.clone(),
            recipe_info: services,
        }
    }
}
