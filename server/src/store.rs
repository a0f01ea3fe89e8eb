//! In-memory recipe store.
//!
//! Holds recipes and everything the creation pipeline persists for them.
//! Status only moves forward: `Creating` becomes `Success` or `Failed` once.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use videochef_core::{CaptionSegment, Ingredient, RecipeCaption, RecipeStep, VideoRef};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Recipe not found: {0}")]
    RecipeNotFound(Uuid),

    #[error("Recipe {id} is already {from:?}, cannot become {to:?}")]
    InvalidTransition {
        id: Uuid,
        from: RecipeStatus,
        to: RecipeStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecipeStatus {
    Creating,
    Success,
    Failed,
}

impl RecipeStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RecipeStatus::Creating)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub video_id: String,
    pub video_url: String,
    /// Title supplied with the submission, used when extraction finds none.
    pub title: Option<String>,
    pub status: RecipeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeMeta {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cook_time: u32,
    pub servings: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredIngredient {
    pub id: Uuid,
    pub ingredient: Ingredient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredTag {
    pub id: Uuid,
    pub name: String,
}

/// Everything stored for one recipe.
#[derive(Debug, Clone)]
pub struct AssembledRecipe {
    pub record: RecipeRecord,
    pub meta: Option<RecipeMeta>,
    pub ingredients: Vec<StoredIngredient>,
    pub tags: Vec<StoredTag>,
    pub steps: Vec<RecipeStep>,
    pub briefings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecipeStore {
    recipes: DashMap<Uuid, RecipeRecord>,
    /// Latest recipe per video id.
    by_video: DashMap<String, Uuid>,
    /// Keyed by caption id.
    captions: DashMap<Uuid, RecipeCaption>,
    ingredients: DashMap<Uuid, Vec<StoredIngredient>>,
    tags: DashMap<Uuid, Vec<StoredTag>>,
    meta: DashMap<Uuid, RecipeMeta>,
    steps: DashMap<Uuid, Vec<RecipeStep>>,
    briefings: DashMap<Uuid, Vec<String>>,
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live recipe for `video`, or create a new `Creating` one.
    ///
    /// A previous recipe that failed is replaced. The flag is true when a new
    /// recipe was created; `title` is only stored on a new recipe.
    pub fn create_or_existing(
        &self,
        video: &VideoRef,
        title: Option<&str>,
    ) -> (RecipeRecord, bool) {
        match self.by_video.entry(video.video_id.clone()) {
            Entry::Occupied(mut slot) => {
                if let Some(existing) = self.get(*slot.get()) {
                    if existing.status != RecipeStatus::Failed {
                        return (existing, false);
                    }
                }
                let record = self.insert_recipe(video, title);
                slot.insert(record.id);
                (record, true)
            }
            Entry::Vacant(slot) => {
                let record = self.insert_recipe(video, title);
                slot.insert(record.id);
                (record, true)
            }
        }
    }

    fn insert_recipe(&self, video: &VideoRef, title: Option<&str>) -> RecipeRecord {
        let now = Utc::now();
        let record = RecipeRecord {
            id: Uuid::new_v4(),
            video_id: video.video_id.clone(),
            video_url: video.video_url.clone(),
            title: title.map(str::to_string),
            status: RecipeStatus::Creating,
            created_at: now,
            updated_at: now,
        };
        self.recipes.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: Uuid) -> Option<RecipeRecord> {
        self.recipes.get(&id).map(|r| r.value().clone())
    }

    /// Move a `Creating` recipe to a terminal status.
    pub fn set_status(&self, id: Uuid, status: RecipeStatus) -> Result<(), StoreError> {
        let mut record = self
            .recipes
            .get_mut(&id)
            .ok_or(StoreError::RecipeNotFound(id))?;

        if record.status == status {
            return Ok(());
        }
        if record.status.is_terminal() || !status.is_terminal() {
            return Err(StoreError::InvalidTransition {
                id,
                from: record.status,
                to: status,
            });
        }

        record.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    pub fn save_caption(
        &self,
        recipe_id: Uuid,
        lang_code: String,
        segments: Vec<CaptionSegment>,
    ) -> Result<Uuid, StoreError> {
        self.ensure_exists(recipe_id)?;
        let caption = RecipeCaption {
            id: Uuid::new_v4(),
            recipe_id,
            lang_code,
            segments,
        };
        let id = caption.id;
        self.captions.insert(id, caption);
        Ok(id)
    }

    pub fn caption(&self, caption_id: Uuid) -> Option<RecipeCaption> {
        self.captions.get(&caption_id).map(|c| c.value().clone())
    }

    pub fn add_ingredients(
        &self,
        recipe_id: Uuid,
        ingredients: &[Ingredient],
    ) -> Result<Vec<Uuid>, StoreError> {
        self.ensure_exists(recipe_id)?;
        let stored: Vec<StoredIngredient> = ingredients
            .iter()
            .map(|ingredient| StoredIngredient {
                id: Uuid::new_v4(),
                ingredient: ingredient.clone(),
            })
            .collect();
        let ids = stored.iter().map(|s| s.id).collect();
        self.ingredients.entry(recipe_id).or_default().extend(stored);
        Ok(ids)
    }

    /// Tags already on the recipe keep their id.
    pub fn add_tags(&self, recipe_id: Uuid, tags: &[String]) -> Result<Vec<Uuid>, StoreError> {
        self.ensure_exists(recipe_id)?;
        let mut existing = self.tags.entry(recipe_id).or_default();
        let mut ids = Vec::with_capacity(tags.len());
        for name in tags {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if let Some(tag) = existing.iter().find(|t| t.name.eq_ignore_ascii_case(name)) {
                ids.push(tag.id);
                continue;
            }
            let tag = StoredTag {
                id: Uuid::new_v4(),
                name: name.to_string(),
            };
            ids.push(tag.id);
            existing.push(tag);
        }
        Ok(ids)
    }

    pub fn save_meta(
        &self,
        recipe_id: Uuid,
        cook_time: u32,
        servings: u32,
        description: &str,
        title: &str,
    ) -> Result<Uuid, StoreError> {
        self.ensure_exists(recipe_id)?;
        let meta = RecipeMeta {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            cook_time,
            servings,
        };
        let id = meta.id;
        self.meta.insert(recipe_id, meta);
        Ok(id)
    }

    pub fn save_steps(&self, recipe_id: Uuid, steps: Vec<RecipeStep>) -> Result<(), StoreError> {
        self.ensure_exists(recipe_id)?;
        self.steps.insert(recipe_id, steps);
        Ok(())
    }

    pub fn save_briefings(
        &self,
        recipe_id: Uuid,
        briefings: Vec<String>,
    ) -> Result<(), StoreError> {
        self.ensure_exists(recipe_id)?;
        self.briefings.insert(recipe_id, briefings);
        Ok(())
    }

    pub fn assemble(&self, recipe_id: Uuid) -> Option<AssembledRecipe> {
        let record = self.get(recipe_id)?;
        Some(AssembledRecipe {
            record,
            meta: self.meta.get(&recipe_id).map(|m| m.value().clone()),
            ingredients: cloned_or_empty(&self.ingredients, recipe_id),
            tags: cloned_or_empty(&self.tags, recipe_id),
            steps: cloned_or_empty(&self.steps, recipe_id),
            briefings: cloned_or_empty(&self.briefings, recipe_id),
        })
    }

    fn ensure_exists(&self, recipe_id: Uuid) -> Result<(), StoreError> {
        if self.recipes.contains_key(&recipe_id) {
            Ok(())
        } else {
            Err(StoreError::RecipeNotFound(recipe_id))
        }
    }
}

fn cloned_or_empty<T: Clone>(map: &DashMap<Uuid, Vec<T>>, recipe_id: Uuid) -> Vec<T> {
    map.get(&recipe_id)
        .map(|v| v.value().clone())
        .unwrap_or_default()
}
