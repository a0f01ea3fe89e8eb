use crate::api::ErrorResponse;
use crate::store::{AssembledRecipe, RecipeStatus};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StepResponse {
    pub step_order: u32,
    pub subtitle: String,
    pub details: Vec<String>,
    /// Offset into the video, in seconds
    pub start: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub video_id: String,
    pub video_url: String,
    pub status: RecipeStatus,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Minutes
    pub cook_time: Option<u32>,
    pub servings: Option<u32>,
    pub ingredients: Vec<IngredientResponse>,
    pub tags: Vec<String>,
    pub steps: Vec<StepResponse>,
    pub briefings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AssembledRecipe> for RecipeResponse {
    fn from(recipe: AssembledRecipe) -> Self {
        let record = recipe.record;
        let meta = recipe.meta;
        Self {
            id: record.id,
            video_id: record.video_id,
            video_url: record.video_url,
            status: record.status,
            title: meta
                .as_ref()
                .map(|m| m.title.clone())
                .filter(|t| !t.is_empty())
                .or(record.title),
            description: meta.as_ref().map(|m| m.description.clone()),
            cook_time: meta.as_ref().map(|m| m.cook_time),
            servings: meta.as_ref().map(|m| m.servings),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(|stored| IngredientResponse {
                    id: stored.id,
                    name: stored.ingredient.name,
                    amount: stored.ingredient.amount,
                    unit: stored.ingredient.unit,
                })
                .collect(),
            tags: recipe.tags.into_iter().map(|t| t.name).collect(),
            steps: recipe
                .steps
                .into_iter()
                .map(|s| StepResponse {
                    step_order: s.step_order,
                    subtitle: s.subtitle,
                    details: s.details,
                    start: s.start,
                })
                .collect(),
            briefings: recipe.briefings,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(creator): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> impl IntoResponse {
    match creator.store().assemble(recipe_id) {
        Some(recipe) => (StatusCode::OK, Json(RecipeResponse::from(recipe))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response(),
    }
}
