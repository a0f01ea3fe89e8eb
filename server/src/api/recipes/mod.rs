pub mod create;
pub mod get;
pub mod progress;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create::create_recipe))
        .route("/{id}", get(get::get_recipe))
        .route("/{id}/progress", get(progress::get_progress))
}

#[derive(OpenApi)]
#[openapi(
    paths(create::create_recipe, get::get_recipe, progress::get_progress,),
    components(schemas(
        create::CreateRecipeRequest,
        create::CreateRecipeResponse,
        get::RecipeResponse,
        get::IngredientResponse,
        get::StepResponse,
        progress::RecipeProgressResponse,
        progress::ProgressItem,
        crate::store::RecipeStatus,
    ))
)]
pub struct ApiDoc;
