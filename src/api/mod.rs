//! HTTP surface — create, get-by-id and paginated listing.
//!
//! This layer is the trigger for the pipeline, nothing more: validation
//! happens here (taxonomy class (a), rejected before any message is
//! produced), a missing post maps to 404 via the store's `Option`, and a
//! broker failure during create surfaces as 502.

pub mod dto;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use crate::error::Error;
use crate::post::PostService;

use dto::{PostInput, PostOutput, PostPageOutput};

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
}

/// Build the router.
pub fn routes(posts: Arc<PostService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/api/posts", get(list_posts).post(create_post))
        .route("/v1/api/posts/{id}", get(get_post))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { posts })
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "postworks"
    }))
}

async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<PostInput>,
) -> impl IntoResponse {
    let draft = match input.validate() {
        Ok(draft) => draft,
        Err(violations) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "errors": violations })),
            )
                .into_response();
        }
    };

    match state.posts.create(draft).await {
        Ok(post) => (StatusCode::CREATED, Json(PostOutput::from(post))).into_response(),
        Err(Error::Broker(e)) => {
            warn!(error = %e, "Create failed at publish, post saved but unprocessed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "processing request could not be queued" })),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Create failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_post(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.posts.get(id).await {
        Ok(Some(post)) => Json(PostOutput::from(post)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!(error = %e, "Lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<usize>,
    size: Option<usize>,
}

async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let page = params.page.unwrap_or(0);
    let size = params
        .size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    match state.posts.list(page, size).await {
        Ok(page) => Json(PostPageOutput::from(page)).into_response(),
        Err(e) => {
            warn!(error = %e, "Listing failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
