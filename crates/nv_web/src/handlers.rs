use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nv_core::{ArticleQuery, Category, NewAudioClip};
use nv_news::{narration_text, NarrationScope};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::AppState;

const MAX_COUNT: usize = 100;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub company: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClipBody {
    pub audio_url: String,
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
pub struct NarrationParams {
    pub scope: Option<NarrationScope>,
}

#[derive(Debug, Serialize)]
pub struct CategoryEntry {
    pub value: Category,
    pub label: &'static str,
}

pub async fn list_categories() -> Json<Vec<CategoryEntry>> {
    Json(
        Category::ALL
            .iter()
            .map(|c| CategoryEntry {
                value: *c,
                label: c.label(),
            })
            .collect(),
    )
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Response {
    let category = match params.category.as_deref() {
        Some(raw) => match raw.parse::<Category>() {
            Ok(category) => category,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        },
        None => Category::General,
    };
    let count = params
        .count
        .unwrap_or(ArticleQuery::DEFAULT_LIMIT)
        .min(MAX_COUNT);

    let articles = match params.company.as_deref() {
        Some(company) => state.news.list_for_company(company, count).await,
        None => state.news.list(category, count).await,
    };
    Json(articles).into_response()
}

pub async fn list_companies(State(state): State<Arc<AppState>>) -> Response {
    Json(state.news.companies().await).into_response()
}

pub async fn get_audio_clip(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.news.audio_clip(&id).await {
        Some(clip) => Json(clip).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No audio clip for this article"),
    }
}

pub async fn create_audio_clip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AudioClipBody>,
) -> Response {
    if state.news.get_by_id(&id).await.is_none() {
        return error_response(StatusCode::NOT_FOUND, "Article not found");
    }
    let clip = NewAudioClip {
        article_id: id,
        audio_url: body.audio_url,
        duration: body.duration,
    };
    match state.news.save_audio_clip(&clip).await {
        Some(created) => (StatusCode::CREATED, Json(created)).into_response(),
        None => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save audio clip"),
    }
}

pub async fn get_article(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.news.get_by_id(&id).await {
        Some(article) => Json(article).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Article not found"),
    }
}

pub async fn get_narration(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<NarrationParams>,
) -> Response {
    let scope = params.scope.unwrap_or_default();
    match state.news.get_by_id(&id).await {
        Some(article) => Json(json!({
            "id": article.id,
            "scope": scope,
            "text": narration_text(&article, scope),
        }))
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Article not found"),
    }
}

pub async fn list_saved(State(state): State<Arc<AppState>>) -> Response {
    match state.saved.ids() {
        Ok(ids) => Json(json!({ "ids": ids })).into_response(),
        Err(e) => {
            error!("Failed to read saved articles: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read saved articles")
        }
    }
}

/// Unsaving never looks the article up, so ids of articles that left the
/// store can still be removed. Saving requires the article to exist.
pub async fn toggle_saved(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let already_saved = match state.saved.contains(&id) {
        Ok(saved) => saved,
        Err(e) => {
            error!("Failed to read saved articles: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read saved articles");
        }
    };
    if !already_saved && state.news.get_by_id(&id).await.is_none() {
        return error_response(StatusCode::NOT_FOUND, "Article not found");
    }
    match state.saved.toggle(&id) {
        Ok(outcome) => Json(json!({ "id": id, "saved": outcome.is_saved() })).into_response(),
        Err(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update saved articles",
        ),
    }
}
