//! Evaluation CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use toth_core::{Error, Evaluation, EvaluationRequest, PageRequest};

use super::{location_header, pagination_headers};
use crate::{ApiError, AppState};

const BASE_PATH: &str = "/api/evaluations";

pub async fn create_evaluation(
    State(state): State<AppState>,
    Json(body): Json<EvaluationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.id.is_some() {
        return Err(ApiError::BadRequest(
            "A new evaluation cannot already have an ID".to_string(),
        ));
    }
    body.validate()?;

    let created = state.evaluations.insert(body.into_new()).await?;
    Ok((
        StatusCode::CREATED,
        location_header(BASE_PATH, created.id),
        Json(created),
    ))
}

pub async fn update_evaluation(
    State(state): State<AppState>,
    Json(body): Json<EvaluationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = body
        .id
        .ok_or_else(|| ApiError::BadRequest("Invalid id: null".to_string()))?;
    body.validate()?;

    let update = body.into_new();
    let saved = state
        .evaluations
        .save(&Evaluation {
            id,
            title: update.title,
            ccp_id: update.ccp_id,
        })
        .await?;
    Ok(Json(saved))
}

pub async fn list_evaluations(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.evaluations.list(page).await?;
    Ok((pagination_headers(BASE_PATH, &page), Json(page.items)))
}

pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let evaluation = state
        .evaluations
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Evaluation {} not found", id)))?;
    Ok(Json(evaluation))
}

pub async fn delete_evaluation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.evaluations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
