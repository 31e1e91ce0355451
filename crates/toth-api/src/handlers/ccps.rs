//! CCP CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use toth_core::{Ccp, CcpRequest, Error, PageRequest};

use super::{location_header, pagination_headers};
use crate::{ApiError, AppState};

const BASE_PATH: &str = "/api/ccps";

fn ccp_not_found(id: i64) -> Error {
    Error::NotFound(format!("CCP {} not found", id))
}

pub async fn create_ccp(
    State(state): State<AppState>,
    Json(body): Json<CcpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.id.is_some() {
        return Err(ApiError::BadRequest(
            "A new CCP cannot already have an ID".to_string(),
        ));
    }
    body.validate()?;

    let created = state.ccps.insert(body.into_new()).await?;
    Ok((
        StatusCode::CREATED,
        location_header(BASE_PATH, created.id),
        Json(created),
    ))
}

pub async fn update_ccp(
    State(state): State<AppState>,
    Json(body): Json<CcpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = body
        .id
        .ok_or_else(|| ApiError::BadRequest("Invalid id: null".to_string()))?;
    body.validate()?;

    let update = body.into_new();
    let saved = state
        .ccps
        .save(&Ccp {
            id,
            title: update.title,
            documents: update.documents,
        })
        .await?;
    Ok(Json(saved))
}

pub async fn list_ccps(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.ccps.list(page).await?;
    Ok((pagination_headers(BASE_PATH, &page), Json(page.items)))
}

pub async fn get_ccp(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let ccp = state.ccps.get(id).await?.ok_or_else(|| ccp_not_found(id))?;
    Ok(Json(ccp))
}

pub async fn delete_ccp(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.ccps.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
