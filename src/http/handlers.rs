use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::error::ApiError;
use crate::member::{Member, MemberId, MemberInput, UpdateRequest};
use crate::registry::MemberRegistry;
use crate::search::SearchParams;
use crate::store::MemberStore;

type Registry<S> = State<Arc<MemberRegistry<S>>>;

/// `GET /health`
pub(super) async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /api/members`
pub(super) async fn list<S: MemberStore>(
    State(registry): Registry<S>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let members = registry.list()?;
    tracing::debug!(count = members.len(), "listed members");
    Ok(Json(members))
}

/// `POST /api/members`
pub(super) async fn create<S: MemberStore>(
    State(registry): Registry<S>,
    body: Result<Json<MemberInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    let Json(input) = body?;
    let member = registry.create(&input)?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// `GET /api/members/search`
pub(super) async fn search<S: MemberStore>(
    State(registry): Registry<S>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let Query(params) = params?;
    let members = registry.search(&params)?;
    tracing::debug!(?params, count = members.len(), "searched members");
    Ok(Json(members))
}

/// `GET /api/members/:id`
pub(super) async fn get_one<S: MemberStore>(
    State(registry): Registry<S>,
    id: Result<Path<MemberId>, PathRejection>,
) -> Result<Json<Member>, ApiError> {
    let Path(id) = id?;
    Ok(Json(registry.get(id)?))
}

/// `PUT /api/members/:id`
pub(super) async fn update<S: MemberStore>(
    State(registry): Registry<S>,
    id: Result<Path<MemberId>, PathRejection>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Member>, ApiError> {
    let Path(id) = id?;
    let Json(request) = body?;
    Ok(Json(registry.update(id, &request)?))
}

/// `DELETE /api/members/:id`
pub(super) async fn delete<S: MemberStore>(
    State(registry): Registry<S>,
    id: Result<Path<MemberId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    registry.delete(id)?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/members/:id/unlock`
pub(super) async fn unlock<S: MemberStore>(
    State(registry): Registry<S>,
    id: Result<Path<MemberId>, PathRejection>,
) -> Result<Json<Member>, ApiError> {
    let Path(id) = id?;
    Ok(Json(registry.unlock(id)?))
}
