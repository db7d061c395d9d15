use axum::extract::{Path, Query, State};

use super::{body, parse_id, JsonBody};
use crate::database::models::{Skill, SkillInput};
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services::listing::SkillListQuery;
use crate::services::SkillService;
use crate::state::AppState;

const NOT_FOUND: &str = "Skill not found";

/// GET /api/skills - flat list plus `grouped` by category
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SkillListQuery>,
) -> ApiResult<Vec<Skill>> {
    let (skills, grouped) = SkillService::new(&state).list(&query).await?;
    Ok(ApiResponse::success(skills).with_field("grouped", grouped))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Skill> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(ApiResponse::success(SkillService::new(&state).get(id).await?))
}

pub async fn post(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: JsonBody<SkillInput>,
) -> ApiResult<Skill> {
    let skill = SkillService::new(&state).create(body(payload)?).await?;
    Ok(ApiResponse::created(skill).with_message("Skill created successfully"))
}

pub async fn put(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: JsonBody<SkillInput>,
) -> ApiResult<Skill> {
    let id = parse_id(&id, NOT_FOUND)?;
    let skill = SkillService::new(&state).update(id, body(payload)?).await?;
    Ok(ApiResponse::success(skill).with_message("Skill updated successfully"))
}

pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    SkillService::new(&state).delete(id).await?;
    Ok(ApiResponse::message("Skill deleted successfully"))
}

/// PATCH /api/skills/:id/toggle-active
pub async fn toggle_active(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Skill> {
    let id = parse_id(&id, NOT_FOUND)?;
    let skill = SkillService::new(&state).toggle_active(id).await?;
    let verb = if skill.is_active { "activated" } else { "deactivated" };
    Ok(ApiResponse::success(skill).with_message(format!("Skill {} successfully", verb)))
}
