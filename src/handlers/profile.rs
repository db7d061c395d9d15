use axum::extract::{Path, State};

use super::{body, parse_id, JsonBody};
use crate::database::models::{EducationInput, ExperienceInput, Profile, ProfileInput};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services::ProfileService;
use crate::state::AppState;
use crate::uploads::ResourceForm;

/// GET /api/profile
pub async fn get(State(state): State<AppState>) -> ApiResult<Profile> {
    Ok(ApiResponse::success(ProfileService::new(&state).get().await?))
}

/// PUT /api/profile - JSON or multipart with `profileImage`, `coverImage`
/// and `resume` files
pub async fn put(
    State(state): State<AppState>,
    _admin: AdminUser,
    form: ResourceForm<ProfileInput>,
) -> ApiResult<Profile> {
    let profile = ProfileService::new(&state).update(form).await?;
    Ok(ApiResponse::success(profile).with_message("Profile updated successfully"))
}

pub async fn add_experience(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: JsonBody<ExperienceInput>,
) -> ApiResult<Profile> {
    let profile = ProfileService::new(&state).add_experience(body(payload)?).await?;
    Ok(ApiResponse::created(profile).with_message("Experience added successfully"))
}

pub async fn update_experience(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: JsonBody<ExperienceInput>,
) -> ApiResult<Profile> {
    let id = parse_id(&id, "Experience not found")?;
    let profile = ProfileService::new(&state)
        .update_experience(id, body(payload)?)
        .await?;
    Ok(ApiResponse::success(profile).with_message("Experience updated successfully"))
}

pub async fn delete_experience(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Profile> {
    let id = parse_id(&id, "Experience not found")?;
    let profile = ProfileService::new(&state).delete_experience(id).await?;
    Ok(ApiResponse::success(profile).with_message("Experience deleted successfully"))
}

pub async fn add_education(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: JsonBody<EducationInput>,
) -> ApiResult<Profile> {
    let profile = ProfileService::new(&state).add_education(body(payload)?).await?;
    Ok(ApiResponse::created(profile).with_message("Education added successfully"))
}

pub async fn update_education(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: JsonBody<EducationInput>,
) -> ApiResult<Profile> {
    let id = parse_id(&id, "Education not found")?;
    let profile = ProfileService::new(&state)
        .update_education(id, body(payload)?)
        .await?;
    Ok(ApiResponse::success(profile).with_message("Education updated successfully"))
}

pub async fn delete_education(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Profile> {
    let id = parse_id(&id, "Education not found")?;
    let profile = ProfileService::new(&state).delete_education(id).await?;
    Ok(ApiResponse::success(profile).with_message("Education deleted successfully"))
}
