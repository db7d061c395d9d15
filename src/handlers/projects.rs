use axum::extract::{Path, Query, State};

use super::parse_id;
use crate::database::models::{Project, ProjectInput};
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult, Viewer};
use crate::services::listing::ProjectListQuery;
use crate::services::ProjectService;
use crate::state::AppState;
use crate::uploads::ResourceForm;

const NOT_FOUND: &str = "Project not found";

/// GET /api/projects - published projects, or everything for an admin
pub async fn list(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Vec<Project>> {
    let listing = ProjectService::new(&state).list(&viewer, &query).await?;
    Ok(ApiResponse::success(listing.projects).with_field("pagination", listing.pagination))
}

/// GET /api/projects/:id - also counts the view
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    let id = parse_id(&id, NOT_FOUND)?;
    let project = ProjectService::new(&state).view(id).await?;
    Ok(ApiResponse::success(project))
}

/// POST /api/projects - JSON or multipart with a `thumbnail` file
pub async fn post(
    State(state): State<AppState>,
    _admin: AdminUser,
    form: ResourceForm<ProjectInput>,
) -> ApiResult<Project> {
    let project = ProjectService::new(&state).create(form).await?;
    Ok(ApiResponse::created(project).with_message("Project created successfully"))
}

/// PUT /api/projects/:id
pub async fn put(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    form: ResourceForm<ProjectInput>,
) -> ApiResult<Project> {
    let id = parse_id(&id, NOT_FOUND)?;
    let project = ProjectService::new(&state).update(id, form).await?;
    Ok(ApiResponse::success(project).with_message("Project updated successfully"))
}

/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    ProjectService::new(&state).delete(id).await?;
    Ok(ApiResponse::message("Project deleted successfully"))
}

/// PATCH /api/projects/:id/toggle-featured
pub async fn toggle_featured(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    let id = parse_id(&id, NOT_FOUND)?;
    let project = ProjectService::new(&state).toggle_featured(id).await?;
    let verb = if project.featured { "featured" } else { "unfeatured" };
    Ok(ApiResponse::success(project).with_message(format!("Project {} successfully", verb)))
}
