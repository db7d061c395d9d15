use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::listing::{self, ProjectListQuery};
use crate::database::models::{Project, ProjectInput};
use crate::database::{ProjectStore, Store};
use crate::error::ApiError;
use crate::middleware::Viewer;
use crate::state::AppState;
use crate::storage::ObjectStore;
use crate::types::Pagination;
use crate::uploads::{self, FormResource, FormSchema, ResourceForm, THUMBNAIL};

impl FormResource for ProjectInput {
    const SCHEMA: FormSchema = FormSchema {
        files: &[THUMBNAIL],
        json: &["technologies", "tags", "images"],
        bools: &["featured"],
        numbers: &["order"],
    };
}

pub struct ProjectList {
    pub projects: Vec<Project>,
    /// `None` when the whole result set was returned.
    pub pagination: Option<Pagination>,
}

pub struct ProjectService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
    max_page_limit: u32,
}

impl ProjectService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            objects: state.objects.clone(),
            max_page_limit: state.config.api.max_page_limit,
        }
    }

    pub async fn list(&self, viewer: &Viewer, query: &ProjectListQuery) -> Result<ProjectList, ApiError> {
        let filter = listing::project_filter(viewer, query, self.max_page_limit)?;
        let (projects, total) = self.store.list_projects(&filter).await?;
        Ok(ProjectList {
            projects,
            pagination: filter.page.map(|page| Pagination::new(page, total)),
        })
    }

    /// Fetches a project and counts the view.
    pub async fn view(&self, id: Uuid) -> Result<Project, ApiError> {
        self.store
            .increment_project_views(id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn create(&self, form: ResourceForm<ProjectInput>) -> Result<Project, ApiError> {
        let mut project = Project::create(form.input)?;

        let stored = uploads::store_all(self.objects.as_ref(), form.files).await?;
        if let Some(url) = uploads::url_for(&stored, &THUMBNAIL) {
            project.thumbnail_image = url.to_string();
        }

        match self.store.insert_project(project).await {
            Ok(project) => {
                info!(project_id = %project.id, "Created project");
                Ok(project)
            }
            Err(e) => {
                uploads::reclaim(self.objects.as_ref(), stored.into_iter().map(|s| s.url)).await;
                Err(e.into())
            }
        }
    }

    /// Merges the input into the stored project. A new thumbnail supersedes
    /// the old one, which is removed once the record points at the new file.
    pub async fn update(&self, id: Uuid, form: ResourceForm<ProjectInput>) -> Result<Project, ApiError> {
        let existing = self.store.get_project(id).await?.ok_or_else(not_found)?;

        let mut project = existing.clone();
        project.apply(form.input)?;

        let stored = uploads::store_all(self.objects.as_ref(), form.files).await?;
        if let Some(url) = uploads::url_for(&stored, &THUMBNAIL) {
            project.thumbnail_image = url.to_string();
        }

        let saved = match self.store.save_project(&project).await {
            Ok(saved) => saved,
            Err(e) => {
                uploads::reclaim(self.objects.as_ref(), stored.into_iter().map(|s| s.url)).await;
                return Err(e.into());
            }
        };

        uploads::reclaim(self.objects.as_ref(), superseded(&existing, &saved)).await;
        info!(project_id = %saved.id, "Updated project");
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let project = self.store.delete_project(id).await?.ok_or_else(not_found)?;
        uploads::reclaim(self.objects.as_ref(), project.uploaded_urls()).await;
        info!(project_id = %id, "Deleted project");
        Ok(())
    }

    pub async fn toggle_featured(&self, id: Uuid) -> Result<Project, ApiError> {
        let mut project = self.store.get_project(id).await?.ok_or_else(not_found)?;
        project.featured = !project.featured;
        project.updated_at = chrono::Utc::now();
        Ok(self.store.save_project(&project).await?)
    }
}

/// Uploads the old record populated that the new one no longer references.
fn superseded(before: &Project, after: &Project) -> Vec<String> {
    let kept = after.uploaded_urls();
    before
        .uploaded_urls()
        .into_iter()
        .filter(|url| !kept.contains(url))
        .collect()
}

fn not_found() -> ApiError {
    ApiError::not_found("Project not found")
}
