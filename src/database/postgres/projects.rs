use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{text_enum, PgStore};
use crate::database::models::{Project, ProjectImage};
use crate::database::query::ProjectFilter;
use crate::database::store::ProjectStore;
use crate::database::{StoreError, StoreResult};

const COLUMNS: &str = "id, title, short_description, full_description, technologies, category, \
     images, thumbnail_image, live_url, github_url, status, featured, view_count, publish_date, \
     completion_date, tags, sort_order, created_at, updated_at";

fn project_from_row(row: &PgRow) -> StoreResult<Project> {
    let images: Json<Vec<ProjectImage>> = row.try_get("images")?;
    Ok(Project {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        short_description: row.try_get("short_description")?,
        full_description: row.try_get("full_description")?,
        technologies: row.try_get("technologies")?,
        category: text_enum(row, "category")?,
        images: images.0,
        thumbnail_image: row.try_get("thumbnail_image")?,
        live_url: row.try_get("live_url")?,
        github_url: row.try_get("github_url")?,
        status: text_enum(row, "status")?,
        featured: row.try_get("featured")?,
        view_count: row.try_get("view_count")?,
        publish_date: row.try_get("publish_date")?,
        completion_date: row.try_get("completion_date")?,
        tags: row.try_get("tags")?,
        order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND featured = ").push_bind(featured);
    }
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category.as_str());
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn insert_project(&self, project: Project) -> StoreResult<Project> {
        let row = sqlx::query(&format!(
            "INSERT INTO projects ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING {COLUMNS}"
        ))
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.short_description)
        .bind(&project.full_description)
        .bind(&project.technologies)
        .bind(project.category.as_str())
        .bind(Json(&project.images))
        .bind(&project.thumbnail_image)
        .bind(&project.live_url)
        .bind(&project.github_url)
        .bind(project.status.as_str())
        .bind(project.featured)
        .bind(project.view_count)
        .bind(project.publish_date)
        .bind(project.completion_date)
        .bind(&project.tags)
        .bind(project.order)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await?;
        project_from_row(&row)
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<(Vec<Project>, u64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM projects");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM projects"));
        push_filter(&mut select, filter);
        select.push(" ORDER BY sort_order ASC, publish_date DESC");
        if let Some(page) = filter.page {
            select
                .push(" LIMIT ")
                .push_bind(i64::from(page.limit))
                .push(" OFFSET ")
                .push_bind(page.offset() as i64);
        }
        let rows = select.build().fetch_all(&self.pool).await?;
        let projects = rows.iter().map(project_from_row).collect::<StoreResult<_>>()?;
        Ok((projects, total.max(0) as u64))
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM projects WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(project_from_row).transpose()
    }

    async fn increment_project_views(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let row = sqlx::query(&format!(
            "UPDATE projects SET view_count = view_count + 1 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(project_from_row).transpose()
    }

    async fn save_project(&self, project: &Project) -> StoreResult<Project> {
        // view_count is only ever changed by increment_project_views.
        let row = sqlx::query(&format!(
            "UPDATE projects SET
                title = $2, short_description = $3, full_description = $4, technologies = $5,
                category = $6, images = $7, thumbnail_image = $8, live_url = $9, github_url = $10,
                status = $11, featured = $12, publish_date = $13, completion_date = $14,
                tags = $15, sort_order = $16, updated_at = $17
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.short_description)
        .bind(&project.full_description)
        .bind(&project.technologies)
        .bind(project.category.as_str())
        .bind(Json(&project.images))
        .bind(&project.thumbnail_image)
        .bind(&project.live_url)
        .bind(&project.github_url)
        .bind(project.status.as_str())
        .bind(project.featured)
        .bind(project.publish_date)
        .bind(project.completion_date)
        .bind(&project.tags)
        .bind(project.order)
        .bind(project.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => project_from_row(&row),
            None => Err(StoreError::NotFound("Project not found".to_string())),
        }
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let row = sqlx::query(&format!("DELETE FROM projects WHERE id = $1 RETURNING {COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(project_from_row).transpose()
    }
}
