use async_trait::async_trait;
use sqlx::{postgres::PgRow, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{text_enum, unique_violation, PgStore};
use crate::database::models::Skill;
use crate::database::query::SkillFilter;
use crate::database::store::SkillStore;
use crate::database::{StoreError, StoreResult};

const COLUMNS: &str = "id, name, category, proficiency, icon, description, years_of_experience, \
     is_active, sort_order, color, created_at, updated_at";

fn skill_from_row(row: &PgRow) -> StoreResult<Skill> {
    Ok(Skill {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: text_enum(row, "category")?,
        proficiency: row.try_get("proficiency")?,
        icon: row.try_get("icon")?,
        description: row.try_get("description")?,
        years_of_experience: row.try_get("years_of_experience")?,
        is_active: row.try_get("is_active")?,
        order: row.try_get("sort_order")?,
        color: row.try_get("color")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &SkillFilter) {
    qb.push(" WHERE TRUE");
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
}

#[async_trait]
impl SkillStore for PgStore {
    async fn insert_skill(&self, skill: Skill) -> StoreResult<Skill> {
        let row = sqlx::query(&format!(
            "INSERT INTO skills ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        ))
        .bind(skill.id)
        .bind(&skill.name)
        .bind(skill.category.as_str())
        .bind(skill.proficiency)
        .bind(&skill.icon)
        .bind(&skill.description)
        .bind(skill.years_of_experience)
        .bind(skill.is_active)
        .bind(skill.order)
        .bind(&skill.color)
        .bind(skill.created_at)
        .bind(skill.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Skill already exists"))?;
        skill_from_row(&row)
    }

    async fn list_skills(&self, filter: &SkillFilter) -> StoreResult<Vec<Skill>> {
        let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM skills"));
        push_filter(&mut select, filter);
        select.push(" ORDER BY category ASC, sort_order ASC, name ASC");
        let rows = select.build().fetch_all(&self.pool).await?;
        rows.iter().map(skill_from_row).collect()
    }

    async fn get_skill(&self, id: Uuid) -> StoreResult<Option<Skill>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM skills WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(skill_from_row).transpose()
    }

    async fn find_skill_by_name(&self, name: &str) -> StoreResult<Option<Skill>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM skills WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(skill_from_row).transpose()
    }

    async fn save_skill(&self, skill: &Skill) -> StoreResult<Skill> {
        let row = sqlx::query(&format!(
            "UPDATE skills SET
                name = $2, category = $3, proficiency = $4, icon = $5, description = $6,
                years_of_experience = $7, is_active = $8, sort_order = $9, color = $10,
                updated_at = $11
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(skill.id)
        .bind(&skill.name)
        .bind(skill.category.as_str())
        .bind(skill.proficiency)
        .bind(&skill.icon)
        .bind(&skill.description)
        .bind(skill.years_of_experience)
        .bind(skill.is_active)
        .bind(skill.order)
        .bind(&skill.color)
        .bind(skill.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Skill name already exists"))?;
        match row {
            Some(row) => skill_from_row(&row),
            None => Err(StoreError::NotFound("Skill not found".to_string())),
        }
    }

    async fn delete_skill(&self, id: Uuid) -> StoreResult<Option<Skill>> {
        let row = sqlx::query(&format!("DELETE FROM skills WHERE id = $1 RETURNING {COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(skill_from_row).transpose()
    }
}
