use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, Row};

use super::PgStore;
use crate::database::models::profile::PROFILE_ID;
use crate::database::models::{Education, Experience, Profile, SocialLinks};
use crate::database::store::ProfileStore;
use crate::database::StoreResult;

const COLUMNS: &str = "id, full_name, title, email, phone, location, bio, about, profile_image, \
     cover_image, social_links, resume_url, experience, education, seo_title, seo_description, \
     seo_keywords, is_active, created_at, updated_at";

fn profile_from_row(row: &PgRow) -> StoreResult<Profile> {
    let social_links: Json<SocialLinks> = row.try_get("social_links")?;
    let experience: Json<Vec<Experience>> = row.try_get("experience")?;
    let education: Json<Vec<Education>> = row.try_get("education")?;
    Ok(Profile {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        title: row.try_get("title")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        location: row.try_get("location")?,
        bio: row.try_get("bio")?,
        about: row.try_get("about")?,
        profile_image: row.try_get("profile_image")?,
        cover_image: row.try_get("cover_image")?,
        social_links: social_links.0,
        resume_url: row.try_get("resume_url")?,
        experience: experience.0,
        education: education.0,
        seo_title: row.try_get("seo_title")?,
        seo_description: row.try_get("seo_description")?,
        seo_keywords: row.try_get("seo_keywords")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl PgStore {
    /// Writes the profile under the singleton key. With `overwrite` false an
    /// existing row wins and is left untouched.
    async fn upsert_profile(&self, profile: &Profile, overwrite: bool) -> StoreResult<()> {
        let conflict = if overwrite {
            "ON CONFLICT (id) DO UPDATE SET
                full_name = EXCLUDED.full_name, title = EXCLUDED.title, email = EXCLUDED.email,
                phone = EXCLUDED.phone, location = EXCLUDED.location, bio = EXCLUDED.bio,
                about = EXCLUDED.about, profile_image = EXCLUDED.profile_image,
                cover_image = EXCLUDED.cover_image, social_links = EXCLUDED.social_links,
                resume_url = EXCLUDED.resume_url, experience = EXCLUDED.experience,
                education = EXCLUDED.education, seo_title = EXCLUDED.seo_title,
                seo_description = EXCLUDED.seo_description, seo_keywords = EXCLUDED.seo_keywords,
                is_active = EXCLUDED.is_active, updated_at = EXCLUDED.updated_at"
        } else {
            "ON CONFLICT (id) DO NOTHING"
        };

        sqlx::query(&format!(
            "INSERT INTO profiles ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
             {conflict}"
        ))
        .bind(PROFILE_ID)
        .bind(&profile.full_name)
        .bind(&profile.title)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.location)
        .bind(&profile.bio)
        .bind(&profile.about)
        .bind(&profile.profile_image)
        .bind(&profile.cover_image)
        .bind(Json(&profile.social_links))
        .bind(&profile.resume_url)
        .bind(Json(&profile.experience))
        .bind(Json(&profile.education))
        .bind(&profile.seo_title)
        .bind(&profile.seo_description)
        .bind(&profile.seo_keywords)
        .bind(profile.is_active)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_profile(&self) -> StoreResult<Profile> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM profiles WHERE id = $1"))
            .bind(PROFILE_ID)
            .fetch_one(&self.pool)
            .await?;
        profile_from_row(&row)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_or_create_profile(&self, default: Profile) -> StoreResult<Profile> {
        self.upsert_profile(&default, false).await?;
        self.fetch_profile().await
    }

    async fn save_profile(&self, profile: &Profile) -> StoreResult<Profile> {
        self.upsert_profile(profile, true).await?;
        self.fetch_profile().await
    }
}
