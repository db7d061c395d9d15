use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::database::models::{
    Education, EducationInput, Experience, ExperienceInput, Profile, ProfileInput,
};
use crate::database::{ProfileStore, Store};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::ObjectStore;
use crate::uploads::{
    self, FormResource, FormSchema, ResourceForm, StoredUpload, UploadField, COVER_IMAGE,
    PROFILE_IMAGE, RESUME,
};

impl FormResource for ProfileInput {
    const SCHEMA: FormSchema = FormSchema {
        files: &[PROFILE_IMAGE, COVER_IMAGE, RESUME],
        json: &["socialLinks", "experience", "education", "seoKeywords"],
        bools: &["isActive"],
        numbers: &[],
    };
}

/// The single site-owner profile and its experience and education lists.
pub struct ProfileService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl ProfileService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            objects: state.objects.clone(),
        }
    }

    /// Never fails for lack of a profile: the placeholder is persisted on
    /// first read.
    pub async fn get(&self) -> Result<Profile, ApiError> {
        Ok(self.store.get_or_create_profile(Profile::placeholder()).await?)
    }

    pub async fn update(&self, form: ResourceForm<ProfileInput>) -> Result<Profile, ApiError> {
        let existing = self.get().await?;
        let mut profile = existing.clone();
        profile.apply(form.input)?;

        let stored = uploads::store_all(self.objects.as_ref(), form.files).await?;
        let mut replaced = Vec::new();
        for (field, slot) in [
            (PROFILE_IMAGE, &mut profile.profile_image),
            (COVER_IMAGE, &mut profile.cover_image),
            (RESUME, &mut profile.resume_url),
        ] {
            if let Some(old) = swap_in(&stored, &field, slot) {
                replaced.push(old);
            }
        }

        let saved = match self.store.save_profile(&profile).await {
            Ok(saved) => saved,
            Err(e) => {
                uploads::reclaim(self.objects.as_ref(), stored.into_iter().map(|s| s.url)).await;
                return Err(e.into());
            }
        };

        uploads::reclaim(self.objects.as_ref(), replaced).await;
        info!("Updated profile");
        Ok(saved)
    }

    pub async fn add_experience(&self, input: ExperienceInput) -> Result<Profile, ApiError> {
        let mut profile = self.get().await?;
        let mut entry = Experience::create(input)?;
        entry.id = Uuid::new_v4();
        profile.experience.push(entry);
        self.save(profile).await
    }

    pub async fn update_experience(&self, id: Uuid, input: ExperienceInput) -> Result<Profile, ApiError> {
        let mut profile = self.get().await?;
        profile
            .experience_mut(id)
            .ok_or_else(|| ApiError::not_found("Experience not found"))?
            .apply(input)?;
        self.save(profile).await
    }

    pub async fn delete_experience(&self, id: Uuid) -> Result<Profile, ApiError> {
        let mut profile = self.get().await?;
        if !profile.remove_experience(id) {
            return Err(ApiError::not_found("Experience not found"));
        }
        self.save(profile).await
    }

    pub async fn add_education(&self, input: EducationInput) -> Result<Profile, ApiError> {
        let mut profile = self.get().await?;
        let mut entry = Education::create(input)?;
        entry.id = Uuid::new_v4();
        profile.education.push(entry);
        self.save(profile).await
    }

    pub async fn update_education(&self, id: Uuid, input: EducationInput) -> Result<Profile, ApiError> {
        let mut profile = self.get().await?;
        profile
            .education_mut(id)
            .ok_or_else(|| ApiError::not_found("Education not found"))?
            .apply(input)?;
        self.save(profile).await
    }

    pub async fn delete_education(&self, id: Uuid) -> Result<Profile, ApiError> {
        let mut profile = self.get().await?;
        if !profile.remove_education(id) {
            return Err(ApiError::not_found("Education not found"));
        }
        self.save(profile).await
    }

    async fn save(&self, mut profile: Profile) -> Result<Profile, ApiError> {
        profile.updated_at = chrono::Utc::now();
        Ok(self.store.save_profile(&profile).await?)
    }
}

/// Points `slot` at the upload for `field`, returning the URL it replaced.
fn swap_in(stored: &[StoredUpload], field: &UploadField, slot: &mut String) -> Option<String> {
    let url = uploads::url_for(stored, field)?;
    let old = std::mem::replace(slot, url.to_string());
    (!old.is_empty() && old != *slot).then_some(old)
}
