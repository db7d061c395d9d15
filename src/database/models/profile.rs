use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::validation::Validator;

/// Fixed key of the one and only profile record.
pub const PROFILE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub instagram: String,
    pub facebook: String,
    pub youtube: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: Uuid,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceInput {
    #[serde(alias = "_id")]
    pub id: Option<Uuid>,
    pub company: Option<String>,
    pub position: Option<String>,
    #[serde(default, deserialize_with = "super::de::opt_datetime")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::de::opt_datetime")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationInput {
    #[serde(alias = "_id")]
    pub id: Option<Uuid>,
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    #[serde(default, deserialize_with = "super::de::opt_datetime")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::de::opt_datetime")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub about: String,
    pub profile_image: String,
    pub cover_image: String,
    pub social_links: SocialLinks,
    pub resume_url: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub seo_title: String,
    pub seo_description: String,
    pub seo_keywords: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub about: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub experience: Option<Vec<ExperienceInput>>,
    pub education: Option<Vec<EducationInput>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl Experience {
    pub fn create(input: ExperienceInput) -> Result<Self, ApiError> {
        let mut entry = Experience {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            company: String::new(),
            position: String::new(),
            start_date: None,
            end_date: None,
            current: false,
            description: String::new(),
        };
        entry.apply(input)?;
        Ok(entry)
    }

    /// The id is immutable; an `id` in the input is ignored.
    pub fn apply(&mut self, input: ExperienceInput) -> Result<(), ApiError> {
        if let Some(company) = input.company {
            self.company = company.trim().to_string();
        }
        if let Some(position) = input.position {
            self.position = position.trim().to_string();
        }
        if let Some(start) = input.start_date {
            self.start_date = start;
        }
        if let Some(end) = input.end_date {
            self.end_date = end;
        }
        if let Some(current) = input.current {
            self.current = current;
        }
        if let Some(description) = input.description {
            self.description = description;
        }

        let mut v = Validator::new();
        v.required("company", &self.company, "Company name is required")
            .required("position", &self.position, "Position is required");
        v.finish()
    }
}

impl Education {
    pub fn create(input: EducationInput) -> Result<Self, ApiError> {
        let mut entry = Education {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            institution: String::new(),
            degree: String::new(),
            field: String::new(),
            start_date: None,
            end_date: None,
            description: String::new(),
        };
        entry.apply(input)?;
        Ok(entry)
    }

    pub fn apply(&mut self, input: EducationInput) -> Result<(), ApiError> {
        if let Some(institution) = input.institution {
            self.institution = institution.trim().to_string();
        }
        if let Some(degree) = input.degree {
            self.degree = degree.trim().to_string();
        }
        if let Some(field) = input.field {
            self.field = field.trim().to_string();
        }
        if let Some(start) = input.start_date {
            self.start_date = start;
        }
        if let Some(end) = input.end_date {
            self.end_date = end;
        }
        if let Some(description) = input.description {
            self.description = description;
        }

        let mut v = Validator::new();
        v.required("institution", &self.institution, "Institution name is required")
            .required("degree", &self.degree, "Degree is required");
        v.finish()
    }
}

impl Profile {
    /// Placeholder profile synthesized on first read of an empty store.
    pub fn placeholder() -> Self {
        let now = Utc::now();
        Profile {
            id: PROFILE_ID,
            full_name: "Your Name".to_string(),
            title: "Full Stack Developer".to_string(),
            email: "your.email@example.com".to_string(),
            phone: String::new(),
            location: String::new(),
            bio: "Your bio here...".to_string(),
            about: "About yourself here...".to_string(),
            profile_image: String::new(),
            cover_image: String::new(),
            social_links: SocialLinks::default(),
            resume_url: String::new(),
            experience: Vec::new(),
            education: Vec::new(),
            seo_title: String::new(),
            seo_description: String::new(),
            seo_keywords: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: ProfileInput) -> Result<(), ApiError> {
        if let Some(full_name) = input.full_name {
            self.full_name = full_name.trim().to_string();
        }
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(email) = input.email {
            self.email = email.trim().to_lowercase();
        }
        if let Some(phone) = input.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(location) = input.location {
            self.location = location.trim().to_string();
        }
        if let Some(bio) = input.bio {
            self.bio = bio.trim().to_string();
        }
        if let Some(about) = input.about {
            self.about = about.trim().to_string();
        }
        if let Some(links) = input.social_links {
            self.social_links = links;
        }
        // Ids inside a list must stay unique so targeted edits reach one entry.
        if let Some(entries) = input.experience {
            self.experience = entries
                .into_iter()
                .map(Experience::create)
                .collect::<Result<_, _>>()?;
            let mut seen = HashSet::new();
            for entry in &mut self.experience {
                while !seen.insert(entry.id) {
                    entry.id = Uuid::new_v4();
                }
            }
        }
        if let Some(entries) = input.education {
            self.education = entries
                .into_iter()
                .map(Education::create)
                .collect::<Result<_, _>>()?;
            let mut seen = HashSet::new();
            for entry in &mut self.education {
                while !seen.insert(entry.id) {
                    entry.id = Uuid::new_v4();
                }
            }
        }
        if let Some(seo_title) = input.seo_title {
            self.seo_title = seo_title;
        }
        if let Some(seo_description) = input.seo_description {
            self.seo_description = seo_description;
        }
        if let Some(keywords) = input.seo_keywords {
            self.seo_keywords = super::trim_all(keywords);
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }

        let mut v = Validator::new();
        v.required("fullName", &self.full_name, "Full name is required")
            .required("title", &self.title, "Title is required")
            .required("email", &self.email, "Email is required");
        v.finish()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn experience_mut(&mut self, id: Uuid) -> Option<&mut Experience> {
        self.experience.iter_mut().find(|e| e.id == id)
    }

    pub fn education_mut(&mut self, id: Uuid) -> Option<&mut Education> {
        self.education.iter_mut().find(|e| e.id == id)
    }

    /// Returns false when no entry had that id.
    pub fn remove_experience(&mut self, id: Uuid) -> bool {
        let before = self.experience.len();
        self.experience.retain(|e| e.id != id);
        self.experience.len() != before
    }

    pub fn remove_education(&mut self, id: Uuid) -> bool {
        let before = self.education.len();
        self.education.retain(|e| e.id != id);
        self.education.len() != before
    }
}
