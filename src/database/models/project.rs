use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::validation::Validator;

string_enum! {
    pub enum ProjectCategory {
        WebDevelopment => "Web Development",
        MobileApp => "Mobile App",
        DesktopApp => "Desktop App",
        AiMl => "AI/ML",
        DataScience => "Data Science",
        Other => "Other",
    }
}

string_enum! {
    pub enum ProjectStatus {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectImage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub technologies: Vec<String>,
    pub category: ProjectCategory,
    pub images: Vec<ProjectImage>,
    /// Empty when no thumbnail is attached.
    pub thumbnail_image: String,
    pub live_url: String,
    pub github_url: String,
    pub status: ProjectStatus,
    pub featured: bool,
    pub view_count: i64,
    pub publish_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable project fields. Absent fields are left untouched on update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub category: Option<String>,
    pub images: Option<Vec<ProjectImage>>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "super::de::opt_datetime")]
    pub publish_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::de::opt_datetime")]
    pub completion_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub order: Option<i32>,
}

impl Project {
    /// Builds a new record from input, applying schema defaults.
    pub fn create(input: ProjectInput) -> Result<Self, ApiError> {
        let now = Utc::now();
        let mut project = Project {
            id: Uuid::new_v4(),
            title: String::new(),
            short_description: String::new(),
            full_description: String::new(),
            technologies: Vec::new(),
            category: ProjectCategory::WebDevelopment,
            images: Vec::new(),
            thumbnail_image: String::new(),
            live_url: String::new(),
            github_url: String::new(),
            status: ProjectStatus::Draft,
            featured: false,
            view_count: 0,
            publish_date: now,
            completion_date: None,
            tags: Vec::new(),
            order: 0,
            created_at: now,
            updated_at: now,
        };
        project.apply(input)?;
        Ok(project)
    }

    /// Merges input into the record and re-validates the whole document.
    pub fn apply(&mut self, input: ProjectInput) -> Result<(), ApiError> {
        let mut v = Validator::new();

        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(short) = input.short_description {
            self.short_description = short.trim().to_string();
        }
        if let Some(full) = input.full_description {
            self.full_description = full.trim().to_string();
        }
        if let Some(technologies) = input.technologies {
            self.technologies = super::trim_all(technologies);
        }
        if let Some(category) = input.category {
            match category.parse() {
                Ok(c) => self.category = c,
                Err(_) => v.push("category", format!("'{}' is not a valid category", category)),
            }
        }
        if let Some(images) = input.images {
            self.images = images;
        }
        if let Some(live_url) = input.live_url {
            self.live_url = live_url.trim().to_string();
        }
        if let Some(github_url) = input.github_url {
            self.github_url = github_url.trim().to_string();
        }
        if let Some(status) = input.status {
            match status.parse() {
                Ok(s) => self.status = s,
                Err(_) => v.push("status", format!("'{}' is not a valid status", status)),
            }
        }
        if let Some(featured) = input.featured {
            self.featured = featured;
        }
        if let Some(publish_date) = input.publish_date {
            self.publish_date = publish_date.unwrap_or_else(Utc::now);
        }
        if let Some(completion_date) = input.completion_date {
            self.completion_date = completion_date;
        }
        if let Some(tags) = input.tags {
            self.tags = super::trim_all(tags);
        }
        if let Some(order) = input.order {
            self.order = order;
        }

        self.check(&mut v);
        v.finish()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn check(&self, v: &mut Validator) {
        v.required("title", &self.title, "Project title is required")
            .max_len("title", &self.title, 100, "Title cannot exceed 100 characters")
            .required(
                "shortDescription",
                &self.short_description,
                "Short description is required",
            )
            .max_len(
                "shortDescription",
                &self.short_description,
                200,
                "Short description cannot exceed 200 characters",
            )
            .required(
                "fullDescription",
                &self.full_description,
                "Full description is required",
            );
        if self.view_count < 0 {
            v.push("viewCount", "View count cannot be negative");
        }
    }

    /// Uploads this record populated itself. Gallery entries are plain links
    /// and may point at files other records own, so they are never listed.
    pub fn uploaded_urls(&self) -> Vec<String> {
        std::iter::once(self.thumbnail_image.clone())
            .filter(|url| !url.is_empty())
            .collect()
    }
}
