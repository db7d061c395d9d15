//! Query-string parsing for the list endpoints.
//!
//! Values arrive as raw strings and are read leniently: unparseable numbers
//! fall back to defaults, boolean filters only engage on the literal `true`.

use serde::Deserialize;

use crate::database::models::ProjectStatus;
use crate::database::{MessageFilter, PageRequest, ProjectFilter, SkillFilter};
use crate::error::ApiError;
use crate::middleware::Viewer;

pub const DEFAULT_MESSAGE_PAGE_SIZE: u32 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub status: Option<String>,
    pub featured: Option<String>,
    pub category: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillListQuery {
    pub category: Option<String>,
    pub is_active: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListQuery {
    pub status: Option<String>,
    pub is_starred: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

fn number(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse().ok())
}

fn flag(raw: Option<&str>) -> bool {
    raw.map(str::trim) == Some("true")
}

fn blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_enum<T: std::str::FromStr>(field: &str, raw: Option<&str>) -> Result<Option<T>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::field_error(field, format!("Invalid {}", field))),
    }
}

/// Builds the project filter for `viewer`.
///
/// Anyone short of a verified admin only ever sees published projects,
/// whatever `status` they ask for. A missing or zero `limit` returns every
/// match.
pub fn project_filter(
    viewer: &Viewer,
    query: &ProjectListQuery,
    max_limit: u32,
) -> Result<ProjectFilter, ApiError> {
    let status = if viewer.is_admin() {
        parse_enum("status", blank(&query.status))?
    } else {
        Some(ProjectStatus::Published)
    };

    let page = match number(query.limit.as_deref()).filter(|limit| *limit > 0) {
        Some(limit) => Some(PageRequest::new(
            number(query.page.as_deref()).unwrap_or(1),
            limit.min(max_limit),
        )),
        None => None,
    };

    Ok(ProjectFilter {
        status,
        featured: flag(query.featured.as_deref()).then_some(true),
        category: parse_enum("category", blank(&query.category))?,
        page,
    })
}

pub fn skill_filter(query: &SkillListQuery) -> Result<SkillFilter, ApiError> {
    Ok(SkillFilter {
        category: parse_enum("category", blank(&query.category))?,
        is_active: blank(&query.is_active).map(|v| v == "true"),
    })
}

pub fn message_filter(query: &MessageListQuery, max_limit: u32) -> Result<MessageFilter, ApiError> {
    let limit = number(query.limit.as_deref())
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_MESSAGE_PAGE_SIZE)
        .min(max_limit);
    Ok(MessageFilter {
        status: parse_enum("status", blank(&query.status))?,
        is_starred: flag(query.is_starred.as_deref()).then_some(true),
        page: PageRequest::new(number(query.page.as_deref()).unwrap_or(1), limit),
    })
}
