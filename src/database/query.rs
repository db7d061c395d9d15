use serde::Serialize;

use super::models::{MessageStatus, ProjectCategory, ProjectStatus, SkillCategory};

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }

    /// Slices an already ordered result set.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub featured: Option<bool>,
    pub category: Option<ProjectCategory>,
    /// `None` returns every match.
    pub page: Option<PageRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct SkillFilter {
    pub category: Option<SkillCategory>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct MessageFilter {
    pub status: Option<MessageStatus>,
    pub is_starred: Option<bool>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub total: u64,
    pub unread: u64,
    pub read: u64,
    pub replied: u64,
    pub archived: u64,
    pub starred: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window() {
        let page = PageRequest::new(2, 3);
        assert_eq!(page.offset(), 3);
        assert_eq!(page.apply((1..=10).collect()), vec![4, 5, 6]);
    }

    #[test]
    fn page_zero_is_first_page() {
        assert_eq!(PageRequest::new(0, 5).offset(), 0);
    }
}
