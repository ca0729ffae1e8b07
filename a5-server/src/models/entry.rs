//! Entry entity and its relationship references

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{require_min_len, ValidationError};

/// A post in a blog.
///
/// Listing order is `date` descending. On input only the `id` of `blog` and
/// of each tag is read; the store fills in the rest when it loads the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub blog: Option<BlogRef>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

/// The blog an entry belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRef {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

/// A tag attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Entry {
    pub fn new(title: impl Into<String>, content: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            date,
            blog: None,
            tags: Vec::new(),
        }
    }

    /// Attach to a blog by id.
    pub fn in_blog(mut self, blog_id: i64) -> Self {
        self.blog = Some(BlogRef {
            id: blog_id,
            name: None,
            handle: None,
        });
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_min_len("title", &self.title, 1)?;
        require_min_len("content", &self.content, 1)?;
        Ok(())
    }

    pub fn blog_id(&self) -> Option<i64> {
        self.blog.as_ref().map(|b| b.id)
    }

    /// Tag ids, deduplicated, in first-seen order.
    pub fn tag_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            if !ids.contains(&tag.id) {
                ids.push(tag.id);
            }
        }
        ids
    }
}
