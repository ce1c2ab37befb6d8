//! Frontend Models
//!
//! Data structures matching the backend `tasks` table plus client-only drafts.

use serde::{Deserialize, Serialize};

/// Task row as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Insert timestamp (ISO 8601), display ordering key
    pub created_at: String,
    /// E-mail of the creating user
    #[serde(default)]
    pub email: Option<String>,
    /// Public URL of the uploaded image, if any
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Row shape sent on insert (id and created_at are backend-assigned)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTaskRow {
    pub title: String,
    pub description: String,
    pub email: String,
    pub image_url: Option<String>,
}

/// Transient new-task draft, client-only
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
}

impl TaskDraft {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }
}

/// A local file staged for upload alongside a new task
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
