//! Backend Seam
//!
//! `TaskBackend` abstracts the remote surface the task manager talks to,
//! so the synchronization logic can be exercised against a mock.
//! `SupabaseTasks` is the production implementation.

use async_trait::async_trait;
use supabase_lite::{storage, Order, SupabaseClient};

use crate::models::{NewTaskRow, StagedImage, Task};

/// Table holding task rows
pub const TASKS_TABLE: &str = "tasks";
/// Public bucket for task images
pub const IMAGE_BUCKET: &str = "tasks-images";
/// Realtime channel carrying task inserts
pub const TASKS_CHANNEL: &str = "tasks-channel";

/// Remote operations the task manager depends on
///
/// Futures are `!Send` on wasm, hence `?Send`.
#[async_trait(?Send)]
pub trait TaskBackend {
    /// All tasks, oldest first
    async fn list_tasks(&self) -> Result<Vec<Task>, String>;

    /// Insert one row; the echoed representation is returned
    async fn insert_task(&self, row: &NewTaskRow) -> Result<Task, String>;

    /// Patch exactly the given row's description
    async fn update_description(&self, id: i64, description: &str) -> Result<(), String>;

    /// Delete exactly the given row
    async fn delete_task(&self, id: i64) -> Result<(), String>;

    /// Upload a staged image, returning its public URL
    async fn upload_image(&self, image: &StagedImage) -> Result<String, String>;
}

/// Supabase-backed implementation
#[derive(Clone)]
pub struct SupabaseTasks {
    client: SupabaseClient,
}

impl SupabaseTasks {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl TaskBackend for SupabaseTasks {
    async fn list_tasks(&self) -> Result<Vec<Task>, String> {
        self.client
            .from(TASKS_TABLE)
            .select()
            .order("created_at", Order::Ascending)
            .fetch::<Vec<Task>>()
            .await
            .map_err(|e| e.to_string())
    }

    async fn insert_task(&self, row: &NewTaskRow) -> Result<Task, String> {
        self.client
            .from(TASKS_TABLE)
            .insert(row)
            .map_err(|e| e.to_string())?
            .single()
            .fetch::<Task>()
            .await
            .map_err(|e| e.to_string())
    }

    async fn update_description(&self, id: i64, description: &str) -> Result<(), String> {
        let patch = serde_json::json!({ "description": description });
        self.client
            .from(TASKS_TABLE)
            .update(&patch)
            .map_err(|e| e.to_string())?
            .eq("id", id)
            .execute()
            .await
            .map_err(|e| e.to_string())
    }

    async fn delete_task(&self, id: i64) -> Result<(), String> {
        self.client
            .from(TASKS_TABLE)
            .delete()
            .eq("id", id)
            .execute()
            .await
            .map_err(|e| e.to_string())
    }

    async fn upload_image(&self, image: &StagedImage) -> Result<String, String> {
        let path = storage::object_path(&image.file_name, storage::now_ms());
        let bucket = self.client.storage();
        bucket
            .upload(IMAGE_BUCKET, &path, image.bytes.clone(), &image.content_type)
            .await
            .map_err(|e| e.to_string())?;
        Ok(bucket.public_url(IMAGE_BUCKET, &path))
    }
}
