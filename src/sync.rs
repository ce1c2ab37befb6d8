//! CRUD Orchestration
//!
//! Async operations the TaskManager dispatches against a [`TaskBackend`].
//! Failure policy throughout: log and bail out of the operation; nothing is
//! surfaced to the UI, nothing is retried, no partial state is rolled back.

use crate::backend::TaskBackend;
use crate::models::{NewTaskRow, StagedImage, Task, TaskDraft};

/// Fetch all tasks ordered by creation time
///
/// `None` on failure; the caller keeps its prior (possibly empty) list.
pub async fn load_tasks<B: TaskBackend>(backend: &B) -> Option<Vec<Task>> {
    match backend.list_tasks().await {
        Ok(tasks) => Some(tasks),
        Err(e) => {
            log::error!("error reading tasks: {}", e);
            None
        }
    }
}

/// Create a task from the draft, uploading the staged image first
///
/// An upload failure is logged and the task is created without an image.
/// Returns true when the insert succeeded, at which point the caller resets
/// the draft; the echoed row is discarded — visibility comes from the live
/// feed, not from the insert response.
pub async fn create_task<B: TaskBackend>(
    backend: &B,
    draft: &TaskDraft,
    email: &str,
    image: Option<StagedImage>,
) -> bool {
    let image_url = match image {
        Some(image) => match backend.upload_image(&image).await {
            Ok(url) => Some(url),
            Err(e) => {
                log::error!("error uploading image: {}", e);
                None
            }
        },
        None => None,
    };

    let row = NewTaskRow {
        title: draft.title.clone(),
        description: draft.description.clone(),
        email: email.to_string(),
        image_url,
    };
    match backend.insert_task(&row).await {
        Ok(_) => true,
        Err(e) => {
            log::error!("error adding task: {}", e);
            false
        }
    }
}

/// Patch one row's description remotely
pub async fn update_task<B: TaskBackend>(backend: &B, id: i64, description: &str) -> bool {
    match backend.update_description(id, description).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("error updating task {}: {}", id, e);
            false
        }
    }
}

/// Delete one row remotely
pub async fn delete_task<B: TaskBackend>(backend: &B, id: i64) -> bool {
    match backend.delete_task(id).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("error deleting task {}: {}", id, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store;
    use async_trait::async_trait;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MockBackend {
        rows: RefCell<Vec<Task>>,
        inserted: RefCell<Vec<NewTaskRow>>,
        updates: RefCell<Vec<(i64, String)>>,
        deletes: RefCell<Vec<i64>>,
        fail_list: bool,
        fail_insert: bool,
        fail_update: bool,
        fail_upload: bool,
    }

    #[async_trait(?Send)]
    impl TaskBackend for MockBackend {
        async fn list_tasks(&self) -> Result<Vec<Task>, String> {
            if self.fail_list {
                return Err("list failed".into());
            }
            Ok(self.rows.borrow().clone())
        }

        async fn insert_task(&self, row: &NewTaskRow) -> Result<Task, String> {
            if self.fail_insert {
                return Err("insert failed".into());
            }
            self.inserted.borrow_mut().push(row.clone());
            let id = self.inserted.borrow().len() as i64;
            Ok(Task {
                id,
                title: row.title.clone(),
                description: row.description.clone(),
                created_at: "2026-08-30T12:00:00Z".into(),
                email: Some(row.email.clone()),
                image_url: row.image_url.clone(),
            })
        }

        async fn update_description(&self, id: i64, description: &str) -> Result<(), String> {
            if self.fail_update {
                return Err("update failed".into());
            }
            self.updates.borrow_mut().push((id, description.to_string()));
            Ok(())
        }

        async fn delete_task(&self, id: i64) -> Result<(), String> {
            self.deletes.borrow_mut().push(id);
            Ok(())
        }

        async fn upload_image(&self, image: &StagedImage) -> Result<String, String> {
            if self.fail_upload {
                return Err("upload failed".into());
            }
            Ok(format!("https://cdn.example.com/tasks-images/{}", image.file_name))
        }
    }

    fn row(id: i64, title: &str, description: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            created_at: format!("2026-08-30T00:00:0{}Z", id % 10),
            email: Some("user@example.com".into()),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn loading_empty_table_yields_empty_list() {
        let backend = MockBackend::default();
        let loaded = load_tasks(&backend).await;
        assert_eq!(loaded, Some(Vec::new()));
    }

    #[tokio::test]
    async fn load_failure_keeps_prior_list() {
        let backend = MockBackend { fail_list: true, ..Default::default() };
        let mut tasks = vec![row(1, "kept", "")];
        if let Some(loaded) = load_tasks(&backend).await {
            store::replace_all(&mut tasks, loaded);
        }
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test]
    async fn created_task_becomes_visible_only_via_feed_event() {
        let backend = MockBackend::default();
        let mut tasks: Vec<Task> = Vec::new();
        let mut draft = TaskDraft { title: "Buy milk".into(), description: "2%".into() };

        if create_task(&backend, &draft, "user@example.com", None).await {
            draft = TaskDraft::default();
        }

        // Insert succeeded, draft reset, but the list stays empty until the
        // live feed delivers the row.
        assert!(draft.is_empty());
        assert!(tasks.is_empty());

        let inserted = row(1, "Buy milk", "2%");
        store::merge_insert(&mut tasks, inserted.clone());
        assert_eq!(tasks, vec![inserted]);
    }

    #[tokio::test]
    async fn create_failure_leaves_draft_intact() {
        let backend = MockBackend { fail_insert: true, ..Default::default() };
        let mut draft = TaskDraft { title: "Buy milk".into(), description: "2%".into() };

        if create_task(&backend, &draft, "user@example.com", None).await {
            draft = TaskDraft::default();
        }

        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.description, "2%");
    }

    #[tokio::test]
    async fn upload_failure_creates_task_without_image() {
        let backend = MockBackend { fail_upload: true, ..Default::default() };
        let draft = TaskDraft { title: "Buy milk".into(), description: "2%".into() };
        let image = StagedImage {
            file_name: "milk.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };

        assert!(create_task(&backend, &draft, "user@example.com", Some(image)).await);
        let inserted = backend.inserted.borrow();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].image_url, None);
    }

    #[tokio::test]
    async fn successful_upload_attaches_public_url() {
        let backend = MockBackend::default();
        let draft = TaskDraft { title: "Buy milk".into(), description: "2%".into() };
        let image = StagedImage {
            file_name: "milk.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };

        assert!(create_task(&backend, &draft, "user@example.com", Some(image)).await);
        let inserted = backend.inserted.borrow();
        assert_eq!(
            inserted[0].image_url.as_deref(),
            Some("https://cdn.example.com/tasks-images/milk.png")
        );
        assert_eq!(inserted[0].email, "user@example.com");
    }

    #[tokio::test]
    async fn update_patches_exactly_one_remote_row() {
        let backend = MockBackend::default();
        let mut tasks = vec![row(7, "a", "old"), row(8, "b", "other")];

        if update_task(&backend, 7, "urgent").await {
            store::patch_description(&mut tasks, 7, "urgent");
        }

        assert_eq!(*backend.updates.borrow(), vec![(7, "urgent".to_string())]);
        assert_eq!(tasks[0].description, "urgent");
        assert_eq!(tasks[1].description, "other");
    }

    #[tokio::test]
    async fn update_failure_changes_nothing_locally() {
        let backend = MockBackend { fail_update: true, ..Default::default() };
        let mut tasks = vec![row(7, "a", "old")];

        if update_task(&backend, 7, "urgent").await {
            store::patch_description(&mut tasks, 7, "urgent");
        }

        assert!(backend.updates.borrow().is_empty());
        assert_eq!(tasks[0].description, "old");
    }

    #[tokio::test]
    async fn delete_issues_one_remote_call_and_removes_locally() {
        let backend = MockBackend::default();
        let mut tasks = vec![row(1, "a", ""), row(2, "b", "")];

        if delete_task(&backend, 1).await {
            store::remove_task(&mut tasks, 1);
        }

        assert_eq!(*backend.deletes.borrow(), vec![1]);
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
    }
}
