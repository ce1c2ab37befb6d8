//! Task List State Helpers
//!
//! Pure reconciliation functions for the in-memory task sequence (oldest
//! first). Every merge path deduplicates by id so a task appears exactly
//! once regardless of how feed events interleave with loads and mutations.

use crate::models::Task;

/// Replace the whole sequence with a freshly loaded one
pub fn replace_all(tasks: &mut Vec<Task>, loaded: Vec<Task>) {
    tasks.clear();
    for task in loaded {
        merge_insert(tasks, task);
    }
}

/// Append a task unless its id is already present
///
/// A feed event for a known id is not an error; the existing row wins.
pub fn merge_insert(tasks: &mut Vec<Task>, task: Task) {
    if tasks.iter().any(|t| t.id == task.id) {
        return;
    }
    tasks.push(task);
}

/// Patch one row's description in place
pub fn patch_description(tasks: &mut [Task], id: i64, description: &str) {
    if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
        task.description = description.to_string();
    }
}

/// Remove a row by id
pub fn remove_task(tasks: &mut Vec<Task>, id: i64) {
    tasks.retain(|t| t.id != id);
}
