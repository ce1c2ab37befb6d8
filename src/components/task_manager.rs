//! Task Manager Component
//!
//! Owns the in-memory task sequence, the per-row pending edits, and the
//! live insert feed. Loads once at mount; newly created rows become visible
//! only when the feed delivers them.

use std::collections::HashMap;

use leptos::prelude::*;
use leptos::task::spawn_local;

use supabase_lite::{ChangeEvent, Session};

use crate::backend::{TASKS_CHANNEL, TASKS_TABLE};
use crate::components::{NewTaskForm, TaskCard};
use crate::context::use_app_context;
use crate::models::Task;
use crate::{store, sync};

#[component]
pub fn TaskManager(session: Session) -> impl IntoView {
    let ctx = use_app_context();

    let (tasks, set_tasks) = signal(Vec::<Task>::new());
    // Pending edits keyed by task id, so concurrent edits never interfere
    let (pending_edits, set_pending_edits) = signal(HashMap::<i64, String>::new());
    let email = session.user.email.clone().unwrap_or_default();

    // Initial load, once at mount; failure keeps the prior (empty) list
    {
        let backend = ctx.backend();
        Effect::new(move |_| {
            let backend = backend.clone();
            spawn_local(async move {
                if let Some(loaded) = sync::load_tasks(&backend).await {
                    set_tasks.update(|tasks| store::replace_all(tasks, loaded));
                }
            });
        });
    }

    // Live insert feed, one subscription per component lifetime, released
    // on teardown. Duplicate ids are dropped by the merge. The WebSocket
    // handle is not Send, so it is parked in thread-local storage.
    let feed = StoredValue::new_local(None::<supabase_lite::RealtimeSubscription>);
    match ctx.client.realtime().subscribe::<Task, _>(
        TASKS_CHANNEL,
        TASKS_TABLE,
        ChangeEvent::Insert,
        move |task: Task| {
            set_tasks.update(|tasks| store::merge_insert(tasks, task));
        },
    ) {
        Ok(subscription) => {
            feed.set_value(Some(subscription));
            on_cleanup(move || {
                feed.update_value(|sub| {
                    if let Some(sub) = sub.take() {
                        sub.unsubscribe();
                    }
                });
            });
        }
        Err(e) => {
            web_sys::console::error_1(&format!("Error subscribing to task inserts: {}", e).into())
        }
    }

    let update_backend = ctx.backend();
    let handle_update = move |id: i64| {
        let backend = update_backend.clone();
        let description = pending_edits.get().get(&id).cloned().unwrap_or_default();
        spawn_local(async move {
            if sync::update_task(&backend, id, &description).await {
                set_tasks.update(|tasks| store::patch_description(tasks, id, &description));
                set_pending_edits.update(|edits| {
                    edits.remove(&id);
                });
            }
        });
    };

    let delete_backend = ctx.backend();
    let handle_delete = move |id: i64| {
        let backend = delete_backend.clone();
        spawn_local(async move {
            if sync::delete_task(&backend, id).await {
                set_tasks.update(|tasks| store::remove_task(tasks, id));
            }
        });
    };

    view! {
        <div class="task-manager">
            <h1>"Task Manager"</h1>
            <p class="signed-in-as">{format!("Signed in as {}", email)}</p>
            <NewTaskForm email=email.clone() />
            <For
                each=move || tasks.get()
                key=|task| task.id
                children=move |task: Task| {
                    let id = task.id;
                    let pending = Signal::derive(move || {
                        pending_edits.get().get(&id).cloned().unwrap_or_default()
                    });
                    let on_edit = Callback::new(move |value: String| {
                        set_pending_edits.update(|edits| {
                            edits.insert(id, value);
                        });
                    });
                    let on_update = Callback::new({
                        let handle_update = handle_update.clone();
                        move |_| handle_update(id)
                    });
                    let on_delete = Callback::new({
                        let handle_delete = handle_delete.clone();
                        move |_| handle_delete(id)
                    });
                    view! {
                        <TaskCard
                            task=task
                            pending_edit=pending
                            on_edit=on_edit
                            on_update=on_update
                            on_delete=on_delete
                        />
                    }
                }
            />
            <p class="task-count">{move || format!("{} tasks", tasks.get().len())}</p>
        </div>
    }
}
