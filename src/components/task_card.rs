//! Task Card Component
//!
//! One rendered task row: title, description, optional image, and a
//! per-row edit field. The edit draft is keyed by task id in the parent so
//! editing one row never bleeds into another.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::components::DeleteConfirmButton;
use crate::models::Task;

#[component]
pub fn TaskCard(
    task: Task,
    /// Pending edit text for this row (empty when untouched)
    #[prop(into)] pending_edit: Signal<String>,
    /// Fired on every keystroke in the edit field
    #[prop(into)] on_edit: Callback<String>,
    /// Fired when the user commits the pending edit
    #[prop(into)] on_update: Callback<()>,
    /// Fired when the user confirms deletion
    #[prop(into)] on_delete: Callback<()>,
) -> impl IntoView {
    view! {
        <section class="task-card">
            <div class="task-title">{task.title.clone()}</div>
            <div class="task-description">{task.description.clone()}</div>
            <textarea
                placeholder="Updated description"
                prop:value=move || pending_edit.get()
                on:input=move |ev| {
                    let target = ev.target().unwrap();
                    let area = target.dyn_ref::<web_sys::HtmlTextAreaElement>().unwrap();
                    on_edit.run(area.value());
                }
            ></textarea>
            {task.image_url.clone().map(|url| {
                view! {
                    <div class="task-image">
                        <img src=url alt="Task image" width="200" height="200" />
                    </div>
                }
            })}
            <div class="task-actions">
                <button class="edit-btn" on:click=move |_| on_update.run(())>
                    "Edit"
                </button>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
            </div>
        </section>
    }
}
