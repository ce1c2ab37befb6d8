//! New Task Form Component
//!
//! Title + description draft with an optional image attachment. The selected
//! file's bytes are staged as soon as it is picked, so submission is a single
//! async step. On success the draft and the staged image are cleared; on
//! failure both stay put for retry.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::context::use_app_context;
use crate::models::{StagedImage, TaskDraft};
use crate::sync;

async fn read_staged_image(file: &web_sys::File) -> Option<StagedImage> {
    let buffer = JsFuture::from(file.array_buffer()).await.ok()?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Some(StagedImage {
        file_name: file.name(),
        content_type: file.type_(),
        bytes,
    })
}

#[component]
pub fn NewTaskForm(email: String) -> impl IntoView {
    let ctx = use_app_context();

    let (draft, set_draft) = signal(TaskDraft::default());
    let (staged_image, set_staged_image) = signal(None::<StagedImage>);

    let handle_title_input = move |ev: leptos::ev::Event| {
        let target = ev.target().unwrap();
        let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
        set_draft.update(|draft| draft.title = input.value());
    };

    let handle_description_input = move |ev: leptos::ev::Event| {
        let target = ev.target().unwrap();
        let area = target.dyn_ref::<web_sys::HtmlTextAreaElement>().unwrap();
        set_draft.update(|draft| draft.description = area.value());
    };

    let handle_file_change = move |ev: leptos::ev::Event| {
        let target = ev.target().unwrap();
        let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            set_staged_image.set(None);
            return;
        };
        spawn_local(async move {
            match read_staged_image(&file).await {
                Some(image) => set_staged_image.set(Some(image)),
                None => {
                    web_sys::console::error_1(&"Error reading selected image".into());
                    set_staged_image.set(None);
                }
            }
        });
    };

    let submit_backend = ctx.backend();
    let submit_email = email.clone();
    let handle_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let backend = submit_backend.clone();
        let email = submit_email.clone();
        let current = draft.get();
        if current.is_empty() {
            return;
        }
        let image = staged_image.get();
        spawn_local(async move {
            if sync::create_task(&backend, &current, &email, image).await {
                set_draft.set(TaskDraft::default());
                set_staged_image.set(None);
            }
        });
    };

    view! {
        <form class="new-task-form" on:submit=handle_submit>
            <input
                type="text"
                placeholder="Task title"
                prop:value=move || draft.get().title
                on:input=handle_title_input
            />
            <textarea
                placeholder="Task description"
                prop:value=move || draft.get().description
                on:input=handle_description_input
            ></textarea>
            <input type="file" accept="image/*" on:change=handle_file_change />
            <button type="submit">"Add Task"</button>
        </form>
    }
}
