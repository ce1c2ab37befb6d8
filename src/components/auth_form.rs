//! Auth Form Component
//!
//! Email/password sign-in with a sign-up toggle. A successful submit makes
//! no local state change: the session holder's auth listener observes the
//! new session and switches views.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use crate::context::use_app_context;

#[component]
pub fn AuthForm() -> impl IntoView {
    let ctx = use_app_context();

    let (is_sign_up, set_is_sign_up) = signal(false);
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());

    let handle_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let client = ctx.client.clone();
        let email = email.get();
        let password = password.get();
        let sign_up = is_sign_up.get();

        spawn_local(async move {
            let result = if sign_up {
                client.auth().sign_up(&email, &password).await.map(|_| ())
            } else {
                client.auth().sign_in_with_password(&email, &password).await.map(|_| ())
            };
            // Failure leaves the form populated and the mode unchanged.
            if let Err(e) = result {
                let action = if sign_up { "signing up" } else { "signing in" };
                web_sys::console::error_1(&format!("Error {}: {}", action, e).into());
            }
        });
    };

    view! {
        <div class="auth-panel">
            <h1>{move || if is_sign_up.get() { "Sign Up" } else { "Sign In" }}</h1>
            <form class="auth-form" on:submit=handle_submit>
                <input
                    type="email"
                    placeholder="Email"
                    required=true
                    prop:value=move || email.get()
                    on:input=move |ev| {
                        let target = ev.target().unwrap();
                        let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                        set_email.set(input.value());
                    }
                />
                <input
                    type="password"
                    placeholder="Password"
                    required=true
                    prop:value=move || password.get()
                    on:input=move |ev| {
                        let target = ev.target().unwrap();
                        let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                        set_password.set(input.value());
                    }
                />
                <button type="submit">
                    {move || if is_sign_up.get() { "Sign Up" } else { "Log In" }}
                </button>
            </form>
            <button class="mode-toggle" on:click=move |_| set_is_sign_up.update(|v| *v = !*v)>
                {move || {
                    if is_sign_up.get() {
                        "Already have an account? Log In"
                    } else {
                        "Don't have an account? Sign Up"
                    }
                }}
            </button>
        </div>
    }
}
