//! Tasklive Frontend App
//!
//! Root component: holds the current session and switches between the auth
//! form and the task manager based on auth-state notifications.

use leptos::prelude::*;
use leptos::task::spawn_local;
use supabase_lite::{Session, SupabaseClient, SupabaseConfig};

use crate::components::{AuthForm, TaskManager};
use crate::context::AppContext;

/// Connection settings baked in at build time
fn supabase_config() -> SupabaseConfig {
    let url = option_env!("SUPABASE_URL").unwrap_or("http://localhost:54321");
    let anon_key = option_env!("SUPABASE_ANON_KEY").unwrap_or("local-anon-key");
    SupabaseConfig::new(url, anon_key)
}

#[component]
pub fn App() -> impl IntoView {
    let client = SupabaseClient::new(supabase_config());
    let (session, set_session) = signal(None::<Session>);

    provide_context(AppContext::new(client.clone()));

    // Read the cached session once at mount; absence means logged out
    {
        let client = client.clone();
        Effect::new(move |_| {
            set_session.set(client.auth().session());
        });
    }

    // Session changes arrive only through this listener; deregister on
    // teardown so a remount never delivers duplicates.
    let subscription = client.auth().on_auth_state_change(move |_event, session| {
        set_session.set(session);
    });
    on_cleanup(move || subscription.unsubscribe());

    let logout_client = client.clone();
    let logout = move |_| {
        let client = logout_client.clone();
        spawn_local(async move {
            // The SignedOut notification clears the session signal; nothing
            // to set here.
            if let Err(e) = client.auth().sign_out().await {
                web_sys::console::error_1(&format!("Error signing out: {}", e).into());
            }
        });
    };

    view! {
        <div class="app-shell">
            {move || match session.get() {
                Some(session) => view! {
                    <TaskManager session=session />
                    <button class="logout-btn" on:click=logout.clone()>
                        "Log Out"
                    </button>
                }
                .into_any(),
                None => view! { <AuthForm /> }.into_any(),
            }}
        </div>
    }
}
