//! Application Context
//!
//! Backend client handle provided via Leptos Context API.

use leptos::prelude::*;
use supabase_lite::SupabaseClient;

use crate::backend::SupabaseTasks;

/// App-wide handles provided via context
#[derive(Clone)]
pub struct AppContext {
    /// Shared Supabase client (auth, rest, storage, realtime)
    pub client: SupabaseClient,
}

impl AppContext {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Task-table backend view over the shared client
    pub fn backend(&self) -> SupabaseTasks {
        SupabaseTasks::new(self.client.clone())
    }
}

/// Get the app context from Leptos context
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
