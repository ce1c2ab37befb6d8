//! Minimal Supabase Client
//!
//! Typed access to the four backend surfaces the frontend consumes:
//! - auth: GoTrue session issuance + state-change notifications
//! - postgrest: row-oriented select/insert/update/delete
//! - storage: object upload + public URL issuance
//! - realtime: row-insert change feed over WebSocket
//!
//! Session state lives behind `Arc` so the handle can be stored in reactive
//! state that requires `Send`; only the realtime WebSocket stays thread-local.

use std::sync::Arc;

pub mod auth;
pub mod error;
pub mod postgrest;
pub mod realtime;
pub mod storage;

pub use auth::{AuthClient, AuthEvent, AuthSubscription, Session, User};
pub use error::{ClientError, ClientResult};
pub use postgrest::{Order, QueryBuilder, TableRef};
pub use realtime::{ChangeEvent, RealtimeClient, RealtimeSubscription};
pub use storage::StorageClient;

/// Connection settings for one Supabase project
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    /// Project base URL, no trailing slash
    pub url: String,
    /// Anonymous (publishable) API key
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let mut url = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self { url, anon_key: anon_key.into() }
    }
}

struct ClientInner {
    config: SupabaseConfig,
    http: reqwest::Client,
    auth: AuthClient,
}

/// Handle to one Supabase project, cheap to clone
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<ClientInner>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        let http = reqwest::Client::new();
        let auth = AuthClient::new(config.clone(), http.clone());
        Self { inner: Arc::new(ClientInner { config, http, auth }) }
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.inner.config
    }

    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Start a PostgREST query against `table`
    pub fn from(&self, table: &str) -> TableRef {
        TableRef::new(
            self.inner.config.clone(),
            self.inner.http.clone(),
            self.inner.auth.clone(),
            table,
        )
    }

    pub fn storage(&self) -> StorageClient {
        StorageClient::new(
            self.inner.config.clone(),
            self.inner.http.clone(),
            self.inner.auth.clone(),
        )
    }

    pub fn realtime(&self) -> RealtimeClient {
        RealtimeClient::new(self.inner.config.clone())
    }
}
