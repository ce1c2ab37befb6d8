//! Auth (GoTrue) Client
//!
//! Session issuance and revocation plus client-side auth-state notifications.
//! The current session is cached in memory and mirrored to localStorage so a
//! page reload restores the signed-in view.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::{Deserialize, Serialize};

use crate::error::{api_error, ClientError, ClientResult};
use crate::SupabaseConfig;

const STORAGE_KEY: &str = "sb-tasklive-auth";

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Issued session (opaque to the UI beyond `user`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
    pub user: User,
}

/// Auth-state transitions delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

type AuthCallback = Arc<dyn Fn(AuthEvent, Option<Session>) + Send + Sync>;

struct AuthState {
    session: Option<Session>,
    listeners: Vec<(u64, AuthCallback)>,
    next_listener_id: u64,
}

/// Handle returned by [`AuthClient::on_auth_state_change`]
///
/// Dropping the handle does NOT deregister; call `unsubscribe` on teardown.
pub struct AuthSubscription {
    id: u64,
    state: Weak<Mutex<AuthState>>,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {
        if let Some(state) = self.state.upgrade() {
            lock(&state).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[derive(Clone)]
pub struct AuthClient {
    config: SupabaseConfig,
    http: reqwest::Client,
    state: Arc<Mutex<AuthState>>,
}

// The wasm event loop is single-threaded; a poisoned lock can only mean a
// panic mid-update, so recover the data rather than propagate the panic.
fn lock(state: &Mutex<AuthState>) -> MutexGuard<'_, AuthState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl AuthClient {
    pub fn new(config: SupabaseConfig, http: reqwest::Client) -> Self {
        let state = AuthState {
            session: load_persisted(),
            listeners: Vec::new(),
            next_listener_id: 0,
        };
        Self { config, http, state: Arc::new(Mutex::new(state)) }
    }

    /// Currently cached session, `None` = logged out
    pub fn session(&self) -> Option<Session> {
        lock(&self.state).session.clone()
    }

    /// Bearer token for data-plane requests (session token or anon key)
    pub(crate) fn bearer(&self) -> String {
        lock(&self.state)
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    /// Register a listener for auth-state transitions
    pub fn on_auth_state_change<F>(&self, callback: F) -> AuthSubscription
    where
        F: Fn(AuthEvent, Option<Session>) + Send + Sync + 'static,
    {
        let mut state = lock(&self.state);
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.push((id, Arc::new(callback)));
        AuthSubscription { id, state: Arc::downgrade(&self.state) }
    }

    /// Create a new account
    ///
    /// Returns the issued session when the project auto-confirms sign-ups;
    /// `None` when e-mail confirmation is pending.
    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<Option<Session>> {
        let url = format!("{}/auth/v1/signup", self.config.url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let value: serde_json::Value =
            resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
        if value.get("access_token").is_some() {
            let session: Session =
                serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))?;
            self.adopt_session(session.clone());
            Ok(Some(session))
        } else {
            Ok(None)
        }
    }

    /// Exchange email/password for a session
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.config.url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let session: Session =
            resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
        self.adopt_session(session.clone());
        Ok(session)
    }

    /// End the current session
    ///
    /// The local session is cleared and `SignedOut` emitted immediately;
    /// server-side revocation is best-effort and its failure is returned for
    /// the caller to log.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let token = lock(&self.state).session.as_ref().map(|s| s.access_token.clone());
        self.clear_session();
        let Some(token) = token else { return Ok(()) };

        let url = format!("{}/auth/v1/logout", self.config.url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(())
    }

    fn adopt_session(&self, session: Session) {
        lock(&self.state).session = Some(session.clone());
        persist(Some(&session));
        self.emit(AuthEvent::SignedIn, Some(session));
    }

    fn clear_session(&self) {
        lock(&self.state).session = None;
        persist(None);
        self.emit(AuthEvent::SignedOut, None);
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        // Clone callbacks out first: a listener may re-enter the client.
        let listeners: Vec<AuthCallback> =
            lock(&self.state).listeners.iter().map(|(_, cb)| cb.clone()).collect();
        for callback in listeners {
            callback(event, session.clone());
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_persisted() -> Option<Session> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let raw = storage.get_item(STORAGE_KEY).ok()??;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("discarding unreadable persisted session: {}", e);
            None
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_persisted() -> Option<Session> {
    None
}

#[cfg(target_arch = "wasm32")]
fn persist(session: Option<&Session>) {
    let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
        return;
    };
    match session {
        Some(session) => {
            if let Ok(raw) = serde_json::to_string(session) {
                let _ = storage.set_item(STORAGE_KEY, &raw);
            }
        }
        None => {
            let _ = storage.remove_item(STORAGE_KEY);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn persist(_session: Option<&Session>) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> AuthClient {
        AuthClient::new(SupabaseConfig::new("http://localhost:54321", "anon"), reqwest::Client::new())
    }

    fn session_for(email: &str) -> Session {
        Session {
            access_token: "token".into(),
            refresh_token: "refresh".into(),
            expires_in: 3600,
            user: User { id: "u1".into(), email: Some(email.into()) },
        }
    }

    #[test]
    fn starts_logged_out() {
        let client = test_client();
        assert!(client.session().is_none());
        assert_eq!(client.bearer(), "anon");
    }

    #[test]
    fn adopt_updates_session_and_bearer() {
        let client = test_client();
        client.adopt_session(session_for("a@b.c"));
        assert_eq!(client.bearer(), "token");
        assert_eq!(client.session().unwrap().user.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn listeners_observe_sign_in_and_sign_out() {
        let client = test_client();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_inner = seen.clone();
        let _sub = client.on_auth_state_change(move |event, session| {
            seen_inner.lock().unwrap().push((event, session.is_some()));
        });

        client.adopt_session(session_for("a@b.c"));
        client.clear_session();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(AuthEvent::SignedIn, true), (AuthEvent::SignedOut, false)]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let client = test_client();
        let seen = Arc::new(Mutex::new(0u32));
        let seen_inner = seen.clone();
        let sub = client.on_auth_state_change(move |_, _| *seen_inner.lock().unwrap() += 1);

        client.adopt_session(session_for("a@b.c"));
        sub.unsubscribe();
        client.clear_session();

        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn unsubscribe_leaves_other_listeners_registered() {
        let client = test_client();
        let first = Arc::new(Mutex::new(0u32));
        let second = Arc::new(Mutex::new(0u32));
        let first_inner = first.clone();
        let second_inner = second.clone();
        let sub_first = client.on_auth_state_change(move |_, _| *first_inner.lock().unwrap() += 1);
        let _sub_second = client.on_auth_state_change(move |_, _| *second_inner.lock().unwrap() += 1);

        sub_first.unsubscribe();
        client.clear_session();

        assert_eq!(*first.lock().unwrap(), 0);
        assert_eq!(*second.lock().unwrap(), 1);
    }

    #[test]
    fn session_roundtrips_through_json() {
        let session = session_for("a@b.c");
        let raw = serde_json::to_string(&session).unwrap();
        let decoded: Session = serde_json::from_str(&raw).unwrap();
        assert_eq!(decoded, session);
    }
}
