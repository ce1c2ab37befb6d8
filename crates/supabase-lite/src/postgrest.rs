//! PostgREST Query Builder
//!
//! Row-oriented select/insert/update/delete against `/rest/v1/{table}`.
//! Filters and ordering are encoded as PostgREST query parameters
//! (`order=created_at.asc`, `id=eq.7`).

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthClient;
use crate::error::{api_error, ClientError, ClientResult};
use crate::SupabaseConfig;

/// Characters escaped in query parameter values
const QUERY_ENCODE: &AsciiSet =
    &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'&').add(b'+').add(b'=').add(b'?');

/// Sort direction for [`QueryBuilder::order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    fn suffix(self) -> &'static str {
        match self {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        }
    }
}

/// Entry point for queries against one table
pub struct TableRef {
    config: SupabaseConfig,
    http: reqwest::Client,
    auth: AuthClient,
    table: String,
}

impl TableRef {
    pub(crate) fn new(
        config: SupabaseConfig,
        http: reqwest::Client,
        auth: AuthClient,
        table: &str,
    ) -> Self {
        Self { config, http, auth, table: table.to_string() }
    }

    /// `GET` all columns
    pub fn select(self) -> QueryBuilder {
        self.builder(Method::GET, None, None).param("select", "*")
    }

    /// `POST` one row, asking the server to echo the inserted representation
    pub fn insert<R: Serialize>(self, row: &R) -> ClientResult<QueryBuilder> {
        let body = serde_json::to_string(row).map_err(|e| ClientError::Encode(e.to_string()))?;
        Ok(self.builder(Method::POST, Some(body), Some("return=representation")))
    }

    /// `PATCH` the filtered rows with the given column values
    pub fn update<R: Serialize>(self, patch: &R) -> ClientResult<QueryBuilder> {
        let body = serde_json::to_string(patch).map_err(|e| ClientError::Encode(e.to_string()))?;
        Ok(self.builder(Method::PATCH, Some(body), Some("return=minimal")))
    }

    /// `DELETE` the filtered rows
    pub fn delete(self) -> QueryBuilder {
        self.builder(Method::DELETE, None, Some("return=minimal"))
    }

    fn builder(
        self,
        method: Method,
        body: Option<String>,
        prefer: Option<&'static str>,
    ) -> QueryBuilder {
        QueryBuilder {
            config: self.config,
            http: self.http,
            auth: self.auth,
            table: self.table,
            method,
            params: Vec::new(),
            body,
            prefer,
            single: false,
        }
    }
}

/// One pending table operation; consumed by `fetch` or `execute`
pub struct QueryBuilder {
    config: SupabaseConfig,
    http: reqwest::Client,
    auth: AuthClient,
    table: String,
    method: Method,
    params: Vec<(String, String)>,
    body: Option<String>,
    prefer: Option<&'static str>,
    single: bool,
}

impl QueryBuilder {
    /// Order results by `column`
    pub fn order(self, column: &str, order: Order) -> Self {
        self.param("order", &format!("{}.{}", column, order.suffix()))
    }

    /// Keep only rows where `column` equals `value`
    pub fn eq(self, column: &str, value: impl std::fmt::Display) -> Self {
        let filter = format!("eq.{}", value);
        self.param(column, &filter)
    }

    /// Expect exactly one row back (object instead of array)
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Full request URL with encoded query string
    pub fn request_url(&self) -> String {
        let mut url = format!("{}/rest/v1/{}", self.config.url, self.table);
        if !self.params.is_empty() {
            let query: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", k, utf8_percent_encode(v, QUERY_ENCODE)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    /// Run the query and decode the response body
    pub async fn fetch<T: DeserializeOwned>(self) -> ClientResult<T> {
        let resp = self.send_raw().await?;
        resp.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Run the query, discarding any response body
    pub async fn execute(self) -> ClientResult<()> {
        self.send_raw().await?;
        Ok(())
    }

    async fn send_raw(&self) -> ClientResult<reqwest::Response> {
        let mut req = self
            .http
            .request(self.method.clone(), self.request_url())
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.auth.bearer()));
        if self.single {
            req = req.header("Accept", "application/vnd.pgrst.object+json");
        }
        if let Some(prefer) = self.prefer {
            req = req.header("Prefer", prefer);
        }
        if let Some(body) = &self.body {
            req = req.header("Content-Type", "application/json").body(body.clone());
        }
        let resp = req.send().await.map_err(|e| ClientError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> TableRef {
        let config = SupabaseConfig::new("https://proj.supabase.co", "anon");
        let http = reqwest::Client::new();
        let auth = AuthClient::new(config.clone(), http.clone());
        TableRef::new(config, http, auth, name)
    }

    #[test]
    fn select_with_order_builds_expected_url() {
        let query = table("tasks").select().order("created_at", Order::Ascending);
        assert_eq!(
            query.request_url(),
            "https://proj.supabase.co/rest/v1/tasks?select=*&order=created_at.asc"
        );
    }

    #[test]
    fn descending_order_uses_desc_suffix() {
        let query = table("tasks").select().order("created_at", Order::Descending);
        assert!(query.request_url().ends_with("order=created_at.desc"));
    }

    #[test]
    fn eq_filter_targets_single_id() {
        let query = table("tasks").delete().eq("id", 7);
        assert_eq!(query.request_url(), "https://proj.supabase.co/rest/v1/tasks?id=eq.7");
    }

    #[test]
    fn update_carries_patch_body_and_minimal_prefer() {
        let patch = serde_json::json!({ "description": "urgent" });
        let query = table("tasks").update(&patch).unwrap().eq("id", 7);
        assert_eq!(query.method, Method::PATCH);
        assert_eq!(query.prefer, Some("return=minimal"));
        assert_eq!(query.body.as_deref(), Some(r#"{"description":"urgent"}"#));
    }

    #[test]
    fn insert_requests_representation() {
        let row = serde_json::json!({ "title": "Buy milk" });
        let query = table("tasks").insert(&row).unwrap().single();
        assert_eq!(query.method, Method::POST);
        assert_eq!(query.prefer, Some("return=representation"));
        assert!(query.single);
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let query = table("tasks").select().eq("title", "a&b c");
        assert!(query.request_url().ends_with("title=eq.a%26b%20c"));
    }
}
