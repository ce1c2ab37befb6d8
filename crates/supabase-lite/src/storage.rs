//! Storage (Object) Client
//!
//! Raw-byte uploads into a bucket plus public URL construction.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::auth::AuthClient;
use crate::error::{api_error, ClientError, ClientResult};
use crate::SupabaseConfig;

/// Characters escaped in object path segments
const PATH_ENCODE: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'?').add(b'%');

/// Derive a collision-free object path from a file name
///
/// Two uploads of the same file name at distinct timestamps never collide.
pub fn object_path(file_name: &str, timestamp_ms: u64) -> String {
    format!("{}-{}", file_name, timestamp_ms)
}

/// Current wall-clock time in milliseconds
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

pub struct StorageClient {
    config: SupabaseConfig,
    http: reqwest::Client,
    auth: AuthClient,
}

impl StorageClient {
    pub(crate) fn new(config: SupabaseConfig, http: reqwest::Client, auth: AuthClient) -> Self {
        Self { config, http, auth }
    }

    /// Upload `bytes` to `bucket` at `path`
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ClientResult<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.url,
            bucket,
            utf8_percent_encode(path, PATH_ENCODE)
        );
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.auth.bearer()))
            .header("Content-Type", content_type.to_string())
            .body(bytes)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(())
    }

    /// Public URL for an object in a public bucket (no request issued)
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url,
            bucket,
            utf8_percent_encode(path, PATH_ENCODE)
        )
    }
}
