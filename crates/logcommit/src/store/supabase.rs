//! `ArchiveStore` over the Supabase Storage HTTP API.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use super::http::{classify_status, classify_transport, HttpEndpoint};
use super::ArchiveStore;
use crate::error::StoreError;

pub struct SupabaseArchiveStore {
    endpoint: HttpEndpoint,
    bucket: String,
}

impl SupabaseArchiveStore {
    pub fn new(endpoint: HttpEndpoint, bucket: impl Into<String>) -> Self {
        Self {
            endpoint,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `/storage/v1/object/[authenticated/]<bucket>/<key...>`
    fn object_url(&self, authenticated: bool, key: &str) -> Url {
        let mut segments = vec!["storage", "v1", "object"];
        if authenticated {
            segments.push("authenticated");
        }
        segments.push(self.bucket.as_str());
        segments.extend(key.split('/').filter(|s| !s.is_empty()));
        self.endpoint.url(segments)
    }
}

#[async_trait]
impl ArchiveStore for SupabaseArchiveStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let request = self.endpoint.client().head(self.object_url(true, key));
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        // The storage gateway answers 400 instead of 404 for missing objects
        // on some deployments. HEAD responses carry no body.
        match status {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(false),
            _ => Err(classify_status(status, key, "")),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let request = self
            .endpoint
            .client()
            .post(self.object_url(false, key))
            .header("x-upsert", "false")
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(bytes.to_vec());

        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, key, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::time::Duration;

    fn store() -> SupabaseArchiveStore {
        let endpoint = HttpEndpoint::new(
            "https://project.supabase.co",
            SecretString::from("anon".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        SupabaseArchiveStore::new(endpoint, "coding-logs")
    }

    #[test]
    fn test_object_urls() {
        let store = store();
        assert_eq!(
            store.object_url(false, "logs/2026-01-15-JAN 1-10.txt").path(),
            "/storage/v1/object/coding-logs/logs/2026-01-15-JAN%201-10.txt"
        );
        assert_eq!(
            store.object_url(true, "logs/a.txt").path(),
            "/storage/v1/object/authenticated/coding-logs/logs/a.txt"
        );
    }
}
