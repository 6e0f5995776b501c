//! Blob store access.
//!
//! [`BlobStore`] is the seam between the video pipeline and the managed
//! storage provider. [`VercelBlobClient`] talks to the Vercel Blob REST API.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::BlobError;
use crate::models::{Access, BlobPage, BlobRecord, PutBlobResult};

const API_VERSION: &str = "7";

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch one page of blobs whose pathname starts with `prefix`.
    async fn list_page(
        &self,
        prefix: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<BlobPage, BlobError>;

    async fn put(
        &self,
        pathname: &str,
        data: Bytes,
        content_type: &str,
        access: Access,
    ) -> Result<PutBlobResult, BlobError>;

    async fn delete(&self, url: &str) -> Result<(), BlobError>;
}

/// Lazily walk every page under `prefix`, following cursors until the store
/// stops returning one. Calling it again restarts from the first page.
pub fn pages<'a>(
    store: &'a dyn BlobStore,
    prefix: &'a str,
    limit: u32,
) -> impl Stream<Item = Result<BlobPage, BlobError>> + 'a {
    futures::stream::try_unfold(Some(None::<String>), move |next| async move {
        let Some(cursor) = next else {
            return Ok::<_, BlobError>(None);
        };
        let page = store.list_page(prefix, cursor.as_deref(), limit).await?;
        debug!(
            "[blob] page with {} blobs (more: {})",
            page.blobs.len(),
            page.cursor.is_some()
        );
        let following = page.cursor.clone().map(Some);
        Ok(Some((page, following)))
    })
}

/// Collect all blobs under `prefix`. Any page failure fails the whole call.
pub async fn list_all(
    store: &dyn BlobStore,
    prefix: &str,
    limit: u32,
) -> Result<Vec<BlobRecord>, BlobError> {
    pages(store, prefix, limit)
        .try_fold(Vec::new(), |mut blobs, page| async move {
            blobs.extend(page.blobs);
            Ok(blobs)
        })
        .await
}

/// Build the configured store, or `None` when no token is set.
pub fn connect(config: &Config) -> Result<Option<Arc<dyn BlobStore>>, BlobError> {
    match config.blob_token.as_deref() {
        Some(token) => {
            let client: Arc<dyn BlobStore> =
                Arc::new(VercelBlobClient::new(&config.blob_api_url, token)?);
            Ok(Some(client))
        }
        None => Ok(None),
    }
}

#[derive(Clone, Debug)]
pub struct VercelBlobClient {
    client: Client,
    api_url: String,
    token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    blobs: Vec<BlobRecord>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

impl VercelBlobClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, BlobError> {
        let client = Client::builder().timeout(Duration::from_secs(300)).build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BlobError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(BlobError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl BlobStore for VercelBlobClient {
    async fn list_page(
        &self,
        prefix: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<BlobPage, BlobError> {
        let mut query: Vec<(&str, String)> = vec![
            ("prefix", prefix.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response = self
            .request(reqwest::Method::GET, "/")
            .query(&query)
            .send()
            .await?;
        let list: ListResponse = Self::check(response).await?.json().await?;

        Ok(BlobPage {
            blobs: list.blobs,
            cursor: list.cursor.filter(|_| list.has_more),
        })
    }

    async fn put(
        &self,
        pathname: &str,
        data: Bytes,
        content_type: &str,
        access: Access,
    ) -> Result<PutBlobResult, BlobError> {
        let response = self
            .request(reqwest::Method::PUT, "/")
            .query(&[("pathname", pathname)])
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "0")
            .header("x-vercel-blob-access", access.as_str())
            .body(data)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let response = self
            .request(reqwest::Method::POST, "/delete")
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{blob, FakeStore};
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn list_all_follows_cursor_until_absent() {
        let mut store = FakeStore::default();
        store.pages.insert(
            None,
            BlobPage {
                blobs: vec![blob("videos/1. A/a.mp4", 1)],
                cursor: Some("next".to_string()),
            },
        );
        store.pages.insert(
            Some("next".to_string()),
            BlobPage {
                blobs: vec![blob("videos/1. A/b.mp4", 2)],
                cursor: None,
            },
        );

        let blobs = list_all(&store, "videos/", 1000).await.unwrap();

        assert_eq!(blobs.len(), 2);
        assert_eq!(
            *store.calls.lock().unwrap(),
            vec![None, Some("next".to_string())]
        );
    }

    #[tokio::test]
    async fn list_all_aborts_on_failed_page() {
        let mut store = FakeStore::default();
        store.pages.insert(
            None,
            BlobPage {
                blobs: vec![blob("videos/1. A/a.mp4", 1)],
                cursor: Some("next".to_string()),
            },
        );
        store.fail_on = Some(Some("next".to_string()));

        let result = list_all(&store, "videos/", 1000).await;

        assert!(result.is_err());
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test]
    async fn vercel_list_page_sends_query_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prefix".into(), "videos/".into()),
                Matcher::UrlEncoded("limit".into(), "1000".into()),
                Matcher::UrlEncoded("cursor".into(), "abc".into()),
            ]))
            .match_header("authorization", "Bearer secret")
            .match_header("x-api-version", API_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"blobs":[{"url":"https://x/videos/1.%20A/a.mp4","pathname":"videos/1. A/a.mp4","size":42,"uploadedAt":"2024-01-01T00:00:00.000Z"}],"cursor":"def","hasMore":true}"#,
            )
            .create_async()
            .await;

        let client = VercelBlobClient::new(&server.url(), "secret").unwrap();
        let page = client.list_page("videos/", Some("abc"), 1000).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.blobs.len(), 1);
        assert_eq!(page.blobs[0].pathname, "videos/1. A/a.mp4");
        assert_eq!(page.blobs[0].size, 42);
        assert_eq!(page.cursor.as_deref(), Some("def"));
    }

    #[tokio::test]
    async fn vercel_list_page_drops_cursor_without_more() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"blobs":[],"cursor":"stale","hasMore":false}"#)
            .create_async()
            .await;

        let client = VercelBlobClient::new(&server.url(), "secret").unwrap();
        let page = client.list_page("videos/", None, 10).await.unwrap();

        assert!(page.blobs.is_empty());
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn vercel_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let client = VercelBlobClient::new(&server.url(), "bad").unwrap();
        let err = client.list_page("videos/", None, 10).await.unwrap_err();

        match err {
            BlobError::Status { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn vercel_put_and_delete() {
        let mut server = mockito::Server::new_async().await;
        let put = server
            .mock("PUT", "/")
            .match_query(Matcher::UrlEncoded(
                "pathname".into(),
                "videos/1. A/a.mp4".into(),
            ))
            .match_header("x-content-type", "video/mp4")
            .match_header("x-add-random-suffix", "0")
            .match_header("x-vercel-blob-access", "public")
            .match_header("authorization", "Bearer secret")
            .match_body("data")
            .with_status(200)
            .with_body(r#"{"url":"https://x/videos/1.%20A/a.mp4","pathname":"videos/1. A/a.mp4"}"#)
            .create_async()
            .await;
        let delete = server
            .mock("POST", "/delete")
            .match_body(Matcher::Json(
                serde_json::json!({ "urls": ["https://x/videos/1.%20A/a.mp4"] }),
            ))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = VercelBlobClient::new(&server.url(), "secret").unwrap();
        let result = client
            .put(
                "videos/1. A/a.mp4",
                Bytes::from_static(b"data"),
                "video/mp4",
                Access::Public,
            )
            .await
            .unwrap();
        client.delete(&result.url).await.unwrap();

        put.assert_async().await;
        delete.assert_async().await;
        assert_eq!(result.pathname, "videos/1. A/a.mp4");
    }

    #[test]
    fn connect_without_token_yields_none() {
        let config = Config::default();
        assert!(connect(&config).unwrap().is_none());
    }
}
