//! Firestore REST adapter.
//!
//! Reads documents through the public REST API:
//!
//! - **Get**: `GET {base}/projects/{project}/databases/(default)/documents/{collection}/{id}`;
//!   `404` means the document does not exist.
//! - **List**: `GET {base}/projects/{project}/databases/(default)/documents/{collection}`,
//!   following `nextPageToken` until exhausted.
//! - **Auth**: optional web API key sent as the `key` query parameter; reads
//!   are otherwise subject to the project's security rules.
//! - Typed values are decoded into plain JSON (see [`value`]).

pub mod error;
pub mod value;

pub use error::FirestoreError;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use serde_json::{Map, Value};
use sitecfg_core::{Error, Record, RemoteStore, StoredDocument};
use url::Url;

/// Default base URL for the Firestore REST API.
const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Transport-level request timeout; the assembler applies its own deadline on top.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Documents requested per list page.
const PAGE_SIZE: u32 = 300;

/// Firestore adapter configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project: String,
    /// Database id (default: `(default)`).
    pub database: String,
    pub api_key: Option<String>,
    /// Base URL (default: https://firestore.googleapis.com/v1).
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl FirestoreConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            database: "(default)".into(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: "sitecfg/0.1".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreDocument {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Firestore-backed [`RemoteStore`].
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    config: FirestoreConfig,
    documents_root: Url,
}

impl FirestoreStore {
    /// Create a new Firestore adapter with the given configuration.
    pub fn new(config: FirestoreConfig) -> Result<Self, FirestoreError> {
        if config.project.is_empty() {
            return Err(FirestoreError::InvalidUrl("project must not be empty".into()));
        }

        let documents_root = Url::parse(&format!(
            "{}/projects/{}/databases/{}/documents/",
            config.base_url.trim_end_matches('/'),
            config.project,
            config.database
        ))
        .map_err(|e| FirestoreError::InvalidUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self { http, config, documents_root })
    }

    /// URL of a document or collection path relative to the database root.
    pub fn documents_url(&self, path: &str) -> Result<Url, FirestoreError> {
        self.documents_root
            .join(path.trim_start_matches('/'))
            .map_err(|e| FirestoreError::InvalidUrl(e.to_string()))
    }

    async fn get_json(&self, url: Url, query: &[(&str, &str)]) -> Result<Option<Value>, FirestoreError> {
        let start = Instant::now();
        let mut request = self.http.get(url.as_str()).header(header::ACCEPT, "application/json").query(query);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(path = url.path(), status = status.as_u16(), elapsed_ms = start.elapsed().as_millis() as u64, "firestore read");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FirestoreError::PermissionDenied { status: status.as_u16() });
        }
        if !status.is_success() {
            return Err(FirestoreError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map(Some).map_err(|e| FirestoreError::Parse(e.to_string()))
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, FirestoreError> {
    serde_json::from_value(value).map_err(|e| FirestoreError::Parse(e.to_string()))
}

#[async_trait]
impl RemoteStore for FirestoreStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Record>, Error> {
        let url = self.documents_url(&format!("{collection}/{id}"))?;
        let Some(body) = self.get_json(url, &[]).await? else {
            return Ok(None);
        };

        let doc: FirestoreDocument = parse(body)?;
        Ok(Some(value::decode_fields(&doc.fields)?))
    }

    async fn get_collection(&self, collection: &str) -> Result<Vec<StoredDocument>, Error> {
        let url = self.documents_url(collection)?;
        let page_size = PAGE_SIZE.to_string();
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", page_size.as_str())];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let Some(body) = self.get_json(url.clone(), &query).await? else {
                break;
            };
            let page: ListDocumentsResponse = parse(body)?;

            for doc in &page.documents {
                documents.push(StoredDocument { id: doc.id().to_string(), data: value::decode_fields(&doc.fields)? });
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(collection, count = documents.len(), "firestore collection scan");
        Ok(documents)
    }
}
