//! Document text extraction behind a pluggable trait.
//!
//! Default: `RemoteTextExtractor` (external parse service) with
//! `LocalExtractor` as fallback when the service fails.
//! Without `PDF_PARSE_URL` only the local extractor is used.
//!
//! `AppState` holds an `Arc<dyn TextExtractor>`, chosen at startup via config.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod handlers;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse service failed: {0}")]
    Remote(String),

    #[error("local extraction failed: {0}")]
    Local(String),

    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("no text could be extracted; the file may be a scanned image")]
    Empty,
}

impl ExtractionError {
    /// Errors caused by the uploaded file rather than by a backend.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, ExtractionError::Empty | ExtractionError::Unsupported(_))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file_name: &str, bytes: Bytes) -> Result<String, ExtractionError>;

    /// Backend label for logs.
    fn name(&self) -> &'static str;
}

/// Extracts text and rejects whitespace-only results.
pub async fn extract_document_text(
    extractor: &dyn TextExtractor,
    file_name: &str,
    bytes: Bytes,
) -> Result<String, ExtractionError> {
    let size = bytes.len();
    let text = extractor.extract(file_name, bytes).await?;
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    debug!(
        file_name,
        size,
        chars = text.chars().count(),
        backend = extractor.name(),
        "document text extracted"
    );
    Ok(text)
}

/// Picks the extractor stack for the configured environment.
pub fn build_extractor(config: &Config) -> Result<Arc<dyn TextExtractor>, ExtractionError> {
    let local = LocalExtractor;
    Ok(match &config.pdf_parse_url {
        Some(url) => Arc::new(FallbackExtractor::new(
            RemoteTextExtractor::new(url.clone())?,
            local,
        )),
        None => Arc::new(local),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// RemoteTextExtractor
// ────────────────────────────────────────────────────────────────────────────

/// Posts the file as multipart `file` to an external parse service that
/// answers `{"success": bool, "data": "...", "error": ...}`.
pub struct RemoteTextExtractor {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RemoteParseResponse {
    #[serde(default)]
    success: bool,
    data: Option<String>,
    error: Option<Value>,
}

impl RemoteParseResponse {
    fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
            None => "service reported failure".to_string(),
        }
    }
}

impl RemoteTextExtractor {
    pub fn new(url: String) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            url,
        })
    }
}

#[async_trait]
impl TextExtractor for RemoteTextExtractor {
    async fn extract(&self, file_name: &str, bytes: Bytes) -> Result<String, ExtractionError> {
        let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        let body: RemoteParseResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Remote(format!("status {status}: {e}")))?;

        if !status.is_success() || !body.success {
            return Err(ExtractionError::Remote(format!(
                "status {status}: {}",
                body.error_message()
            )));
        }

        Ok(body.data.unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LocalExtractor
// ────────────────────────────────────────────────────────────────────────────

/// In-process extraction: PDFs through `pdf-extract`, plain text as-is.
pub struct LocalExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pdf,
    PlainText,
}

fn detect_kind(file_name: &str, bytes: &[u8]) -> Option<FileKind> {
    let lower = file_name.to_ascii_lowercase();
    if bytes.starts_with(b"%PDF") || lower.ends_with(".pdf") {
        Some(FileKind::Pdf)
    } else if [".txt", ".md", ".text"].iter().any(|ext| lower.ends_with(ext)) {
        Some(FileKind::PlainText)
    } else {
        None
    }
}

#[async_trait]
impl TextExtractor for LocalExtractor {
    async fn extract(&self, file_name: &str, bytes: Bytes) -> Result<String, ExtractionError> {
        match detect_kind(file_name, &bytes) {
            Some(FileKind::PlainText) => String::from_utf8(bytes.to_vec())
                .map_err(|_| ExtractionError::Unsupported(format!("{file_name} is not UTF-8 text"))),
            Some(FileKind::Pdf) => tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&bytes)
                    .map_err(|e| ExtractionError::Local(e.to_string()))
            })
            .await
            .map_err(|e| ExtractionError::Local(e.to_string()))?,
            None => Err(ExtractionError::Unsupported(file_name.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FallbackExtractor
// ────────────────────────────────────────────────────────────────────────────

/// Tries `primary`, and on any error hands the same bytes to `fallback`.
pub struct FallbackExtractor<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackExtractor<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P, F> TextExtractor for FallbackExtractor<P, F>
where
    P: TextExtractor,
    F: TextExtractor,
{
    async fn extract(&self, file_name: &str, bytes: Bytes) -> Result<String, ExtractionError> {
        match self.primary.extract(file_name, bytes.clone()).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(
                    "{} extraction failed for {file_name}, falling back to {}: {e}",
                    self.primary.name(),
                    self.fallback.name()
                );
                self.fallback.extract(file_name, bytes).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
