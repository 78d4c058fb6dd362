use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::extraction::extract_document_text;
use crate::state::AppState;

/// One `file` part of a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A multipart form with one or more `file` parts plus plain text fields.
#[derive(Debug)]
pub struct Upload {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl Upload {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut files = Vec::new();
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                files.push(UploadedFile { file_name, bytes });
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                fields.insert(name, value);
            }
        }

        if files.is_empty() {
            return Err(AppError::Validation(
                "multipart field 'file' is required".to_string(),
            ));
        }

        Ok(Upload { files, fields })
    }

    /// The only file of a single-file form.
    pub fn into_single_file(self) -> Result<UploadedFile, AppError> {
        let count = self.files.len();
        let mut files = self.files.into_iter();
        match (files.next(), count) {
            (Some(file), 1) => file.ensure_not_empty(),
            _ => Err(AppError::Validation(format!(
                "expected exactly one file, got {count}"
            ))),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

impl UploadedFile {
    pub fn ensure_not_empty(self) -> Result<Self, AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::Validation(format!("{} is empty", self.file_name)));
        }
        Ok(self)
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(err.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub file_name: String,
    pub text: String,
    pub chars: usize,
}

/// POST /api/v1/documents/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let file = Upload::read(multipart).await?.into_single_file()?;
    let text = extract_document_text(state.extractor.as_ref(), &file.file_name, file.bytes).await?;

    Ok(Json(ExtractResponse {
        chars: text.chars().count(),
        file_name: file.file_name,
        text,
    }))
}
