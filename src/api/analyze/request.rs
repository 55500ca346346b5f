// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze request parsing

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use tracing::debug;

use crate::api::errors::ApiError;

/// Multipart field that carries the image
pub const FILE_FIELD: &str = "file";

/// Image file extracted from a multipart upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl ImageUpload {
    /// Read the first `file` field from the form
    ///
    /// Other fields are skipped. Returns a validation error when the form has
    /// no `file` field. Content type and file name are not checked.
    pub async fn from_multipart(
        multipart: &mut Multipart,
        max_upload_bytes: usize,
    ) -> Result<Self, ApiError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_upload_bytes))?
        {
            if field.name() != Some(FILE_FIELD) {
                debug!("Skipping multipart field {:?}", field.name());
                continue;
            }

            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, max_upload_bytes))?;

            return Ok(Self {
                bytes,
                file_name,
                content_type,
            });
        }

        Err(missing_file())
    }
}

pub(crate) fn missing_file() -> ApiError {
    ApiError::ValidationError {
        field: FILE_FIELD.to_string(),
        message: "Field required".to_string(),
    }
}

fn multipart_error(err: MultipartError, max_upload_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            limit: max_upload_bytes,
        }
    } else {
        ApiError::InvalidRequest(err.body_text())
    }
}
