//! Multipart image extraction shared by both analysis endpoints

use axum::{
    body::Bytes,
    extract::{
        Multipart,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use verisnap_core::{IMAGE_FIELD, image_mime_type};

use crate::runtime::error::{RequestId, RuntimeError, RuntimeResult};

/// The `image` part of an upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    /// Declared content type, if the client sent one
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// MIME type to hand to the provider; non-image types fall back to JPEG.
    pub fn mime_type(&self) -> &str {
        image_mime_type(self.content_type.as_deref())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Extract the `image` field.
///
/// A body that is not multipart at all, a body without an `image` field and an
/// empty `image` field all count as a missing image. With `max_bytes` set, the
/// field is measured in full and rejected when larger. A body cut off by the
/// `body_limit` is reported as too large as well, against `max_bytes` when set.
pub async fn read_image(
    multipart: Result<Multipart, MultipartRejection>,
    max_bytes: Option<usize>,
    body_limit: usize,
    request_id: &RequestId,
) -> RuntimeResult<UploadedImage> {
    let reported_limit = max_bytes.unwrap_or(body_limit);

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(%request_id, %rejection, "Request is not a multipart upload");
            return Err(RuntimeError::missing_image(request_id.clone()));
        }
    };

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, reported_limit, request_id))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);

        let mut buffer = Vec::new();
        let mut size = 0usize;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, reported_limit, request_id))?
        {
            size += chunk.len();
            match max_bytes {
                Some(limit) if size > limit => buffer.clear(),
                _ => buffer.extend_from_slice(&chunk),
            }
        }

        if let Some(limit) = max_bytes.filter(|limit| size > *limit) {
            return Err(RuntimeError::image_too_large(
                Some(size),
                limit,
                request_id.clone(),
            ));
        }
        if size == 0 {
            return Err(RuntimeError::missing_image(request_id.clone()));
        }

        return Ok(UploadedImage {
            file_name,
            content_type,
            bytes: Bytes::from(buffer),
        });
    }

    Err(RuntimeError::missing_image(request_id.clone()))
}

fn multipart_error(error: MultipartError, limit: usize, request_id: &RequestId) -> RuntimeError {
    // `DefaultBodyLimit` surfaces here as 413 while streaming.
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RuntimeError::image_too_large(None, limit, request_id.clone())
    } else {
        RuntimeError::invalid_multipart(error.body_text(), request_id.clone())
    }
}
