//! Multi-part request body for the `add` resource
//!
//! Every file becomes one part under the field name `file`, in input order,
//! carrying its modification time in the `mtime` and `mtime-nsecs` part
//! headers.

use crate::add::progress::{tracked_chunks, ProgressTracker};
use crate::add::types::{FileInput, ProgressCallback};
use crate::error::{Result, StorageError};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use std::sync::Arc;

/// Field name every file part is attached under
pub const FILE_FIELD: &str = "file";

pub const MTIME_HEADER: &str = "mtime";
pub const MTIME_NSECS_HEADER: &str = "mtime-nsecs";

/// Build the `mtime` / `mtime-nsecs` header pair for a timestamp in
/// milliseconds since the epoch.
///
/// `mtime` is the whole seconds; `mtime-nsecs` is the sub-second remainder
/// scaled by 1000.
pub fn mtime_headers(mtime_ms: u64) -> [(&'static str, String); 2] {
    let secs = mtime_ms / 1000;
    let nsecs = (mtime_ms - secs * 1000) * 1000;
    [
        (MTIME_HEADER, secs.to_string()),
        (MTIME_NSECS_HEADER, nsecs.to_string()),
    ]
}

/// One file part of the request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPart {
    pub field: &'static str,
    pub file_name: Option<String>,
    pub headers: Vec<(&'static str, String)>,
    pub content: Bytes,
}

/// Ordered parts of an `add` request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddBody {
    parts: Vec<BodyPart>,
}

impl AddBody {
    pub fn assemble(files: &[FileInput]) -> Self {
        let parts = files
            .iter()
            .map(|file| BodyPart {
                field: FILE_FIELD,
                file_name: file.path.clone(),
                headers: mtime_headers(file.mtime_ms).to_vec(),
                content: file.content.clone(),
            })
            .collect();

        Self { parts }
    }

    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total payload bytes across all parts
    pub fn content_length(&self) -> u64 {
        self.parts.iter().map(|p| p.content.len() as u64).sum()
    }

    /// Encode into a multipart form, streaming each payload so the
    /// progress callback, if any, follows what the transport has consumed
    pub fn into_form(self, on_progress: Option<ProgressCallback>) -> Result<Form> {
        let tracker: Option<Arc<ProgressTracker>> =
            on_progress.map(|callback| ProgressTracker::new(self.content_length(), callback));

        let mut form = Form::new();
        for part in self.parts {
            let mut headers = HeaderMap::new();
            for (name, value) in &part.headers {
                let value = HeaderValue::from_str(value).map_err(|e| {
                    StorageError::invalid_parameter(*name, format!("invalid header value: {}", e))
                })?;
                headers.insert(HeaderName::from_static(*name), value);
            }

            let length = part.content.len() as u64;
            let body = reqwest::Body::wrap_stream(tracked_chunks(part.content, tracker.clone()));

            let mut encoded = Part::stream_with_length(body, length)
                .mime_str("application/octet-stream")?
                .headers(headers);
            if let Some(name) = part.file_name {
                encoded = encoded.file_name(name);
            }

            form = form.part(part.field, encoded);
        }

        Ok(form)
    }
}
