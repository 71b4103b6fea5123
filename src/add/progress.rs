//! Upload progress tracking
//!
//! Request body parts are streamed in fixed-size chunks; each chunk handed
//! to the transport advances a shared byte counter and fires the caller's
//! progress callback.

use crate::add::types::{ProgressCallback, UploadProgress};
use bytes::Bytes;
use futures::stream::{self, Stream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Size of the chunks a part payload is split into for streaming
pub const PROGRESS_CHUNK_SIZE: usize = 64 * 1024;

/// Shared counter over every part of one request body
pub struct ProgressTracker {
    sent: AtomicU64,
    total: u64,
    callback: ProgressCallback,
}

impl ProgressTracker {
    pub fn new(total: u64, callback: ProgressCallback) -> Arc<Self> {
        Arc::new(Self {
            sent: AtomicU64::new(0),
            total,
            callback,
        })
    }

    /// Record `bytes` more as sent and report the new total
    pub fn advance(&self, bytes: u64) {
        let sent = self.sent.fetch_add(bytes, Ordering::SeqCst) + bytes;
        (self.callback)(UploadProgress::new(sent, Some(self.total)));
    }

    pub fn bytes_sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

/// Split a payload into chunks, advancing `tracker` as each is polled.
///
/// Chunks are slices of `content` and share its buffer.
pub fn tracked_chunks(
    content: Bytes,
    tracker: Option<Arc<ProgressTracker>>,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static {
    let len = content.len();
    let offsets = (0..len).step_by(PROGRESS_CHUNK_SIZE);

    stream::iter(offsets.map(move |start| {
        let end = (start + PROGRESS_CHUNK_SIZE).min(len);
        let chunk = content.slice(start..end);
        if let Some(tracker) = &tracker {
            tracker.advance(chunk.len() as u64);
        }
        Ok(chunk)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_tracked_chunks_report_monotonic_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let callback: ProgressCallback = Arc::new(move |progress: UploadProgress| {
            seen_clone.lock().unwrap().push(progress.bytes_uploaded);
        });

        let content = Bytes::from(vec![7u8; PROGRESS_CHUNK_SIZE * 2 + 10]);
        let tracker = ProgressTracker::new(content.len() as u64, callback);

        let chunks: Vec<_> = tracked_chunks(content, Some(tracker.clone()))
            .collect()
            .await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(tracker.bytes_sent(), (PROGRESS_CHUNK_SIZE * 2 + 10) as u64);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                PROGRESS_CHUNK_SIZE as u64,
                (PROGRESS_CHUNK_SIZE * 2) as u64,
                (PROGRESS_CHUNK_SIZE * 2 + 10) as u64,
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_payload_yields_no_chunks() {
        let chunks: Vec<_> = tracked_chunks(Bytes::new(), None).collect().await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_chunks_share_the_payload_buffer() {
        let content = Bytes::from(vec![3u8; PROGRESS_CHUNK_SIZE + 1]);
        let base = content.as_ptr() as usize;

        let chunks: Vec<Bytes> = tracked_chunks(content.clone(), None)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ptr() as usize, base);
        assert_eq!(chunks[1].as_ptr() as usize, base + PROGRESS_CHUNK_SIZE);
        assert_eq!(chunks[1].len(), 1);
    }
}
