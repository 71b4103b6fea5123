use crate::error::{Result, StorageError};
use bytes::Bytes;
use cid::Cid;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// CID version the service should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CidVersion {
    V0,
    V1,
}

impl std::fmt::Display for CidVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CidVersion::V0 => write!(f, "0"),
            CidVersion::V1 => write!(f, "1"),
        }
    }
}

impl TryFrom<u64> for CidVersion {
    type Error = StorageError;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            0 => Ok(CidVersion::V0),
            1 => Ok(CidVersion::V1),
            other => Err(StorageError::invalid_parameter(
                "cid_version",
                format!("CID version must be 0 or 1, got {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadProgress {
    pub bytes_uploaded: u64,
    pub total_bytes: Option<u64>,
    pub percentage: f64,
}

impl UploadProgress {
    pub fn new(bytes_uploaded: u64, total_bytes: Option<u64>) -> Self {
        let percentage = match total_bytes {
            Some(total) if total > 0 => bytes_uploaded as f64 / total as f64,
            _ => 0.0,
        };

        Self {
            bytes_uploaded,
            total_bytes,
            percentage: percentage.min(1.0),
        }
    }

    /// Human-readable amount uploaded so far
    pub fn uploaded_string(&self) -> String {
        bytesize::ByteSize::b(self.bytes_uploaded).to_string()
    }
}

pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Options for an `add` request
///
/// Every field is optional and independent. A field left unset sends
/// nothing to the service, which then applies its own default.
#[derive(Clone, Default)]
pub struct UploadOptions {
    pub chunker: Option<String>,
    pub cid_version: Option<CidVersion>,
    pub experimental_sharding: Option<bool>,
    pub hash_alg: Option<String>,
    /// Compute the identifier without storing the content
    pub only_hash: Option<bool>,
    pub pin: Option<bool>,
    pub raw_leaves: Option<bool>,
    pub shard_split_threshold: Option<bool>,
    pub trickle: Option<bool>,
    pub wrap_with_directory: Option<bool>,
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
    pub on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOptions")
            .field("chunker", &self.chunker)
            .field("cid_version", &self.cid_version)
            .field("experimental_sharding", &self.experimental_sharding)
            .field("hash_alg", &self.hash_alg)
            .field("only_hash", &self.only_hash)
            .field("pin", &self.pin)
            .field("raw_leaves", &self.raw_leaves)
            .field("shard_split_threshold", &self.shard_split_threshold)
            .field("trickle", &self.trickle)
            .field("wrap_with_directory", &self.wrap_with_directory)
            .field("timeout", &self.timeout)
            .field("cancellation", &self.cancellation.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunker<S: Into<String>>(mut self, chunker: S) -> Self {
        self.chunker = Some(chunker.into());
        self
    }

    pub fn cid_version(mut self, version: CidVersion) -> Self {
        self.cid_version = Some(version);
        self
    }

    pub fn experimental_sharding(mut self, enabled: bool) -> Self {
        self.experimental_sharding = Some(enabled);
        self
    }

    pub fn hash_alg<S: Into<String>>(mut self, alg: S) -> Self {
        self.hash_alg = Some(alg.into());
        self
    }

    pub fn only_hash(mut self, only_hash: bool) -> Self {
        self.only_hash = Some(only_hash);
        self
    }

    pub fn pin(mut self, pin: bool) -> Self {
        self.pin = Some(pin);
        self
    }

    pub fn raw_leaves(mut self, raw_leaves: bool) -> Self {
        self.raw_leaves = Some(raw_leaves);
        self
    }

    pub fn shard_split_threshold(mut self, enabled: bool) -> Self {
        self.shard_split_threshold = Some(enabled);
        self
    }

    pub fn trickle(mut self, trickle: bool) -> Self {
        self.trickle = Some(trickle);
        self
    }

    pub fn wrap_with_directory(mut self, wrap: bool) -> Self {
        self.wrap_with_directory = Some(wrap);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(UploadProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout == Some(Duration::ZERO) {
            return Err(StorageError::invalid_parameter(
                "timeout",
                "Timeout must be greater than 0",
            ));
        }

        if matches!(self.chunker.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err(StorageError::invalid_parameter(
                "chunker",
                "Chunker cannot be empty",
            ));
        }

        if matches!(self.hash_alg.as_deref(), Some(h) if h.trim().is_empty()) {
            return Err(StorageError::invalid_parameter(
                "hash_alg",
                "Hash algorithm cannot be empty",
            ));
        }

        Ok(())
    }
}

/// A file to add: payload, modification time and optional virtual path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub content: Bytes,
    /// Modification time in milliseconds since the Unix epoch
    pub mtime_ms: u64,
    pub path: Option<String>,
}

impl FileInput {
    pub fn new<C: Into<Bytes>>(content: C, mtime_ms: u64) -> Self {
        Self {
            content: content.into(),
            mtime_ms,
            path: None,
        }
    }

    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Read a file from disk, using its file name as the virtual path and
    /// its filesystem modification time as `mtime_ms`
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(StorageError::invalid_parameter(
                "path",
                format!("Not a regular file: {}", path.display()),
            ));
        }

        let modified: chrono::DateTime<chrono::Utc> = metadata.modified()?.into();
        let mtime_ms = u64::try_from(modified.timestamp_millis()).map_err(|_| {
            StorageError::invalid_parameter(
                "path",
                format!("Modification time precedes the epoch: {}", path.display()),
            )
        })?;

        let content = tokio::fs::read(path).await?;

        let mut input = Self::new(content, mtime_ms);
        if let Some(name) = path.file_name() {
            input = input.path(name.to_string_lossy());
        }
        Ok(input)
    }

    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A file the service reports as added
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedFile {
    pub cid: Cid,
    pub path: String,
    pub size: u64,
}

impl AddedFile {
    pub fn new(cid: Cid, path: String, size: u64) -> Self {
        Self { cid, path, size }
    }

    /// Get a human-readable size string
    pub fn size_string(&self) -> String {
        bytesize::ByteSize::b(self.size).to_string()
    }
}
