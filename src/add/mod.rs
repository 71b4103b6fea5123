//! Add operations for the storage service
//!
//! This module turns files and upload options into a single `add` request
//! and decodes the service's newline-delimited response into typed results.

pub mod body;
pub mod decode;
pub mod operations;
pub mod params;
pub mod progress;
pub mod transport;
pub mod types;

pub use body::{mtime_headers, AddBody, BodyPart};
pub use decode::decode_add_response;
pub use operations::{put, put_all};
pub use params::encode_options;
pub use types::{AddedFile, CidVersion, FileInput, ProgressCallback, UploadOptions, UploadProgress};
