pub mod add;
pub mod client;
pub mod error;

pub use add::{
    decode_add_response, encode_options, mtime_headers, put, put_all, AddBody, AddedFile,
    BodyPart, CidVersion, FileInput, ProgressCallback, UploadOptions, UploadProgress,
};

pub use client::{ClientConfig, StorageClient};

pub use error::{Result, StorageError};

pub use cid::Cid;
pub use tokio_util::sync::CancellationToken;
