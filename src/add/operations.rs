//! Add operations implementation

use crate::add::body::AddBody;
use crate::add::decode::decode_add_response;
use crate::add::params::encode_options;
use crate::add::transport::{send_add, TransportControls};
use crate::add::types::{AddedFile, FileInput, UploadOptions};
use crate::client::StorageClient;
use crate::error::{Result, StorageError};

/// Add a batch of files in one request
///
/// # Arguments
///
/// * `client` - The storage client to send the request with
/// * `files` - Files to add, attached to the request in this order
/// * `options` - Upload options
///
/// # Returns
///
/// One `AddedFile` per identifier-bearing record in the response, in the
/// order the service emitted them. With `wrap_with_directory` this includes
/// the wrapping directory.
///
/// # Errors
///
/// Returns an error if:
/// - The options fail validation
/// - The service answers with a non-success status (`RequestFailed`)
/// - Any response line is malformed, or a record has an invalid size or
///   identifier; no partial results are returned
pub async fn put_all(
    client: &StorageClient,
    files: &[FileInput],
    options: &UploadOptions,
) -> Result<Vec<AddedFile>> {
    options.validate()?;

    let query = encode_options(options);
    let body = AddBody::assemble(files);

    log::debug!(
        "Adding {} file(s), {} bytes total",
        body.len(),
        body.content_length()
    );

    let form = body.into_form(options.on_progress.clone())?;
    let controls = TransportControls {
        timeout: options.timeout.or_else(|| client.default_timeout()),
        cancellation: options.cancellation.clone(),
    };

    let text = send_add(client, &query, form, &controls).await?;
    decode_add_response(&text)
}

/// Add a single file
///
/// Sends a one-element batch and returns the first decoded record.
///
/// # Errors
///
/// Fails exactly as [`put_all`] does, and with `EmptyResponse` if the
/// service returned no identifier-bearing record.
pub async fn put(
    client: &StorageClient,
    file: &FileInput,
    options: &UploadOptions,
) -> Result<AddedFile> {
    put_all(client, std::slice::from_ref(file), options)
        .await?
        .into_iter()
        .next()
        .ok_or(StorageError::EmptyResponse)
}
