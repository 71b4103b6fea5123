//! The single HTTP exchange behind an `add` call

use crate::client::StorageClient;
use crate::error::{Result, StorageError};
use reqwest::multipart::Form;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resource every upload is posted to
pub const ADD_RESOURCE: &str = "add";

/// Per-call transport controls
#[derive(Debug, Clone, Default)]
pub struct TransportControls {
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

/// POST the form to `add` and return the response body text.
///
/// Fails with `RequestFailed` on a non-success status. No retry is attempted.
pub async fn send_add(
    client: &StorageClient,
    query: &BTreeMap<&'static str, String>,
    form: Form,
    controls: &TransportControls,
) -> Result<String> {
    let url = client.endpoint(ADD_RESOURCE)?;

    let mut request = client.http().post(url).query(query).multipart(form);
    if let Some(timeout) = controls.timeout {
        request = request.timeout(timeout);
    }

    log::debug!(
        "POST {}{} with parameters {:?}",
        client.base_url(),
        ADD_RESOURCE,
        query
    );

    let exchange = async move {
        let response = request
            .send()
            .await
            .map_err(|e| StorageError::from_transport(ADD_RESOURCE, e))?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            log::debug!("add request failed with {}", status);
            return Err(StorageError::request_failed(status.as_u16(), status_text));
        }

        response
            .text()
            .await
            .map_err(|e| StorageError::from_transport(ADD_RESOURCE, e))
    };

    with_cancellation(controls.cancellation.as_ref(), exchange).await
}

/// Race `operation` against the caller's token, if any
async fn with_cancellation<F, T>(token: Option<&CancellationToken>, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match token {
        Some(token) => {
            tokio::select! {
                _ = token.cancelled() => Err(StorageError::cancelled(ADD_RESOURCE)),
                result = operation => result,
            }
        }
        None => operation.await,
    }
}
