//! HTTP plumbing shared by the portal clients.

use std::time::Duration;

use crate::{user_agent::get_user_agent, PortalError};

/// Request timeout for every portal call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds a fresh HTTP client with a browser user agent.
///
/// A new client means a new cookie jar, which is what keeps session-bound
/// portals from leaking state between lookups.
pub(crate) fn build_http_client(accept_invalid_certs: bool) -> Result<reqwest::Client, PortalError> {
    reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(REQUEST_TIMEOUT)
        .cookie_store(true)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            PortalError::Network(e)
        })
}

/// Sends a prepared request and returns the body, failing on non-success statuses.
pub(crate) async fn fetch_text(request: reqwest::RequestBuilder) -> Result<String, PortalError> {
    let resp = request.send().await.map_err(|e| {
        tracing::error!("Failed to reach portal: {}", e);
        PortalError::Network(e)
    })?;

    let status = resp.status();
    let body = resp.text().await.map_err(|e| {
        tracing::error!("Failed to read response body: {}", e);
        PortalError::Network(e)
    })?;

    if !status.is_success() {
        let snippet = truncate_body(&body);
        tracing::error!("Request failed with status {}: {}", status, snippet);
        return Err(PortalError::HttpStatus {
            status: status.as_u16(),
            body: snippet,
        });
    }

    Ok(body)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
