// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP plumbing shared by every backend.

use std::time::Duration;

use leadwise_core::LeadwiseError;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// Builds a client with default headers and a whole-request timeout.
pub(crate) fn build_client(
    headers: HeaderMap,
    timeout: Duration,
) -> Result<reqwest::Client, LeadwiseError> {
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| LeadwiseError::Provider {
            message: format!("failed to build HTTP client: {e}"),
            retryable: false,
            source: Some(Box::new(e)),
        })
}

/// 408, 429 and every 5xx are worth retrying.
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Maps a transport failure. Connect errors and timeouts are transient.
pub(crate) fn send_error(provider: &str, err: reqwest::Error) -> LeadwiseError {
    if err.is_timeout() {
        return LeadwiseError::Provider {
            message: format!("{provider} request timed out"),
            retryable: true,
            source: Some(Box::new(err)),
        };
    }
    LeadwiseError::Provider {
        message: format!("{provider} request failed: {err}"),
        retryable: err.is_connect() || err.is_request() || err.is_body(),
        source: Some(Box::new(err)),
    }
}

/// Maps an error status. The body is only used for the message.
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> LeadwiseError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect());
    LeadwiseError::Provider {
        message: format!("{provider} returned {status}: {detail}"),
        retryable: is_transient_status(status),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses() {
        for code in [408, 429, 500, 502, 503, 529] {
            assert!(is_transient_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [400, 401, 403, 404, 422] {
            assert!(!is_transient_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }
}
