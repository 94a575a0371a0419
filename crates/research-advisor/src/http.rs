//! HTTP plumbing shared by the source adapters.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Response};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// Longest slice of an error body kept in an error message.
const ERROR_BODY_CHARS: usize = 200;

/// Build a client with the configured user agent and the given timeout.
pub(crate) fn build_client(
    config: &Config,
    timeout: Duration,
    headers: HeaderMap,
) -> ClientResult<Client> {
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(config.connect_timeout)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Map non-2xx statuses to [`ClientError`].
pub(crate) async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        404 => Err(ClientError::not_found(error_body(response).await)),
        400 => Err(ClientError::bad_request(error_body(response).await)),
        500..=599 => Err(ClientError::server(status.as_u16(), error_body(response).await)),
        _ => Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            message: error_body(response).await,
        }),
    }
}

async fn error_body(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    text.chars().take(ERROR_BODY_CHARS).collect()
}
