//! reqwest client that turns HTTP exchanges into response envelopes

use std::error::Error as _;
use std::time::Duration;

use netbound_config::ApiConfig;
use netbound_resource::ResponseEnvelope;
use netbound_utils::TransportError;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Connect timeout; the orchestrator's watchdog normally fires first.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest server error text carried into an error envelope
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client bound to one API root.
///
/// No retries: each call maps to exactly one envelope.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(api: &ApiConfig) -> Result<Self, TransportError> {
        let base_url = parse_base_url(&api.base_url)?;
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(api.request_timeout())
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST `body` as JSON to `path` (relative to the base URL).
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> ResponseEnvelope<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = match self.base_url.join(path) {
            Ok(url) => url,
            Err(e) => return ResponseEnvelope::error(format!("invalid endpoint '{path}': {e}")),
        };

        debug!(url = %url, "Sending request");
        let response = match self.client.post(url.clone()).json(body).send().await {
            Ok(response) => response,
            Err(e) => {
                let message = error_chain(&e);
                warn!(url = %url, error = %message, "Request failed");
                return ResponseEnvelope::error(message);
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return ResponseEnvelope::error(error_chain(&e)),
        };
        debug!(url = %url, status = status.as_u16(), bytes = text.len(), "Received response");

        envelope_from_parts(status, &text)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    // Without a trailing slash, `join` would replace the last segment.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    Ok(url)
}

/// Map a finished HTTP exchange onto an envelope.
///
/// - 204 or an empty 2xx body → `Empty`
/// - other 2xx → parsed body, or `Error` when it does not parse
/// - anything else → `Error` with the server's message, its text, or the status
pub fn envelope_from_parts<R: DeserializeOwned>(status: StatusCode, text: &str) -> ResponseEnvelope<R> {
    if status.is_success() {
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return ResponseEnvelope::Empty;
        }
        return match serde_json::from_str(text) {
            Ok(body) => ResponseEnvelope::success(body),
            Err(e) => ResponseEnvelope::error(format!("could not parse response: {e}")),
        };
    }

    ResponseEnvelope::error(server_error_message(status, text))
}

fn server_error_message(status: StatusCode, text: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(text) {
        for key in ["error_message", "detail", "message"] {
            if let Some(message) = map.get(key).and_then(serde_json::Value::as_str)
                && !message.trim().is_empty()
            {
                return message.to_string();
            }
        }
    }

    let text = text.trim();
    if text.is_empty() {
        return status.to_string();
    }
    if text.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        return format!("{status}: {truncated}...");
    }
    format!("{status}: {text}")
}

/// Display an error together with its sources.
///
/// The root cause usually names the connectivity failure, which is what
/// the orchestrator classifies on.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
