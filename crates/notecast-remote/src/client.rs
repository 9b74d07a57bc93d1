//! HTTP client for the remote rendering endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use ureq::Agent;

use notecast_pipeline::JobKind;

use crate::error::RemoteError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// A service that turns formula/widget source into rendered markup.
///
/// Implementations are synchronous; the queue guarantees one call is in
/// flight at a time.
pub trait RenderService: Send {
    fn render(&self, kind: JobKind, source: &str) -> Result<String, RemoteError>;
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    kind: &'a str,
    source: &'a str,
}

#[derive(Deserialize)]
struct RenderResponse {
    #[serde(default)]
    output: Option<String>,
}

/// Authenticated client for the rendering endpoint.
pub struct RemoteClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl RemoteClient {
    /// Create a client for the given endpoint base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: None,
        }
    }

    /// Set the bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        self
    }

    fn kind_name(kind: JobKind) -> &'static str {
        match kind {
            JobKind::MathInline => "math-inline",
            JobKind::MathBlock => "math-block",
            JobKind::Widget => "widget",
        }
    }
}

impl RenderService for RemoteClient {
    fn render(&self, kind: JobKind, source: &str) -> Result<String, RemoteError> {
        let url = format!("{}/render", self.base_url);
        info!(kind = Self::kind_name(kind), "requesting remote render");

        let mut request = self.agent.post(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = request.send_json(RenderRequest {
            kind: Self::kind_name(kind),
            source,
        })?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(RemoteError::HttpResponse {
                status,
                body: error_body,
            });
        }

        let parsed: RenderResponse = body.read_json()?;
        parsed.output.ok_or(RemoteError::EmptyResponse)
    }
}
