use serde::{Deserialize, Serialize};

/// Connection settings for the GraphQL backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Endpoint for queries and mutations.
    pub http_url: String,
    /// Endpoint for subscriptions.
    pub ws_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Sent as `X-Session-Id` when present.
    pub session_id: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_url: "http://127.0.0.1:8000/graphql".to_string(),
            ws_url: "ws://127.0.0.1:8000/graphql".to_string(),
            token: None,
            session_id: None,
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    /// Point both endpoints at `http_url`, deriving the WebSocket URL from it
    /// (`http` becomes `ws`, `https` becomes `wss`).
    pub fn with_endpoint(mut self, http_url: &str) -> Self {
        self.http_url = http_url.to_string();
        self.ws_url = ws_url_for(http_url);
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn bearer(&self) -> Option<String> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }
}

/// WebSocket URL matching an HTTP endpoint.
pub fn ws_url_for(http_url: &str) -> String {
    if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        http_url.to_string()
    }
}
