use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tradedesk_core::RiskLevel;
use tradedesk_gateway::{config::ws_url_for, GatewayConfig};
use tradedesk_risk::RiskThresholds;

/// Settings read from the optional TOML config file.
///
/// ```toml
/// [gateway]
/// http_url = "https://desk.example.com/graphql"
/// token = "..."
///
/// [risk]
/// confirm_at = "HIGH"
///
/// [risk.thresholds]
/// high_margin = "1000"
/// high_order_count = 10
/// medium_margin = "500"
/// medium_order_count = 5
///
/// [auth]
/// refresh_token = "..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub gateway: GatewayConfig,
    pub risk: RiskSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Plans at or above this level need `--yes` before submission.
    pub confirm_at: RiskLevel,
    /// Cut-offs used to classify a plan before submission.
    pub thresholds: RiskThresholds,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            confirm_at: RiskLevel::High,
            thresholds: RiskThresholds::standard(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Refresh token from the last saved sign-in.
    pub refresh_token: Option<String>,
}

/// Connection values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub ws_endpoint: Option<String>,
    pub token: Option<String>,
    pub session_id: Option<String>,
}

impl ConsoleConfig {
    /// Load from `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::parse(&text)
                    .with_context(|| format!("Invalid config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write new session tokens into the config file at `path`, keeping its
    /// other settings. The file is created when missing.
    pub fn store_session(
        path: &Path,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<()> {
        let mut config = if path.exists() {
            Self::load(Some(path))?
        } else {
            Self::default()
        };
        config.gateway.token = Some(access_token.to_string());
        if let Some(refresh) = refresh_token {
            config.auth.refresh_token = Some(refresh.to_string());
        }
        std::fs::write(path, config.to_toml()?)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Apply command-line values on top of the file. A new HTTP endpoint also
    /// moves the WebSocket endpoint unless one is given explicitly.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.gateway.http_url = endpoint.clone();
            self.gateway.ws_url = ws_url_for(endpoint);
        }
        if let Some(ws) = &overrides.ws_endpoint {
            self.gateway.ws_url = ws.clone();
        }
        if let Some(token) = &overrides.token {
            self.gateway.token = Some(token.clone());
        }
        if let Some(session) = &overrides.session_id {
            self.gateway.session_id = Some(session.clone());
        }
    }
}
