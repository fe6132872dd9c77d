use crate::auth::*;
use crate::events::*;
use crate::models::*;
use crate::mt5::*;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Gateway Trait
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the trading backend.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("Rejected by server: {message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Subscription error: {0}")]
    Subscription(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Server-side error code, when the backend supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl MutationResponse {
    /// Turn the result union into a `Result`, carrying the server message on
    /// success and a `Rejected` error otherwise.
    pub fn into_result(self) -> Result<String, GatewayError> {
        match self {
            MutationResponse::Success { message, .. } => Ok(message),
            MutationResponse::Error {
                message,
                error_code,
                details,
            } => {
                let message = match details {
                    Some(details) if !details.is_empty() => {
                        format!("{} ({})", message, details)
                    }
                    _ => message,
                };
                Err(GatewayError::Rejected {
                    message,
                    code: error_code,
                })
            }
        }
    }
}

/// The operations the trading console needs from the backend.
#[async_trait]
pub trait TradingGateway: Send + Sync {
    /// Exchange credentials for an access token and refresh token.
    async fn login(&self, credentials: LoginInput) -> Result<AuthSession, GatewayError>;

    /// Trade a refresh token for a new session.
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthSession, GatewayError>;

    /// The user the current bearer token belongs to.
    async fn me(&self) -> Result<User, GatewayError>;

    /// Page through users. Admin only.
    async fn users(&self, limit: u32, offset: u32) -> Result<Vec<User>, GatewayError>;

    /// One user by id, `None` when the backend knows no such user.
    async fn user(&self, id: &str) -> Result<Option<User>, GatewayError>;

    /// Change another user's roles, status or profile. Admin only.
    async fn admin_update_user(
        &self,
        id: &str,
        input: AdminUpdateUserInput,
    ) -> Result<User, GatewayError>;

    /// Connectivity check; returns the server's ping reply.
    async fn ping(&self) -> Result<String, GatewayError>;

    /// Current terminal account snapshot.
    async fn account_info(&self) -> Result<Mt5AccountInfo, GatewayError>;

    /// Open positions as reported by the terminal.
    async fn live_positions(&self) -> Result<Vec<Mt5LivePosition>, GatewayError>;

    /// Working orders as reported by the terminal.
    async fn live_orders(&self) -> Result<Vec<Mt5LiveOrder>, GatewayError>;

    /// Closed trades.
    async fn trading_history(&self) -> Result<Vec<Mt5Trade>, GatewayError>;

    /// Log the backend's terminal into an account.
    async fn connect_account(
        &self,
        account: Mt5AccountInput,
    ) -> Result<Mt5Connection, GatewayError>;

    /// Drop the backend's terminal session.
    async fn disconnect(&self) -> Result<bool, GatewayError>;

    /// Place one order.
    async fn place_order(&self, order: PlaceOrderInput) -> Result<OrderRecord, GatewayError>;

    /// Submit a calculated ladder as one bulk order. Returns the server message.
    async fn place_bulk_order(&self, orders: &[CalculatedOrder]) -> Result<String, GatewayError>;

    /// Close a position by id. Returns the server message.
    async fn close_position(&self, position_id: &str) -> Result<String, GatewayError>;

    async fn saved_accounts(&self) -> Result<Vec<SavedAccount>, GatewayError>;

    async fn save_account(&self, account: SaveAccountInput) -> Result<String, GatewayError>;

    async fn update_saved_account(
        &self,
        account: UpdateAccountInput,
    ) -> Result<String, GatewayError>;

    async fn delete_saved_account(&self, account_id: &str) -> Result<String, GatewayError>;

    async fn connect_saved_account(&self, account_id: &str) -> Result<String, GatewayError>;

    /// Open a live stream. Returns a receiver that yields `Mt5Event` values
    /// until the server completes the stream or the receiver is dropped.
    async fn subscribe(
        &self,
        stream: Mt5Stream,
    ) -> Result<tokio::sync::mpsc::Receiver<Mt5Event>, GatewayError>;
}
