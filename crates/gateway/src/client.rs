use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tradedesk_core::*;

use crate::config::GatewayConfig;
use crate::operations::{self, Operation};
use crate::protocol::{GraphQlRequest, GraphQlResponse};
use crate::subscription;

const SESSION_HEADER: &str = "x-session-id";

/// GraphQL client for the MT5 trading backend.
///
/// Queries and mutations go over HTTP POST; subscriptions open a dedicated
/// WebSocket per stream.
pub struct GraphQlGateway {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl GraphQlGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        if let Some(bearer) = config.bearer() {
            let value = HeaderValue::from_str(&bearer)
                .map_err(|e| GatewayError::Config(format!("Invalid token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(session) = config.session_id.as_deref().filter(|s| !s.is_empty()) {
            let value = HeaderValue::from_str(session)
                .map_err(|e| GatewayError::Config(format!("Invalid session id: {}", e)))?;
            headers.insert(HeaderName::from_static(SESSION_HEADER), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Send one query or mutation and return the response envelope.
    async fn fetch(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> Result<GraphQlResponse, GatewayError> {
        let request = GraphQlRequest {
            query: operation.document.to_string(),
            operation_name: Some(operation.name.to_string()),
            variables,
        };
        debug!(operation = operation.name, "Sending GraphQL request");

        let response = self
            .http
            .post(&self.config.http_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Http(format!("{}: {}", operation.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation = operation.name, %status, "GraphQL request failed");
            return Err(GatewayError::Http(format!(
                "{} returned {}: {}",
                operation.name, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("{}: {}", operation.name, e)))
    }

    /// Run one query or mutation and decode its root field.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> Result<T, GatewayError> {
        self.fetch(operation, variables)
            .await?
            .into_field(operation.field)
    }

    async fn execute_optional<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> Result<Option<T>, GatewayError> {
        self.fetch(operation, variables)
            .await?
            .into_optional_field(operation.field)
    }

    /// Run a mutation that answers with the success/error union.
    async fn command(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> Result<String, GatewayError> {
        let response: MutationResponse = self.execute(operation, variables).await?;
        response.into_result()
    }
}

/// Build the bulk submission payload from a calculated ladder.
///
/// A ladder is always one symbol and one side; anything else is refused
/// before it reaches the backend.
pub fn bulk_order_input(orders: &[CalculatedOrder]) -> Result<BulkOrderInput, GatewayError> {
    let first = orders
        .first()
        .ok_or_else(|| GatewayError::InvalidRequest("No orders to submit".to_string()))?;

    if let Some(odd) = orders
        .iter()
        .find(|o| o.symbol != first.symbol || o.side != first.side)
    {
        return Err(GatewayError::InvalidRequest(format!(
            "Bulk order mixes {} {} with {} {}",
            first.side, first.symbol, odd.side, odd.symbol
        )));
    }

    Ok(BulkOrderInput {
        symbol: first.symbol.clone(),
        side: first.side,
        orders: orders
            .iter()
            .map(|o| BulkOrderLine {
                symbol: o.symbol.clone(),
                side: o.side,
                price: o.price,
                volume: o.volume,
            })
            .collect(),
    })
}

fn to_variable<T: serde::Serialize>(value: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}

#[async_trait]
impl TradingGateway for GraphQlGateway {
    async fn login(&self, credentials: LoginInput) -> Result<AuthSession, GatewayError> {
        info!(email = %credentials.email, "Signing in");
        let variables = json!({ "input": to_variable(&credentials)? });
        let payload: AuthPayload = self.execute(&operations::LOGIN, variables).await?;
        let session = payload.into_session()?;
        if let Some(user) = &session.user {
            info!(user = %user.id, "Signed in");
        }
        Ok(session)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthSession, GatewayError> {
        debug!("Refreshing access token");
        let variables = json!({ "refreshToken": refresh_token });
        let payload: AuthPayload = self.execute(&operations::REFRESH_TOKEN, variables).await?;
        payload.into_session()
    }

    async fn me(&self) -> Result<User, GatewayError> {
        self.execute_optional(&operations::ME, json!({}))
            .await?
            .ok_or_else(|| GatewayError::Rejected {
                message: "Not authenticated".to_string(),
                code: None,
            })
    }

    async fn users(&self, limit: u32, offset: u32) -> Result<Vec<User>, GatewayError> {
        let variables = json!({ "limit": limit, "offset": offset });
        self.execute(&operations::USERS, variables).await
    }

    async fn user(&self, id: &str) -> Result<Option<User>, GatewayError> {
        self.execute_optional(&operations::USER, json!({ "id": id }))
            .await
    }

    async fn admin_update_user(
        &self,
        id: &str,
        input: AdminUpdateUserInput,
    ) -> Result<User, GatewayError> {
        if input.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "Nothing to update".to_string(),
            ));
        }
        info!(user = id, "Updating user");
        let variables = json!({ "id": id, "input": to_variable(&input)? });
        self.execute(&operations::ADMIN_UPDATE_USER, variables).await
    }

    async fn ping(&self) -> Result<String, GatewayError> {
        self.execute(&operations::PING, json!({})).await
    }

    async fn account_info(&self) -> Result<Mt5AccountInfo, GatewayError> {
        self.execute(&operations::ACCOUNT_INFO, json!({})).await
    }

    async fn live_positions(&self) -> Result<Vec<Mt5LivePosition>, GatewayError> {
        self.execute(&operations::POSITIONS_LIVE, json!({})).await
    }

    async fn live_orders(&self) -> Result<Vec<Mt5LiveOrder>, GatewayError> {
        self.execute(&operations::ORDERS, json!({})).await
    }

    async fn trading_history(&self) -> Result<Vec<Mt5Trade>, GatewayError> {
        self.execute(&operations::TRADING_HISTORY, json!({})).await
    }

    async fn connect_account(
        &self,
        account: Mt5AccountInput,
    ) -> Result<Mt5Connection, GatewayError> {
        info!(login = %account.login, server = %account.server, "Connecting MT5 account");
        let variables = json!({ "account": to_variable(&account)? });
        let connection: Mt5Connection =
            self.execute(&operations::CONNECT_MT5, variables).await?;
        if !connection.is_connected {
            let reason = connection
                .error_message
                .unwrap_or_else(|| "terminal refused the login".to_string());
            return Err(GatewayError::Rejected {
                message: reason,
                code: None,
            });
        }
        info!(login = %connection.account_login, "MT5 account connected");
        Ok(connection)
    }

    async fn disconnect(&self) -> Result<bool, GatewayError> {
        info!("Disconnecting MT5 terminal");
        self.execute(&operations::DISCONNECT_MT5, json!({})).await
    }

    async fn place_order(&self, order: PlaceOrderInput) -> Result<OrderRecord, GatewayError> {
        info!(
            symbol = %order.symbol,
            side = %order.side,
            volume = %order.volume,
            price = %order.price,
            "Placing order"
        );
        let variables = json!({ "order": to_variable(&order)? });
        self.execute(&operations::PLACE_ORDER, variables).await
    }

    async fn place_bulk_order(&self, orders: &[CalculatedOrder]) -> Result<String, GatewayError> {
        let input = bulk_order_input(orders)?;
        info!(
            symbol = %input.symbol,
            side = %input.side,
            count = input.orders.len(),
            "Submitting bulk order"
        );
        let variables = json!({ "bulkOrder": to_variable(&input)? });
        let message = self.command(&operations::PLACE_BULK_ORDER, variables).await?;
        info!(%message, "Bulk order accepted");
        Ok(message)
    }

    async fn close_position(&self, position_id: &str) -> Result<String, GatewayError> {
        info!(position = position_id, "Closing position");
        self.command(&operations::CLOSE_POSITION, json!({ "positionId": position_id }))
            .await
    }

    async fn saved_accounts(&self) -> Result<Vec<SavedAccount>, GatewayError> {
        self.execute(&operations::SAVED_ACCOUNTS, json!({})).await
    }

    async fn save_account(&self, account: SaveAccountInput) -> Result<String, GatewayError> {
        info!(login = account.login, server = %account.server, "Saving MT5 account");
        let variables = json!({ "account": to_variable(&account)? });
        self.command(&operations::SAVE_ACCOUNT, variables).await
    }

    async fn update_saved_account(
        &self,
        account: UpdateAccountInput,
    ) -> Result<String, GatewayError> {
        info!(account = %account.account_id, "Updating saved account");
        let variables = json!({ "account": to_variable(&account)? });
        self.command(&operations::UPDATE_SAVED_ACCOUNT, variables).await
    }

    async fn delete_saved_account(&self, account_id: &str) -> Result<String, GatewayError> {
        info!(account = account_id, "Deleting saved account");
        let variables = json!({ "accountId": account_id });
        self.command(&operations::DELETE_SAVED_ACCOUNT, variables).await
    }

    async fn connect_saved_account(&self, account_id: &str) -> Result<String, GatewayError> {
        info!(account = account_id, "Connecting saved account");
        let variables = json!({ "accountId": account_id });
        self.command(&operations::CONNECT_SAVED_ACCOUNT, variables).await
    }

    async fn subscribe(
        &self,
        stream: Mt5Stream,
    ) -> Result<mpsc::Receiver<Mt5Event>, GatewayError> {
        subscription::subscribe(&self.config, stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ladder() -> Vec<CalculatedOrder> {
        [dec!(1.10000), dec!(1.10005), dec!(1.10010)]
            .iter()
            .enumerate()
            .map(|(i, &price)| CalculatedOrder {
                id: format!("bulk_1_{}", i),
                symbol: "EURUSD".to_string(),
                side: Side::Buy,
                price,
                volume: dec!(0.01),
                expected_margin: dec!(11),
            })
            .collect()
    }

    fn gateway_for(server: &MockServer) -> GraphQlGateway {
        let mut config = GatewayConfig::default()
            .with_endpoint(&format!("{}/graphql", server.uri()))
            .with_token("secret");
        config.session_id = Some("session-1".to_string());
        GraphQlGateway::new(config).unwrap()
    }

    #[test]
    fn test_bulk_input_writes_decimals_as_numbers() {
        let input = bulk_order_input(&ladder()).unwrap();
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["symbol"], "EURUSD");
        assert_eq!(value["type"], "BUY");
        assert_eq!(value["orders"].as_array().unwrap().len(), 3);
        let line = &value["orders"][1];
        assert!(line["price"].is_number());
        assert!((line["price"].as_f64().unwrap() - 1.10005).abs() < 1e-12);
        assert!((line["volume"].as_f64().unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_bulk_input_rejects_empty_and_mixed() {
        assert!(matches!(
            bulk_order_input(&[]),
            Err(GatewayError::InvalidRequest(_))
        ));

        let mut mixed = ladder();
        mixed[2].side = Side::Sell;
        assert!(matches!(
            bulk_order_input(&mixed),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_order_success_returns_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer secret"))
            .and(header("x-session-id", "session-1"))
            .and(body_partial_json(json!({
                "operationName": "PlaceBulkOrder",
                "variables": {"bulkOrder": {"symbol": "EURUSD", "type": "BUY"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"placeBulkOrder": {
                    "status": "SUCCESS",
                    "message": "3 orders placed"
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let message = gateway.place_bulk_order(&ladder()).await.unwrap();
        assert_eq!(message, "3 orders placed");
    }

    #[tokio::test]
    async fn test_bulk_order_error_becomes_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"placeBulkOrder": {
                    "status": "ERROR",
                    "message": "Market closed",
                    "errorCode": "MARKET_CLOSED"
                }}
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let err = gateway.place_bulk_order(&ladder()).await.unwrap_err();
        assert_eq!(err.code(), Some("MARKET_CLOSED"));
        assert_eq!(err.to_string(), "Rejected by server: Market closed");
    }

    #[tokio::test]
    async fn test_graphql_errors_are_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"message": "User not authenticated"}]
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        match gateway.account_info().await {
            Err(GatewayError::GraphQl(msg)) => assert_eq!(msg, "User not authenticated"),
            other => panic!("Expected GraphQL error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        match gateway.ping().await {
            Err(GatewayError::Http(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("Expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_live_positions_decode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "Mt5PositionsLive"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"mt5PositionsLive": [{
                    "ticket": 123456,
                    "symbol": "EURUSD",
                    "volume": 0.1,
                    "type": 1,
                    "priceOpen": 1.1,
                    "priceCurrent": 1.099,
                    "profit": 10.0,
                    "magic": 0,
                    "sl": 0,
                    "tp": 0
                }]}
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let positions = gateway.live_positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].ticket, "123456");
        assert_eq!(positions[0].side(), Side::Sell);
        assert_eq!(positions[0].profit, dec!(10));
    }

    #[tokio::test]
    async fn test_close_position_sends_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "ClosePosition",
                "variables": {"positionId": "987"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"closePosition": {
                    "status": "SUCCESS",
                    "message": "Position closed"
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        assert_eq!(gateway.close_position("987").await.unwrap(), "Position closed");
    }

    #[tokio::test]
    async fn test_failed_login_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"connectMt5": {
                    "id": "c1",
                    "accountLogin": "5000",
                    "server": "MetaQuotes-Demo",
                    "isConnected": false,
                    "errorMessage": "Invalid account",
                    "createdAt": "2024-01-01T00:00:00"
                }}
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let err = gateway
            .connect_account(Mt5AccountInput::new("5000", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Rejected by server: Invalid account");
    }

    fn user_json(id: &str, roles: &[&str]) -> Value {
        json!({
            "id": id,
            "email": format!("{}@example.com", id),
            "username": null,
            "displayName": "Desk Operator",
            "roles": roles,
            "status": "active",
            "lastLoginAt": null,
            "createdAt": "2024-05-01T00:00:00.000Z",
            "updatedAt": "2024-05-01T00:00:00.000Z"
        })
    }

    #[tokio::test]
    async fn test_login_returns_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({
                "operationName": "Login",
                "variables": {"input": {"email": "ops@example.com", "password": "hunter2"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"login": {
                    "accessToken": "access-1",
                    "refreshToken": "refresh-1",
                    "user": user_json("ops", &["admin"])
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let session = gateway
            .login(LoginInput {
                email: "ops@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
        let user = session.user.unwrap();
        assert_eq!(user.email, "ops@example.com");
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"login": {"accessToken": null, "refreshToken": null, "user": null}}
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let err = gateway
            .login(LoginInput {
                email: "ops@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_refresh_token_sends_variable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "RefreshToken",
                "variables": {"refreshToken": "refresh-1"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"refreshToken": {"accessToken": "access-2", "refreshToken": "refresh-2"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let session = gateway.refresh_token("refresh-1").await.unwrap();
        assert_eq!(session.access_token, "access-2");
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-2"));
        assert!(session.user.is_none());
    }

    #[tokio::test]
    async fn test_me_uses_bearer_and_null_means_signed_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({"operationName": "Me"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"me": user_json("ops", &["user"])}
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let me = gateway.me().await.unwrap();
        assert_eq!(me.id, "ops");
        assert!(!me.is_admin());

        let signed_out = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"me": null}
            })))
            .mount(&signed_out)
            .await;

        let err = gateway_for(&signed_out).me().await.unwrap_err();
        assert_eq!(err.to_string(), "Rejected by server: Not authenticated");
    }

    #[tokio::test]
    async fn test_user_listing_and_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "GetUsers",
                "variables": {"limit": 20, "offset": 40}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"users": [user_json("a", &["user"]), user_json("b", &["seller"])]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "GetUser",
                "variables": {"id": "missing"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"user": null}
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let users = gateway.users(20, 40).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].roles, vec![UserRole::Seller]);
        assert!(gateway.user("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_admin_update_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "AdminUpdateUser",
                "variables": {"id": "b", "input": {"status": "suspended"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"adminUpdateUser": user_json("b", &["seller"])}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let input = AdminUpdateUserInput {
            status: Some(UserStatus::Suspended),
            ..Default::default()
        };
        assert_eq!(gateway.admin_update_user("b", input).await.unwrap().id, "b");
        assert!(matches!(
            gateway
                .admin_update_user("b", AdminUpdateUserInput::default())
                .await,
            Err(GatewayError::InvalidRequest(_))
        ));
    }
}
