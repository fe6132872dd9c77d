//! Records exchanged with the MT5 GraphQL backend.
//!
//! Field names follow the backend's camelCase schema. Inbound decimals accept
//! JSON numbers or strings; outbound inputs are written as JSON numbers since
//! the schema types them as `Float`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Side;

/// MT5 tickets arrive as strings from the server but as integers from some
/// resolvers; normalise to a string.
fn ticket_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ticket {
        Text(String),
        Number(i64),
    }

    Ok(match Ticket::deserialize(deserializer)? {
        Ticket::Text(s) => s,
        Ticket::Number(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Terminal account snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mt5AccountInfo {
    pub login: i64,
    pub server: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub currency: String,
    pub balance: Decimal,
    pub equity: Decimal,
    pub margin: Decimal,
    pub margin_free: Decimal,
    pub leverage: i64,
}

/// Credentials for a direct terminal login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mt5AccountInput {
    pub login: String,
    pub password: String,
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Mt5AccountInput {
    pub const DEFAULT_SERVER: &'static str = "MetaQuotes-Demo";

    pub fn new(login: &str, password: &str) -> Self {
        Self {
            login: login.to_string(),
            password: password.to_string(),
            server: Self::DEFAULT_SERVER.to_string(),
            path: None,
        }
    }
}

/// State of the backend's terminal session for the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mt5Connection {
    pub id: String,
    pub account_login: String,
    pub server: String,
    pub is_connected: bool,
    #[serde(default)]
    pub last_ping: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: String,
}

/// An account whose credentials the backend stores for later reconnects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAccount {
    pub id: String,
    pub login: i64,
    pub server: String,
    #[serde(default)]
    pub path: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub last_connected: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAccountInput {
    pub login: i64,
    pub password: String,
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Partial update; `None` fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountInput {
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// Positions, orders, history
// ---------------------------------------------------------------------------

/// Open terminal position. `kind` is the raw MT5 position type code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mt5LivePosition {
    #[serde(deserialize_with = "ticket_from_any")]
    pub ticket: String,
    pub symbol: String,
    pub volume: Decimal,
    #[serde(rename = "type")]
    pub kind: i32,
    pub price_open: Decimal,
    pub price_current: Decimal,
    pub profit: Decimal,
    #[serde(default)]
    pub magic: i64,
    #[serde(default)]
    pub sl: Decimal,
    #[serde(default)]
    pub tp: Decimal,
}

impl Mt5LivePosition {
    /// MT5 encodes buy positions as 0 and sell positions as 1.
    pub fn side(&self) -> Side {
        if self.kind == 0 {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

/// Working (pending) terminal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mt5LiveOrder {
    #[serde(deserialize_with = "ticket_from_any")]
    pub ticket: String,
    pub symbol: String,
    pub volume_current: Decimal,
    #[serde(rename = "type")]
    pub kind: i32,
    pub price_open: Decimal,
    #[serde(default)]
    pub sl: Decimal,
    #[serde(default)]
    pub tp: Decimal,
    #[serde(default)]
    pub magic: i64,
    #[serde(default)]
    pub state: i32,
}

/// Closed trade from the account history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mt5Trade {
    pub id: String,
    pub symbol: String,
    pub volume: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: Decimal,
    pub profit: Decimal,
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub swap: Decimal,
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub magic: Option<i64>,
    pub open_time: String,
    #[serde(default)]
    pub close_time: Option<String>,
}

impl Mt5Trade {
    pub fn net_profit(&self) -> Decimal {
        self.profit + self.commission + self.swap
    }
}

// ---------------------------------------------------------------------------
// Order placement
// ---------------------------------------------------------------------------

/// A single order sent through `placeOrder`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderInput {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    #[serde(rename = "type")]
    pub side: Side,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sl: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub tp: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic: Option<i64>,
}

impl PlaceOrderInput {
    pub fn new(symbol: &str, side: Side, volume: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            volume,
            side,
            price,
            sl: None,
            tp: None,
            ticket_id: None,
            magic: None,
        }
    }
}

/// The order record the backend returns after `placeOrder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub symbol: String,
    pub volume: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: Decimal,
    #[serde(default)]
    pub sl: Option<Decimal>,
    #[serde(default)]
    pub tp: Option<Decimal>,
    pub status: String,
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub magic: Option<i64>,
    pub created_at: String,
    #[serde(default)]
    pub filled_at: Option<String>,
}

/// One line of a bulk submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkOrderLine {
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: Side,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
}

/// Payload of the `placeBulkOrder` mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkOrderInput {
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: Side,
    pub orders: Vec<BulkOrderLine>,
}

/// Result union shared by the backend's command-style mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationResponse {
    Success {
        message: String,
        #[serde(default)]
        data: Option<String>,
    },
    Error {
        message: String,
        #[serde(default, rename = "errorCode")]
        error_code: Option<String>,
        #[serde(default)]
        details: Option<String>,
    },
}
