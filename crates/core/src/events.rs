use crate::mt5::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Live streams the backend publishes over its subscription endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mt5Stream {
    Positions,
    Orders,
    Account,
}

impl Mt5Stream {
    /// Root field of the subscription operation.
    pub fn field(&self) -> &'static str {
        match self {
            Mt5Stream::Positions => "mt5PositionsUpdates",
            Mt5Stream::Orders => "mt5OrdersUpdates",
            Mt5Stream::Account => "mt5AccountUpdates",
        }
    }
}

impl fmt::Display for Mt5Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mt5Stream::Positions => "positions",
            Mt5Stream::Orders => "orders",
            Mt5Stream::Account => "account",
        };
        f.write_str(name)
    }
}

/// One item delivered by a live subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mt5Event {
    Position(Mt5LivePosition),
    Order(Mt5LiveOrder),
    Account(Mt5AccountInfo),
}
