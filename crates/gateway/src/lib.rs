//! GraphQL gateway to the MT5 trading backend.
//!
//! [`GraphQlGateway`] implements [`tradedesk_core::TradingGateway`]: queries
//! and mutations over HTTP, live updates over `graphql-transport-ws`.

pub mod client;
pub mod config;
pub mod operations;
pub mod protocol;
pub mod subscription;

pub use client::{bulk_order_input, GraphQlGateway};
pub use config::GatewayConfig;
