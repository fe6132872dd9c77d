//! Wire shapes: the GraphQL-over-HTTP envelope and the `graphql-transport-ws`
//! message set.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tradedesk_core::GatewayError;

/// WebSocket subprotocol negotiated for subscriptions.
pub const SUBPROTOCOL: &str = "graphql-transport-ws";

/// Body of a GraphQL request (HTTP POST body and `subscribe` payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
}

/// Result envelope shared by HTTP responses and subscription `next` payloads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

impl GraphQlResponse {
    /// Decode the value of one root field, failing on any reported error.
    pub fn into_field<T: DeserializeOwned>(self, field: &str) -> Result<T, GatewayError> {
        self.into_optional_field(field)?.ok_or_else(|| {
            GatewayError::Decode(format!("field `{}` missing from response", field))
        })
    }

    /// Like `into_field`, but a null or absent field decodes to `None`.
    pub fn into_optional_field<T: DeserializeOwned>(
        self,
        field: &str,
    ) -> Result<Option<T>, GatewayError> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(GatewayError::GraphQl(messages.join("; ")));
        }

        let mut data = self
            .data
            .ok_or_else(|| GatewayError::Decode("response contained no data".to_string()))?;

        match data
            .as_object_mut()
            .and_then(|fields| fields.remove(field))
            .filter(|v| !v.is_null())
        {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| GatewayError::Decode(format!("field `{}`: {}", field, e))),
            None => Ok(None),
        }
    }
}

/// Messages sent from the client to the subscription server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: GraphQlRequest,
    },
    Complete {
        id: String,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

/// Messages received from the subscription server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Next {
        id: String,
        payload: Value,
    },
    Error {
        id: String,
        payload: Value,
    },
    Complete {
        id: String,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}
