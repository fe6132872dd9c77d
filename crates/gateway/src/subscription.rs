//! Live streams over `graphql-transport-ws`.
//!
//! Each call to [`subscribe`] opens its own socket, performs the
//! `connection_init`/`connection_ack` handshake, registers one subscription
//! and spawns a pump task that forwards decoded events into a bounded
//! channel. Dropping the receiver ends the subscription.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use tradedesk_core::*;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::operations::subscription_for;
use crate::protocol::{
    ClientMessage, GraphQlRequest, GraphQlResponse, ServerMessage, SUBPROTOCOL,
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Events buffered per subscription before the pump waits on the consumer.
pub const CHANNEL_CAPACITY: usize = 1024;

/// Open `stream` and return the receiving end of its event channel.
pub async fn subscribe(
    config: &GatewayConfig,
    stream: Mt5Stream,
) -> Result<mpsc::Receiver<Mt5Event>, GatewayError> {
    let mut request = config
        .ws_url
        .as_str()
        .into_client_request()
        .map_err(|e| {
            GatewayError::Config(format!("Invalid WebSocket URL {}: {}", config.ws_url, e))
        })?;

    let headers = request.headers_mut();
    headers.insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));
    let bearer = config.bearer();
    if let Some(bearer) = bearer.as_deref() {
        let value = HeaderValue::from_str(bearer)
            .map_err(|e| GatewayError::Config(format!("Invalid token: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
    }

    let (mut socket, _) = connect_async(request).await.map_err(|e| {
        GatewayError::Subscription(format!("Connect to {} failed: {}", config.ws_url, e))
    })?;

    let init_payload = bearer.map(|b| json!({ "Authorization": b }));
    send(&mut socket, &ClientMessage::ConnectionInit { payload: init_payload }).await?;

    let ack_timeout = Duration::from_secs(config.timeout_secs);
    tokio::time::timeout(ack_timeout, await_ack(&mut socket))
        .await
        .map_err(|_| {
            GatewayError::Subscription("Timed out waiting for connection_ack".to_string())
        })??;

    let operation = subscription_for(stream);
    let id = Uuid::new_v4().to_string();
    send(
        &mut socket,
        &ClientMessage::Subscribe {
            id: id.clone(),
            payload: GraphQlRequest {
                query: operation.document.to_string(),
                operation_name: Some(operation.name.to_string()),
                variables: json!({}),
            },
        },
    )
    .await?;

    info!(%stream, id = %id, "Subscribed to live updates");

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(pump(socket, id, stream, tx));
    Ok(rx)
}

async fn send(socket: &mut Socket, message: &ClientMessage) -> Result<(), GatewayError> {
    let text = serde_json::to_string(message)
        .map_err(|e| GatewayError::Subscription(format!("Serialization error: {}", e)))?;
    socket
        .send(Message::Text(text))
        .await
        .map_err(|e| GatewayError::Subscription(format!("Write error: {}", e)))
}

async fn await_ack(socket: &mut Socket) -> Result<(), GatewayError> {
    while let Some(frame) = socket.next().await {
        let frame = frame.map_err(|e| GatewayError::Subscription(format!("Read error: {}", e)))?;
        match frame {
            Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::ConnectionAck { .. }) => return Ok(()),
                Ok(ServerMessage::Ping { .. }) => {
                    send(socket, &ClientMessage::Pong { payload: None }).await?;
                }
                Ok(other) => debug!(?other, "Ignoring message before connection_ack"),
                Err(e) => warn!(error = %e, "Unparseable message before connection_ack"),
            },
            Message::Close(frame) => {
                return Err(GatewayError::Subscription(format!(
                    "Server closed the connection during init: {:?}",
                    frame
                )));
            }
            _ => {}
        }
    }
    Err(GatewayError::Subscription(
        "Connection ended before connection_ack".to_string(),
    ))
}

/// Decode a `next` payload into the event type of `stream`.
pub fn decode_event(stream: Mt5Stream, payload: Value) -> Result<Mt5Event, GatewayError> {
    let response: GraphQlResponse = serde_json::from_value(payload)
        .map_err(|e| GatewayError::Decode(format!("{} payload: {}", stream, e)))?;
    let field = stream.field();
    Ok(match stream {
        Mt5Stream::Positions => Mt5Event::Position(response.into_field(field)?),
        Mt5Stream::Orders => Mt5Event::Order(response.into_field(field)?),
        Mt5Stream::Account => Mt5Event::Account(response.into_field(field)?),
    })
}

async fn pump(mut socket: Socket, id: String, stream: Mt5Stream, tx: mpsc::Sender<Mt5Event>) {
    loop {
        tokio::select! {
            _ = tx.closed() => {
                debug!(%stream, "Receiver dropped, completing subscription");
                let _ = send(&mut socket, &ClientMessage::Complete { id: id.clone() }).await;
                let _ = socket.close(None).await;
                break;
            }
            frame = socket.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        info!(%stream, "Subscription socket closed");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(%stream, error = %e, "Subscription socket error");
                        break;
                    }
                };

                match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(ServerMessage::Next { id: got, payload }) if got == id => {
                        match decode_event(stream, payload) {
                            Ok(event) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!(%stream, error = %e, "Dropping undecodable update"),
                        }
                    }
                    Ok(ServerMessage::Error { payload, .. }) => {
                        warn!(%stream, %payload, "Subscription rejected by server");
                        break;
                    }
                    Ok(ServerMessage::Complete { .. }) => {
                        info!(%stream, "Subscription completed by server");
                        break;
                    }
                    Ok(ServerMessage::Ping { .. }) => {
                        let pong = ClientMessage::Pong { payload: None };
                        if send(&mut socket, &pong).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!(%stream, error = %e, "Unparseable subscription message"),
                }
            }
        }
    }
}
