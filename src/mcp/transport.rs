//! MCP transport layer.
//!
//! Line-delimited JSON-RPC over stdin/stdout. Nothing else may write to
//! stdout; logs go to stderr.

use async_trait::async_trait;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use crate::error::Result;
use crate::mcp::protocol::{
    error_codes, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
};

/// A message that can be sent or received.
#[derive(Debug, Clone)]
pub enum Message {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Notification(JsonRpcNotification),
}

impl Message {
    /// Parse one incoming line. Requests carry an id; notifications do not.
    ///
    /// Lines that are not JSON, or JSON that is neither, yield the error
    /// response to send back.
    pub fn parse(line: &str) -> std::result::Result<Self, JsonRpcResponse> {
        let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
            JsonRpcResponse::failure(
                RequestId::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", e),
            )
        })?;

        if let Ok(req) = serde_json::from_value::<JsonRpcRequest>(value.clone()) {
            Ok(Message::Request(req))
        } else if let Ok(notif) = serde_json::from_value::<JsonRpcNotification>(value.clone()) {
            Ok(Message::Notification(notif))
        } else {
            let id = value
                .get("id")
                .and_then(|id| serde_json::from_value(id.clone()).ok())
                .unwrap_or(RequestId::Null);
            Err(JsonRpcResponse::failure(
                id,
                error_codes::INVALID_REQUEST,
                "Invalid Request: expected a JSON-RPC request or notification",
            ))
        }
    }

    /// Serialize to a single line without the trailing newline.
    pub fn encode(&self) -> serde_json::Result<String> {
        match self {
            Message::Request(req) => serde_json::to_string(req),
            Message::Response(res) => serde_json::to_string(res),
            Message::Notification(notif) => serde_json::to_string(notif),
        }
    }
}

/// Transport trait for MCP communication.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Start the transport, returning channels for messages.
    async fn start(&mut self) -> Result<(mpsc::Receiver<Message>, mpsc::Sender<Message>)>;

    /// Stop the transport.
    async fn stop(&mut self) -> Result<()>;
}

/// Stdio transport for MCP.
#[derive(Debug, Default)]
pub struct StdioTransport;

impl StdioTransport {
    /// Create a new stdio transport.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn start(&mut self) -> Result<(mpsc::Receiver<Message>, mpsc::Sender<Message>)> {
        // Channel for incoming messages (from stdin)
        let (incoming_tx, incoming_rx) = mpsc::channel::<Message>(100);
        // Channel for outgoing messages (to stdout)
        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Message>(100);
        let error_tx = outgoing_tx.clone();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let mut reader = BufReader::new(stdin);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!("EOF on stdin, stopping transport");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }

                        trace!("Received: {}", trimmed);

                        match Message::parse(trimmed) {
                            Ok(msg) => {
                                if incoming_tx.send(msg).await.is_err() {
                                    break;
                                }
                            }
                            Err(reply) => {
                                error!("Rejected message: {}", trimmed);
                                if error_tx.send(Message::Response(reply)).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();

            while let Some(msg) = outgoing_rx.recv().await {
                let line = match msg.encode() {
                    Ok(s) => s,
                    Err(e) => {
                        error!("Error serializing message: {}", e);
                        continue;
                    }
                };

                trace!("Sending: {}", line);
                let written = async {
                    stdout.write_all(line.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await
                }
                .await;
                if let Err(e) = written {
                    error!("Error writing to stdout: {}", e);
                    break;
                }
            }
        });

        Ok((incoming_rx, outgoing_tx))
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let line = r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#;
        match Message::parse(line) {
            Ok(Message::Request(req)) => {
                assert_eq!(req.id, RequestId::Number(7));
                assert_eq!(req.method, "tools/list");
            }
            other => panic!("Expected request, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_notification() {
        let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(matches!(
            Message::parse(line),
            Ok(Message::Notification(n)) if n.method == "notifications/initialized"
        ));
    }

    #[test]
    fn test_parse_garbage_is_parse_error() {
        let reply = Message::parse("not json").unwrap_err();
        assert_eq!(reply.id, RequestId::Null);
        assert_eq!(reply.error.unwrap().code, error_codes::PARSE_ERROR);

        let encoded = Message::Response(Message::parse("{").unwrap_err())
            .encode()
            .unwrap();
        assert!(encoded.contains("\"id\":null"));
        assert!(encoded.contains("-32700"));
    }

    #[test]
    fn test_parse_non_message_is_invalid_request() {
        let reply = Message::parse(r#"{"jsonrpc":"2.0"}"#).unwrap_err();
        assert_eq!(reply.id, RequestId::Null);
        assert_eq!(reply.error.unwrap().code, error_codes::INVALID_REQUEST);

        let reply = Message::parse(r#"{"jsonrpc":"2.0","id":9,"method":7}"#).unwrap_err();
        assert_eq!(reply.id, RequestId::Number(9));
        assert_eq!(reply.error.unwrap().code, error_codes::INVALID_REQUEST);

        let reply = Message::parse("[1, 2]").unwrap_err();
        assert_eq!(reply.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[test]
    fn test_encode_is_single_line() {
        let msg = Message::Response(JsonRpcResponse::success(
            RequestId::String("a".to_string()),
            json!({ "text": "line1\nline2" }),
        ));
        let encoded = msg.encode().unwrap();
        assert!(!encoded.contains('\n'));
        assert!(encoded.contains("\"id\":\"a\""));
    }
}
