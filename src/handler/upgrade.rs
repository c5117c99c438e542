use std::io::{self, Write};

use tracing::debug;

use crate::error::HandlerResult;
use crate::handler::{Exchange, Handler};
use crate::http::websocket::{accept_key, validate_handshake};
use crate::routing::RouteConfig;

type MessageCallback = Box<dyn FnMut(&[u8], &mut dyn Write) -> io::Result<()>>;

/// Performs the WebSocket opening handshake and keeps the connection as a
/// raw channel afterwards.
///
/// Frames are not decoded: bytes read from the channel are passed to the
/// message callback as they arrive.
pub struct WebSocketHandler {
    reject_code: u16,
    on_message: Option<MessageCallback>,
}

impl Default for WebSocketHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSocketHandler {
    pub fn new() -> Self {
        Self {
            reject_code: 400,
            on_message: None,
        }
    }

    /// Status sent when the handshake is invalid.
    pub fn reject_code(mut self, code: u16) -> Self {
        self.reject_code = code;
        self
    }

    pub fn on_message<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[u8], &mut dyn Write) -> io::Result<()> + 'static,
    {
        self.on_message = Some(Box::new(f));
        self
    }

    /// Options: `reject_code` (default 400).
    pub fn from_config(config: &RouteConfig) -> HandlerResult<Self> {
        let mut handler = Self::new();
        if let Some(code) = config.get_u64("reject_code").and_then(|c| u16::try_from(c).ok()) {
            handler.reject_code = code;
        }
        Ok(handler)
    }
}

impl Handler for WebSocketHandler {
    fn postprocess(&mut self, exchange: &mut Exchange) -> HandlerResult<()> {
        let accept = match validate_handshake(exchange.request()) {
            Ok(key) => accept_key(key),
            Err(reason) => {
                debug!(?reason, path = %exchange.request().path, "Rejecting upgrade");
                exchange.response.set_status(self.reject_code);
                exchange.response.set_header("Content-Length", "0");
                return Ok(());
            }
        };

        let response = &mut exchange.response;
        response.set_status(101);
        response.set_header("Sec-WebSocket-Accept", accept);
        response.set_header("Connection", "upgrade");
        response.set_header("Upgrade", "websocket");
        exchange.mark_upgrade();
        Ok(())
    }

    fn on_channel_data(&mut self, data: &[u8], out: &mut dyn Write) -> HandlerResult<()> {
        if let Some(callback) = self.on_message.as_mut() {
            callback(data, out)?;
        }
        Ok(())
    }
}
