//! Request handlers and their lifecycle.
//!
//! A handler is a set of hooks driven in a fixed order for one request:
//!
//! ```text
//! CREATED → PREPROCESSED → (DEFERRED)* → POSTPROCESSED → DUMPED → CLEANED
//! ```
//!
//! `preprocess` runs once right after construction. `defer_condition` is
//! then polled; while it returns true the handler stays parked and is
//! polled again on every loop pass. Once it clears, `postprocess` runs,
//! the response is serialized (status line, headers, then `send_body`) and
//! `cleanup` runs. Handlers that upgrade their connection skip `cleanup`
//! until the channel closes.

pub mod builtin;
pub mod fallback;
pub mod lifecycle;
pub mod upgrade;

use std::io::{self, Write};

use crate::error::HandlerResult;
use crate::http::request::Request;
use crate::http::response::Response;

pub use builtin::{FnHandler, RedirectHandler, StaticFileHandler, TextHandler};
pub use fallback::FixedHandler;
pub use lifecycle::{HandlerTask, LifecycleState};
pub use upgrade::WebSocketHandler;

/// Hooks a request handler may override. Every hook has a default, so a
/// handler only implements the steps it cares about.
pub trait Handler {
    fn preprocess(&mut self, _exchange: &mut Exchange) -> HandlerResult<()> {
        Ok(())
    }

    /// Polled after `preprocess` and on every loop pass while true.
    /// Returning true parks the handler without blocking the loop.
    fn defer_condition(&mut self, _exchange: &Exchange) -> bool {
        false
    }

    fn postprocess(&mut self, _exchange: &mut Exchange) -> HandlerResult<()> {
        Ok(())
    }

    /// Writes the response body after the head has been serialized.
    fn send_body(&mut self, exchange: &Exchange, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&exchange.response.body)
    }

    fn cleanup(&mut self, _exchange: &mut Exchange) {}

    /// Raw bytes received on an upgraded connection. Anything written to
    /// `out` is sent back to the peer.
    fn on_channel_data(&mut self, _data: &[u8], _out: &mut dyn Write) -> HandlerResult<()> {
        Ok(())
    }
}

/// The request being answered together with the response under
/// construction.
#[derive(Debug)]
pub struct Exchange {
    request: Request,
    pub response: Response,
    upgrade: bool,
}

impl Exchange {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::new(),
            upgrade: false,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Keep the connection open as a channel once the response is sent.
    pub fn mark_upgrade(&mut self) {
        self.upgrade = true;
    }

    pub fn is_upgrade(&self) -> bool {
        self.upgrade
    }

    pub(crate) fn into_request(self) -> Request {
        self.request
    }
}
