//! Built-in answers for requests that could not be handled normally.

use std::io::{self, Write};

use crate::error::HandlerResult;
use crate::handler::{Exchange, Handler};

pub const NOT_FOUND_BODY: &str = "The page you are looking for cannot be found";
pub const INTERNAL_ERROR_BODY: &str = "The server encountered an error";
pub const NOT_IMPLEMENTED_BODY: &str = "The page you are looking is not implemented";

/// Fixed status with a fixed body and matching `Content-Length`.
#[derive(Debug, Clone, Copy)]
pub struct FixedHandler {
    status: u16,
    body: &'static str,
}

impl FixedHandler {
    pub const fn new(status: u16, body: &'static str) -> Self {
        Self { status, body }
    }

    pub const fn not_found() -> Self {
        Self::new(404, NOT_FOUND_BODY)
    }

    pub const fn internal_error() -> Self {
        Self::new(500, INTERNAL_ERROR_BODY)
    }

    pub const fn not_implemented() -> Self {
        Self::new(501, NOT_IMPLEMENTED_BODY)
    }
}

impl Handler for FixedHandler {
    fn postprocess(&mut self, exchange: &mut Exchange) -> HandlerResult<()> {
        exchange.response.set_status(self.status);
        exchange
            .response
            .set_header("Content-Length", self.body.len().to_string());
        Ok(())
    }

    fn send_body(&mut self, _exchange: &Exchange, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.body.as_bytes())
    }
}
