//! Ready-made handler variants.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::anyhow;

use crate::error::{HandlerError, HandlerResult};
use crate::handler::{Exchange, Handler};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::routing::RouteConfig;

/// Chunk size used when streaming static files.
pub const DEFAULT_STATIC_CHUNK: usize = 512;

/// Answers with a fixed body.
#[derive(Debug, Clone)]
pub struct TextHandler {
    status: u16,
    body: String,
    content_type: Option<String>,
}

impl TextHandler {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: None,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Options: `body`, `status`, `content_type`.
    pub fn from_config(config: &RouteConfig) -> HandlerResult<Self> {
        let mut handler = Self::new(config.get_str("body").unwrap_or_default());
        if let Some(status) = config.get_u64("status") {
            handler.status = u16::try_from(status)
                .map_err(|_| HandlerError::Other(anyhow!("status {status} is out of range")))?;
        }
        handler.content_type = config.get_str("content_type").map(str::to_string);
        Ok(handler)
    }
}

impl Handler for TextHandler {
    fn postprocess(&mut self, exchange: &mut Exchange) -> HandlerResult<()> {
        let response = &mut exchange.response;
        response.set_status(self.status);
        if let Some(content_type) = &self.content_type {
            response.set_header("Content-Type", content_type.as_str());
        }
        response.set_body(self.body.as_bytes());
        Ok(())
    }
}

/// Runs a closure at postprocess time.
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: FnMut(&Request, &mut Response) -> HandlerResult<()>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: FnMut(&Request, &mut Response) -> HandlerResult<()>,
{
    fn postprocess(&mut self, exchange: &mut Exchange) -> HandlerResult<()> {
        let Exchange { request, response, .. } = exchange;
        (self.f)(request, response)
    }
}

/// Streams one file from disk in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct StaticFileHandler {
    path: PathBuf,
    chunk_size: usize,
}

impl StaticFileHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_STATIC_CHUNK,
        }
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Options: `static` (file path).
    pub fn from_config(config: &RouteConfig) -> HandlerResult<Self> {
        Ok(Self::new(config.require_str("static")?))
    }
}

impl Handler for StaticFileHandler {
    fn postprocess(&mut self, exchange: &mut Exchange) -> HandlerResult<()> {
        let len = std::fs::metadata(&self.path)?.len();
        exchange.response.set_header("Content-Length", len.to_string());
        Ok(())
    }

    fn send_body(&mut self, _exchange: &Exchange, out: &mut dyn Write) -> io::Result<()> {
        let mut file = File::open(&self.path)?;
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            let n = file.read(&mut chunk)?;
            if n == 0 {
                return Ok(());
            }
            out.write_all(&chunk[..n])?;
        }
    }
}

/// Points the client somewhere else.
#[derive(Debug, Clone)]
pub struct RedirectHandler {
    location: String,
    permanent: bool,
}

impl RedirectHandler {
    pub fn new(location: impl Into<String>, permanent: bool) -> Self {
        Self {
            location: location.into(),
            permanent,
        }
    }

    /// Options: `location`, `permanent` (default false).
    pub fn from_config(config: &RouteConfig) -> HandlerResult<Self> {
        Ok(Self::new(
            config.require_str("location")?,
            config.get_bool("permanent").unwrap_or(false),
        ))
    }
}

impl Handler for RedirectHandler {
    fn postprocess(&mut self, exchange: &mut Exchange) -> HandlerResult<()> {
        exchange.response.redirect(self.location.as_str(), self.permanent);
        exchange.response.set_header("Content-Length", "0");
        Ok(())
    }
}
