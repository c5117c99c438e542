use std::io::{self, Write};

use bytes::{Buf, BytesMut};

use crate::error::HandlerError;
use crate::http::response::{Response, reason_phrase};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Writes the status line, every header value and the blank separator line.
///
/// An unknown status code is an internal error; nothing is written in that
/// case.
pub fn write_head(resp: &Response, out: &mut Vec<u8>) -> Result<(), HandlerError> {
    let reason = reason_phrase(resp.status).ok_or(HandlerError::UnknownStatus(resp.status))?;

    let status_line = format!("{} {} {}\r\n", HTTP_VERSION, resp.status, reason);
    out.extend_from_slice(status_line.as_bytes());

    for (name, values) in resp.headers.iter() {
        for value in values {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(b"\r\n");
    Ok(())
}

/// Canned answer for requests the parser rejected.
pub const BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n";

/// Result of a non-blocking flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    /// Every queued byte has been written.
    Done,
    /// The socket would block; retry on the next writable event.
    Pending,
}

/// Outgoing bytes for one socket, drained as the socket accepts them.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    buffer: BytesMut,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Writes as much as the socket takes without blocking.
    pub fn flush_to<W: Write>(&mut self, stream: &mut W) -> io::Result<Flush> {
        while !self.buffer.is_empty() {
            match stream.write(&self.buffer) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "connection closed while writing",
                    ));
                }
                Ok(n) => self.buffer.advance(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(Flush::Pending),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(Flush::Done)
    }
}
