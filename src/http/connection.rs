use std::io::{self, Read, Write};
use std::net::SocketAddr;

use mio::net::TcpStream;

use crate::handler::HandlerTask;
use crate::http::request::Request;
use crate::http::writer::{BAD_REQUEST, Flush, ResponseWriter};

/// Where a connection is in its single request/response cycle.
pub enum ConnectionState {
    /// Accumulating request bytes.
    Reading,
    /// The handler is parked in the deferred scheduler; no reads happen.
    Parked,
    /// Flushing the serialized response. `upgrade` carries the handler
    /// when the connection becomes a channel afterwards.
    Writing { upgrade: Option<HandlerTask> },
}

/// Outcome of one bounded read attempt.
#[derive(Debug)]
pub enum ReadOutcome {
    /// This many bytes were placed at the start of the buffer
    Data(usize),
    /// Nothing to read right now; try again after the next readiness event
    WouldBlock,
    /// Orderly close by the peer
    Closed,
    /// Reset, broken pipe or any other socket error
    Fault(io::Error),
}

/// One accepted client socket and the request being read from it.
///
/// A connection carries exactly one request/response cycle. After the
/// response is flushed it is either closed or, when the handler asked for
/// an upgrade, handed over to the channel set.
pub struct Connection {
    /// Non-blocking socket registered with the event loop
    pub stream: TcpStream,
    /// Remote address, used for logging
    pub peer: SocketAddr,
    /// Request filled in by [`Request::update`] as bytes arrive
    pub request: Request,
    pub state: ConnectionState,
    writer: ResponseWriter,
    /// Readiness seen but not yet drained to would-block.
    pub readable: bool,
    pub writable: bool,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            request: Request::from_peer(peer),
            state: ConnectionState::Reading,
            writer: ResponseWriter::new(),
            readable: true,
            writable: true,
        }
    }

    pub fn wants_read(&self) -> bool {
        self.readable && matches!(self.state, ConnectionState::Reading)
    }

    pub fn wants_write(&self) -> bool {
        self.writable && matches!(self.state, ConnectionState::Writing { .. })
    }

    /// At most one read of up to `buf.len()` bytes.
    ///
    /// # Arguments
    ///
    /// * `buf` - Scratch buffer; its length bounds the read
    ///
    /// # Returns
    ///
    /// The [`ReadOutcome`]. A would-block clears the readable flag so the
    /// connection is skipped until the next readiness event.
    pub fn read_once(&mut self, buf: &mut [u8]) -> ReadOutcome {
        match read_once(&mut self.stream, buf) {
            ReadOutcome::WouldBlock => {
                self.readable = false;
                ReadOutcome::WouldBlock
            }
            other => other,
        }
    }

    /// Hands the completed request over for dispatch.
    pub fn take_request(&mut self) -> Request {
        std::mem::take(&mut self.request)
    }

    pub fn park(&mut self) {
        self.state = ConnectionState::Parked;
    }

    /// Queues serialized response bytes and switches to writing.
    ///
    /// # Arguments
    ///
    /// * `output` - The complete response: status line, headers and body
    /// * `upgrade` - The handler to keep when the connection becomes a channel
    pub fn respond(&mut self, output: &[u8], upgrade: Option<HandlerTask>) {
        self.writer.push(output);
        self.state = ConnectionState::Writing { upgrade };
    }

    /// Writes as much of the queued response as the socket accepts.
    ///
    /// # Returns
    ///
    /// * `Ok(Flush::Done)` - Everything has been written
    /// * `Ok(Flush::Pending)` - The socket would block; the rest stays queued
    /// * `Err(e)` - The write failed, typically because the peer went away
    pub fn flush(&mut self) -> io::Result<Flush> {
        let status = self.writer.flush_to(&mut self.stream)?;
        if status == Flush::Pending {
            self.writable = false;
        }
        Ok(status)
    }

    /// Best-effort synchronous 400 for a request the parser rejected.
    ///
    /// A short or failed write is ignored; the connection is closed next.
    pub fn reject_bad_request(&mut self) {
        let _ = self.stream.write(BAD_REQUEST);
    }

    /// Takes the handler that asked for an upgrade, if any.
    pub fn take_upgrade(&mut self) -> Option<HandlerTask> {
        match &mut self.state {
            ConnectionState::Writing { upgrade } => upgrade.take(),
            _ => None,
        }
    }
}

pub(crate) fn read_once<R: Read>(stream: &mut R, buf: &mut [u8]) -> ReadOutcome {
    loop {
        match stream.read(buf) {
            Ok(0) => return ReadOutcome::Closed,
            Ok(n) => return ReadOutcome::Data(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return ReadOutcome::WouldBlock,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return ReadOutcome::Fault(e),
        }
    }
}
