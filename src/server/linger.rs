use std::net::{Shutdown, SocketAddr};
use std::time::Instant;

use mio::net::TcpStream;

use crate::http::connection::{ReadOutcome, read_once};

/// Most bytes discarded from one lingering peer before giving up on it.
pub const LINGER_DRAIN_LIMIT: usize = 1 << 20;

/// A connection whose response has been sent.
///
/// The write side is shut down at once so the peer sees the end of the
/// response. Input the peer is still sending (a body past the declared
/// length, or one sent with no `Content-Length`) is read and discarded until
/// the peer closes, the deadline passes or [`LINGER_DRAIN_LIMIT`] is reached.
/// Closing a socket with unread input makes the kernel answer with a reset,
/// which can destroy the response before the peer reads it.
pub struct Lingering {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    deadline: Instant,
    drained: usize,
    pub readable: bool,
}

impl Lingering {
    /// Shuts down the write side of `stream` and starts draining it.
    ///
    /// # Arguments
    ///
    /// * `stream` - The finished connection's socket, still registered
    /// * `deadline` - When to close regardless of what the peer is doing
    /// * `readable` - Readiness already seen for the socket
    pub fn new(stream: TcpStream, peer: SocketAddr, deadline: Instant, readable: bool) -> Self {
        // Fails only when the peer is already gone; draining notices that.
        let _ = stream.shutdown(Shutdown::Write);
        Self {
            stream,
            peer,
            deadline,
            drained: 0,
            readable,
        }
    }

    /// Discards whatever the peer has sent so far.
    ///
    /// # Returns
    ///
    /// `true` once the socket can be closed without a reset or should be
    /// closed anyway.
    pub fn drain(&mut self, buf: &mut [u8], now: Instant) -> bool {
        while self.readable {
            match read_once(&mut self.stream, buf) {
                ReadOutcome::Data(n) => {
                    self.drained += n;
                    if self.drained >= LINGER_DRAIN_LIMIT {
                        return true;
                    }
                }
                ReadOutcome::WouldBlock => self.readable = false,
                ReadOutcome::Closed | ReadOutcome::Fault(_) => return true,
            }
        }
        now >= self.deadline
    }

    pub fn drained(&self) -> usize {
        self.drained
    }
}
