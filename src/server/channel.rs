use std::io;
use std::net::SocketAddr;

use mio::net::TcpStream;

use crate::error::HandlerResult;
use crate::handler::HandlerTask;
use crate::http::connection::{ReadOutcome, read_once};
use crate::http::writer::{Flush, ResponseWriter};

/// A connection that left request/response framing after an upgrade.
pub struct Channel {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    task: HandlerTask,
    writer: ResponseWriter,
    pub readable: bool,
    pub writable: bool,
}

impl Channel {
    pub fn new(stream: TcpStream, peer: SocketAddr, task: HandlerTask) -> Self {
        Self {
            stream,
            peer,
            task,
            writer: ResponseWriter::new(),
            readable: true,
            writable: true,
        }
    }

    pub fn has_pending_io(&self) -> bool {
        self.readable || (self.writable && !self.writer.is_empty())
    }

    pub fn read_once(&mut self, buf: &mut [u8]) -> ReadOutcome {
        match read_once(&mut self.stream, buf) {
            ReadOutcome::WouldBlock => {
                self.readable = false;
                ReadOutcome::WouldBlock
            }
            other => other,
        }
    }

    /// Passes received bytes to the handler and queues its reply.
    pub fn deliver(&mut self, data: &[u8]) -> HandlerResult<()> {
        let mut out = Vec::new();
        self.task.channel_data(data, &mut out)?;
        self.writer.push(&out);
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<Flush> {
        if !self.writable || self.writer.is_empty() {
            return Ok(Flush::Done);
        }
        let status = self.writer.flush_to(&mut self.stream)?;
        if status == Flush::Pending {
            self.writable = false;
        }
        Ok(status)
    }

    /// Runs the handler's `cleanup`; the socket closes when dropped.
    pub fn close(mut self) {
        self.task.cleanup();
    }
}
