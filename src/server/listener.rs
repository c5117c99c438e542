use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{Fault, is_disconnect};
use crate::http::connection::{Connection, ConnectionState, ReadOutcome};
use crate::http::writer::Flush;
use crate::routing::{Dispatch, Router};
use crate::server::channel::Channel;
use crate::server::linger::Lingering;
use crate::server::scheduler::DeferredScheduler;

const LISTENER: Token = Token(0);

/// Single-threaded connection multiplexer.
///
/// Owns the listening socket, every open connection, the parked handlers
/// and the upgraded channels. One call to [`Server::run_once`] performs a
/// single pass:
///
/// 1. wait for readiness (without blocking when work is already known)
/// 2. accept at most one connection
/// 3. read at most once from every connection, feeding the parser and
///    dispatching requests that became ready
/// 4. drop connections that closed or faulted
/// 5. poll the deferred handlers
/// 6. flush pending responses and service upgraded channels
/// 7. drain finished connections and close them once the peer is done
pub struct Server {
    poll: Poll,
    events: Events,
    listener: TcpListener,
    listener_ready: bool,
    connections: HashMap<Token, Connection>,
    channels: HashMap<Token, Channel>,
    lingering: HashMap<Token, Lingering>,
    deferred: DeferredScheduler,
    router: Router,
    settings: ServerConfig,
    read_buf: Vec<u8>,
    next_token: usize,
}

impl Server {
    pub fn bind(settings: &ServerConfig, router: Router) -> anyhow::Result<Self> {
        let addr: SocketAddr = settings
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address {:?}", settings.listen_addr))?;

        let poll = Poll::new()?;
        let mut listener = TcpListener::bind(addr)?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)?;

        Ok(Self {
            poll,
            events: Events::with_capacity(1024),
            listener,
            listener_ready: true,
            connections: HashMap::new(),
            channels: HashMap::new(),
            lingering: HashMap::new(),
            deferred: DeferredScheduler::new(),
            router,
            settings: settings.clone(),
            read_buf: vec![0u8; settings.read_chunk_size.max(1)],
            next_token: LISTENER.0 + 1,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Finished connections still draining input before they close.
    pub fn lingering_count(&self) -> usize {
        self.lingering.len()
    }

    /// Runs passes until `shutdown` is set.
    pub fn run(&mut self, shutdown: &AtomicBool) -> anyhow::Result<()> {
        info!("Listening on {}", self.local_addr()?);

        while !shutdown.load(Ordering::Relaxed) {
            self.run_once()?;
        }

        self.deferred.clear();
        for (_, channel) in self.channels.drain() {
            channel.close();
        }
        self.lingering.clear();
        info!("Event loop stopped");
        Ok(())
    }

    /// One pass of the loop. Only a failure of the readiness poll itself is
    /// returned; everything else is contained to its connection.
    pub fn run_once(&mut self) -> anyhow::Result<()> {
        self.wait_for_events()?;

        let mut removed = Vec::new();
        let mut finished = Vec::new();
        self.accept_one();
        self.read_connections(&mut removed, &mut finished);
        self.purge(&mut removed);

        for (token, dispatch) in self.deferred.advance(&self.router) {
            self.apply(token, dispatch, &mut removed);
        }

        self.flush_connections(&mut removed, &mut finished);
        self.purge(&mut removed);
        self.linger(&mut finished);
        self.service_channels();
        self.service_lingering();
        Ok(())
    }

    fn next_timeout(&self) -> Duration {
        let busy = self.listener_ready
            || self
                .connections
                .values()
                .any(|c| c.wants_read() || c.wants_write())
            || self.channels.values().any(Channel::has_pending_io)
            || self.lingering.values().any(|l| l.readable);

        if busy {
            Duration::ZERO
        } else if !self.deferred.is_empty() {
            self.settings.defer_poll_interval()
        } else {
            self.settings.idle_poll_interval()
        }
    }

    fn wait_for_events(&mut self) -> io::Result<()> {
        let timeout = self.next_timeout();
        match self.poll.poll(&mut self.events, Some(timeout)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(e),
        }

        for event in self.events.iter() {
            let token = event.token();
            if token == LISTENER {
                self.listener_ready = true;
                continue;
            }

            let readable = event.is_readable() || event.is_read_closed() || event.is_error();
            let writable = event.is_writable() || event.is_write_closed() || event.is_error();

            if let Some(conn) = self.connections.get_mut(&token) {
                conn.readable |= readable;
                conn.writable |= writable;
            } else if let Some(channel) = self.channels.get_mut(&token) {
                channel.readable |= readable;
                channel.writable |= writable;
            } else if let Some(lingering) = self.lingering.get_mut(&token) {
                lingering.readable |= readable;
            }
        }

        Ok(())
    }

    fn allocate_token(&mut self) -> Token {
        let token = Token(self.next_token);
        self.next_token += 1;
        token
    }

    fn accept_one(&mut self) {
        if !self.listener_ready {
            return;
        }

        match self.listener.accept() {
            Ok((mut stream, peer)) => {
                let token = self.allocate_token();
                if let Err(e) = self.poll.registry().register(
                    &mut stream,
                    token,
                    Interest::READABLE | Interest::WRITABLE,
                ) {
                    warn!(%peer, error = %e, "Failed to register connection");
                    return;
                }
                debug!(%peer, token = token.0, "Accepted connection");
                self.connections.insert(token, Connection::new(stream, peer));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => self.listener_ready = false,
            Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted) => {}
            Err(e) => {
                warn!(error = %e, "Accept failed");
                self.listener_ready = false;
            }
        }
    }

    fn read_connections(&mut self, removed: &mut Vec<Token>, finished: &mut Vec<Token>) {
        let tokens: Vec<Token> = self
            .connections
            .iter()
            .filter(|(_, conn)| conn.wants_read())
            .map(|(token, _)| *token)
            .collect();

        for token in tokens {
            let Some(conn) = self.connections.get_mut(&token) else {
                continue;
            };

            let n = match conn.read_once(&mut self.read_buf) {
                ReadOutcome::Data(n) => n,
                ReadOutcome::WouldBlock => continue,
                ReadOutcome::Closed => {
                    debug!(peer = %conn.peer, "Peer closed connection");
                    removed.push(token);
                    continue;
                }
                ReadOutcome::Fault(e) => {
                    debug!(peer = %conn.peer, error = %Fault::Connection(e), "Dropping connection");
                    removed.push(token);
                    continue;
                }
            };

            if let Err(err) = conn.request.update(&self.read_buf[..n]) {
                warn!(peer = %conn.peer, error = %Fault::from(err), "Rejecting malformed request");
                conn.reject_bad_request();
                finished.push(token);
                continue;
            }

            if conn.request.is_ready() {
                let request = conn.take_request();
                let dispatch = self.router.dispatch(request);
                self.apply(token, dispatch, removed);
            }
        }
    }

    fn apply(&mut self, token: Token, dispatch: Dispatch, removed: &mut Vec<Token>) {
        let Some(conn) = self.connections.get_mut(&token) else {
            // The socket went away underneath a parked handler.
            if let Dispatch::Respond { upgrade: Some(mut task), .. } | Dispatch::Deferred(mut task) = dispatch {
                task.cleanup();
            }
            return;
        };

        match dispatch {
            Dispatch::Respond { output, upgrade } => conn.respond(&output, upgrade),
            Dispatch::Deferred(task) => {
                conn.park();
                self.deferred.park(token, task);
            }
            Dispatch::Drop => removed.push(token),
        }
    }

    fn flush_connections(&mut self, removed: &mut Vec<Token>, finished: &mut Vec<Token>) {
        let mut upgraded = Vec::new();

        for (token, conn) in self.connections.iter_mut() {
            if !conn.wants_write() {
                continue;
            }
            match conn.flush() {
                Ok(Flush::Pending) => {}
                Ok(Flush::Done) => match conn.take_upgrade() {
                    Some(task) => upgraded.push((*token, task)),
                    None => finished.push(*token),
                },
                Err(e) => {
                    if !is_disconnect(&e) {
                        warn!(peer = %conn.peer, error = %e, "Write failed");
                    }
                    removed.push(*token);
                }
            }
        }

        for (token, task) in upgraded {
            if let Some(conn) = self.connections.remove(&token) {
                info!(peer = %conn.peer, token = token.0, "Connection upgraded");
                let mut channel = Channel::new(conn.stream, conn.peer, task);
                channel.readable = conn.readable;
                self.channels.insert(token, channel);
            }
        }
    }

    fn service_channels(&mut self) {
        let mut closed = Vec::new();

        for (token, channel) in self.channels.iter_mut() {
            if channel.readable {
                match channel.read_once(&mut self.read_buf) {
                    ReadOutcome::Data(n) => {
                        if let Err(err) = channel.deliver(&self.read_buf[..n]) {
                            warn!(peer = %channel.peer, error = %err, "Channel handler failed");
                            closed.push(*token);
                            continue;
                        }
                    }
                    ReadOutcome::WouldBlock => {}
                    ReadOutcome::Closed | ReadOutcome::Fault(_) => {
                        closed.push(*token);
                        continue;
                    }
                }
            }

            if channel.flush().is_err() {
                closed.push(*token);
            }
        }

        for token in closed {
            if let Some(mut channel) = self.channels.remove(&token) {
                debug!(peer = %channel.peer, "Channel closed");
                let _ = self.poll.registry().deregister(&mut channel.stream);
                channel.close();
            }
        }
    }

    /// Moves connections whose response is complete into the lingering set.
    fn linger(&mut self, finished: &mut Vec<Token>) {
        let deadline = Instant::now() + self.settings.linger_timeout();
        for token in finished.drain(..) {
            if let Some(conn) = self.connections.remove(&token) {
                let lingering = Lingering::new(conn.stream, conn.peer, deadline, true);
                self.lingering.insert(token, lingering);
            }
        }
    }

    fn service_lingering(&mut self) {
        let now = Instant::now();
        let mut done = Vec::new();

        for (token, lingering) in self.lingering.iter_mut() {
            if lingering.drain(&mut self.read_buf, now) {
                done.push(*token);
            }
        }

        for token in done {
            if let Some(mut lingering) = self.lingering.remove(&token) {
                debug!(peer = %lingering.peer, drained = lingering.drained(), "Connection closed");
                let _ = self.poll.registry().deregister(&mut lingering.stream);
            }
        }
    }

    fn purge(&mut self, removed: &mut Vec<Token>) {
        for token in removed.drain(..) {
            if let Some(mut conn) = self.connections.remove(&token) {
                let _ = self.poll.registry().deregister(&mut conn.stream);
                if let ConnectionState::Writing { upgrade: Some(mut task) } = conn.state {
                    task.cleanup();
                }
            }
        }
    }
}
