use std::io::Write;

use crate::error::HandlerResult;
use crate::handler::{Exchange, Handler};
use crate::http::request::Request;
use crate::http::writer::write_head;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Created,
    Preprocessed,
    Deferred,
    Postprocessed,
    Dumped,
    Cleaned,
}

/// A handler bound to its request, stepping through the lifecycle.
pub struct HandlerTask {
    handler: Box<dyn Handler>,
    exchange: Exchange,
    state: LifecycleState,
}

impl HandlerTask {
    pub fn new(handler: Box<dyn Handler>, request: Request) -> Self {
        Self {
            handler,
            exchange: Exchange::new(request),
            state: LifecycleState::Created,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn is_dumped(&self) -> bool {
        self.state >= LifecycleState::Dumped
    }

    pub fn is_upgrade(&self) -> bool {
        self.exchange.is_upgrade()
    }

    pub fn preprocess(&mut self) -> HandlerResult<()> {
        debug_assert_eq!(self.state, LifecycleState::Created);
        self.handler.preprocess(&mut self.exchange)?;
        self.state = LifecycleState::Preprocessed;
        Ok(())
    }

    /// Evaluates the defer predicate, parking the task while it holds.
    pub fn poll_deferred(&mut self) -> bool {
        let defer = self.handler.defer_condition(&self.exchange);
        if defer {
            self.state = LifecycleState::Deferred;
        }
        defer
    }

    /// Runs `postprocess` and serializes the response.
    ///
    /// The bytes are returned rather than written so a failure part way
    /// through never leaves a half response on the wire.
    pub fn complete(&mut self) -> HandlerResult<Vec<u8>> {
        self.handler.postprocess(&mut self.exchange)?;
        self.state = LifecycleState::Postprocessed;
        self.dump()
    }

    fn dump(&mut self) -> HandlerResult<Vec<u8>> {
        let mut out = Vec::new();
        write_head(&self.exchange.response, &mut out)?;
        self.handler.send_body(&self.exchange, &mut out)?;
        self.state = LifecycleState::Dumped;
        Ok(out)
    }

    /// Runs `cleanup` once; later calls do nothing.
    pub fn cleanup(&mut self) {
        if self.state != LifecycleState::Cleaned {
            self.handler.cleanup(&mut self.exchange);
            self.state = LifecycleState::Cleaned;
        }
    }

    pub fn channel_data(&mut self, data: &[u8], out: &mut dyn Write) -> HandlerResult<()> {
        self.handler.on_channel_data(data, out)
    }

    /// Gives back the request, for re-dispatch to a fallback.
    pub fn into_request(self) -> Request {
        self.exchange.into_request()
    }
}
