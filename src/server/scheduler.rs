use mio::Token;
use tracing::debug;

use crate::handler::HandlerTask;
use crate::routing::{Dispatch, Router};

/// Handlers parked on their defer condition, keyed by connection.
///
/// There is no timeout: a handler whose condition never clears stays here
/// until the server shuts down.
#[derive(Default)]
pub struct DeferredScheduler {
    parked: Vec<(Token, HandlerTask)>,
}

impl DeferredScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn park(&mut self, token: Token, task: HandlerTask) {
        self.parked.push((token, task));
    }

    pub fn len(&self) -> usize {
        self.parked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parked.is_empty()
    }

    pub fn contains(&self, token: Token) -> bool {
        self.parked.iter().any(|(t, _)| *t == token)
    }

    /// Polls every parked handler once. Handlers whose condition cleared
    /// are finished through the router and returned with their outcome.
    pub fn advance(&mut self, router: &Router) -> Vec<(Token, Dispatch)> {
        let mut finished = Vec::new();
        let mut still_parked = Vec::with_capacity(self.parked.len());

        for (token, mut task) in self.parked.drain(..) {
            if task.poll_deferred() {
                still_parked.push((token, task));
            } else {
                debug!(token = token.0, "Deferred handler resumed");
                finished.push((token, router.finish(task)));
            }
        }

        self.parked = still_parked;
        finished
    }

    /// Runs `cleanup` on every parked handler and forgets them.
    pub fn clear(&mut self) {
        for (_, mut task) in self.parked.drain(..) {
            task.cleanup();
        }
    }
}
