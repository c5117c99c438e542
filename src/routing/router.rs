use std::sync::Arc;

use regex::Regex;
use tracing::{debug, error, warn};

use crate::config::{HandlerKind, RouteEntry};
use crate::error::{Fault, HandlerError, HandlerResult};
use crate::handler::{
    FixedHandler, Handler, HandlerTask, RedirectHandler, StaticFileHandler, TextHandler,
    WebSocketHandler,
};
use crate::http::request::Request;
use crate::routing::RouteConfig;

/// Builds a handler for a matched request.
pub type HandlerFactory =
    Arc<dyn Fn(&Request, &RouteConfig) -> HandlerResult<Box<dyn Handler>> + Send + Sync>;

/// What the event loop should do with a dispatched request.
pub enum Dispatch {
    /// Send `output`; keep the connection as a channel when `upgrade` is set.
    Respond {
        output: Vec<u8>,
        upgrade: Option<HandlerTask>,
    },
    /// The handler is waiting on its defer condition.
    Deferred(HandlerTask),
    /// Even the fallback failed; close without answering.
    Drop,
}

/// Which built-in answer to fall back on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    NotFound,
    InternalError,
    NotImplemented,
}

pub struct Route {
    source: String,
    pattern: Regex,
    factory: HandlerFactory,
    config: RouteConfig,
}

impl Route {
    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Ordered route table with fallback handlers.
pub struct Router {
    routes: Vec<Route>,
    not_found: HandlerFactory,
    internal_error: HandlerFactory,
    not_implemented: HandlerFactory,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn fixed(handler: FixedHandler) -> HandlerFactory {
    Arc::new(move |_: &Request, _: &RouteConfig| -> HandlerResult<Box<dyn Handler>> {
        Ok(Box::new(handler))
    })
}

fn build_builtin(
    kind: HandlerKind,
    config: &RouteConfig,
    static_chunk_size: usize,
) -> HandlerResult<Box<dyn Handler>> {
    let handler: Box<dyn Handler> = match kind {
        HandlerKind::Text => Box::new(TextHandler::from_config(config)?),
        HandlerKind::Static => {
            Box::new(StaticFileHandler::from_config(config)?.chunk_size(static_chunk_size))
        }
        HandlerKind::Redirect => Box::new(RedirectHandler::from_config(config)?),
        HandlerKind::Websocket => Box::new(WebSocketHandler::from_config(config)?),
    };
    Ok(handler)
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: fixed(FixedHandler::not_found()),
            internal_error: fixed(FixedHandler::internal_error()),
            not_implemented: fixed(FixedHandler::not_implemented()),
        }
    }

    /// Registers a route. `pattern` is a regular expression matched against
    /// the whole path (the query string never takes part).
    pub fn add<F>(&mut self, pattern: &str, factory: F, config: RouteConfig) -> Result<(), regex::Error>
    where
        F: Fn(&Request, &RouteConfig) -> HandlerResult<Box<dyn Handler>> + Send + Sync + 'static,
    {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        self.routes.push(Route {
            source: pattern.to_string(),
            pattern: anchored,
            factory: Arc::new(factory),
            config,
        });
        Ok(())
    }

    pub fn route<F>(mut self, pattern: &str, factory: F) -> Result<Self, regex::Error>
    where
        F: Fn(&Request, &RouteConfig) -> HandlerResult<Box<dyn Handler>> + Send + Sync + 'static,
    {
        self.add(pattern, factory, RouteConfig::new())?;
        Ok(self)
    }

    pub fn route_with<F>(
        mut self,
        pattern: &str,
        factory: F,
        config: RouteConfig,
    ) -> Result<Self, regex::Error>
    where
        F: Fn(&Request, &RouteConfig) -> HandlerResult<Box<dyn Handler>> + Send + Sync + 'static,
    {
        self.add(pattern, factory, config)?;
        Ok(self)
    }

    /// Replaces one of the fallback handlers.
    pub fn set_fallback<F>(&mut self, which: Fallback, factory: F)
    where
        F: Fn(&Request, &RouteConfig) -> HandlerResult<Box<dyn Handler>> + Send + Sync + 'static,
    {
        let factory: HandlerFactory = Arc::new(factory);
        match which {
            Fallback::NotFound => self.not_found = factory,
            Fallback::InternalError => self.internal_error = factory,
            Fallback::NotImplemented => self.not_implemented = factory,
        }
    }

    /// Builds the route table described in the configuration file.
    pub fn from_entries(entries: &[RouteEntry], static_chunk_size: usize) -> anyhow::Result<Self> {
        let mut router = Router::new();
        for entry in entries {
            let kind = entry.handler;
            router.add(
                &entry.path,
                move |_: &Request, config: &RouteConfig| build_builtin(kind, config, static_chunk_size),
                entry.options.clone(),
            )?;
        }
        Ok(router)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route, in registration order, whose pattern matches `path`.
    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    /// Runs a ready request through construction and `preprocess`, and on
    /// to completion unless the handler defers.
    pub fn dispatch(&self, request: Request) -> Dispatch {
        let Some(route) = self.find(&request.path) else {
            let fault = Fault::RouteNotFound { path: request.path.clone() };
            debug!(error = %fault, "Dispatching fallback");
            return self.fallback(Fallback::NotFound, request);
        };

        debug!(
            method = request.method_str(),
            path = %request.path,
            route = route.pattern(),
            "Dispatching request"
        );

        let handler = match (route.factory)(&request, &route.config) {
            Ok(handler) => handler,
            Err(err) => return self.fail(err, request),
        };

        let mut task = HandlerTask::new(handler, request);
        if let Err(err) = task.preprocess() {
            return self.abort(task, err);
        }

        if task.poll_deferred() {
            debug!(path = %task.exchange().request().path, "Handler deferred");
            return Dispatch::Deferred(task);
        }

        self.finish(task)
    }

    /// Postprocesses and serializes a task whose defer condition is clear.
    pub fn finish(&self, mut task: HandlerTask) -> Dispatch {
        match task.complete() {
            Ok(output) if task.is_upgrade() => Dispatch::Respond {
                output,
                upgrade: Some(task),
            },
            Ok(output) => {
                task.cleanup();
                Dispatch::Respond { output, upgrade: None }
            }
            Err(err) => self.abort(task, err),
        }
    }

    fn abort(&self, mut task: HandlerTask, err: HandlerError) -> Dispatch {
        task.cleanup();
        self.fail(err, task.into_request())
    }

    fn fail(&self, err: HandlerError, request: Request) -> Dispatch {
        let fault = Fault::from(err);
        let which = match fault {
            Fault::HandlerUnimplemented => Fallback::NotImplemented,
            _ => Fallback::InternalError,
        };
        warn!(error = %fault, path = %request.path, "Handler failed, dispatching fallback");
        self.fallback(which, request)
    }

    fn fallback(&self, which: Fallback, request: Request) -> Dispatch {
        let factory = match which {
            Fallback::NotFound => &self.not_found,
            Fallback::InternalError => &self.internal_error,
            Fallback::NotImplemented => &self.not_implemented,
        };

        let path = request.path.clone();
        match run_fallback(factory, request) {
            Ok(output) => Dispatch::Respond { output, upgrade: None },
            Err(err) => {
                error!(error = %err, path = %path, fallback = ?which, "Fallback failed, dropping connection");
                Dispatch::Drop
            }
        }
    }
}

/// Fallbacks run straight through; they never defer or upgrade.
fn run_fallback(factory: &HandlerFactory, request: Request) -> HandlerResult<Vec<u8>> {
    let handler = factory(&request, &RouteConfig::new())?;
    let mut task = HandlerTask::new(handler, request);
    let result = task.preprocess().and_then(|()| task.complete());
    task.cleanup();
    result
}
