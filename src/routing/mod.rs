//! Path routing and handler dispatch.
//!
//! Routes are tried in registration order and the first anchored match
//! wins. Requests no route accepts, and handlers that fail, are answered by
//! the router's fallback handlers (404, 500, 501).

pub mod config;
pub mod router;

pub use config::RouteConfig;
pub use router::{Dispatch, Fallback, HandlerFactory, Route, Router};
