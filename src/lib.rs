//! Spindle - single-threaded HTTP/1.1 server
//!
//! Core library: incremental request parsing, routing to handler objects,
//! the handler lifecycle with cooperative deferral, and the non-blocking
//! event loop tying them together.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod routing;
pub mod server;
