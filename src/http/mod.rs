//! HTTP/1.1 wire handling.
//!
//! - **`request`**: the request model plus query and method helpers
//! - **`headers`**: ordered header map and the per-name value decoding table
//! - **`parser`**: incremental parsing of request bytes as they arrive
//! - **`response`**: response model and status reason phrases
//! - **`writer`**: response serialization and non-blocking flushing
//! - **`connection`**: per-socket state for one request/response cycle
//! - **`websocket`**: upgrade handshake checks and accept key derivation
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← bytes fed to Request::update
//!        └──────┬──────┘
//!               │ request ready → dispatch
//!       ┌───────┴─────────┐
//!       ▼                 ▼
//!  ┌─────────┐      ┌───────────┐
//!  │ Parked  │ ───▶ │  Writing  │ ← flush serialized response
//!  └─────────┘      └─────┬─────┘
//!   defer cleared         ├─ upgraded → channel set
//!                         └─ otherwise → closed
//! ```

pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod websocket;
pub mod writer;
