//! Error types shared by the parser, the handlers and the event loop.
//!
//! Every failure is contained to the connection it happened on; nothing
//! here is allowed to stop the loop.

use std::io;

/// Malformed request data. Answered with `400 Bad Request` and a dropped
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed request line")]
    InvalidRequestLine,
    #[error("unsupported method {0:?}")]
    InvalidMethod(String),
    #[error("malformed header {name:?}")]
    InvalidHeader { name: String },
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
}

/// Failure raised while constructing or driving a handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler explicitly does not implement this request.
    #[error("not implemented")]
    NotImplemented,
    /// The response carries a status code with no known reason phrase.
    #[error("unknown status code {0}")]
    UnknownStatus(u16),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type HandlerResult<T> = Result<T, HandlerError>;

/// What went wrong on a connection, as reported in the logs.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("no route matched {path:?}")]
    RouteNotFound { path: String },
    #[error("handler not implemented")]
    HandlerUnimplemented,
    #[error("handler failed: {0}")]
    HandlerFailure(HandlerError),
    #[error("connection fault: {0}")]
    Connection(#[from] io::Error),
}

impl From<HandlerError> for Fault {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::NotImplemented => Fault::HandlerUnimplemented,
            other => Fault::HandlerFailure(other),
        }
    }
}

/// Reset and broken-pipe faults mean the peer went away.
pub fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}
