//! WebSocket opening handshake (RFC 6455, section 4.2).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha1::{Digest, Sha1};

use crate::http::request::{Method, Request};

const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// `Sec-WebSocket-Accept` for a client key.
///
/// ```
/// # use spindle::http::websocket::accept_key;
/// assert_eq!(accept_key("dGhlIHNhbXBsZSBub25jZQ=="), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
/// ```
pub fn accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Why a request cannot be upgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeError {
    NotGet,
    MissingUpgradeToken,
    UnsupportedVersion,
    MissingKey,
}

/// Checks the upgrade request and returns the client key.
pub fn validate_handshake(req: &Request) -> Result<&str, HandshakeError> {
    if req.method != Some(Method::GET) {
        return Err(HandshakeError::NotGet);
    }

    let upgrade_requested = req
        .header_values("Connection")
        .iter()
        .any(|v| v.contains_token("upgrade"));
    if !upgrade_requested {
        return Err(HandshakeError::MissingUpgradeToken);
    }

    let version_ok = req
        .header_values("Sec-WebSocket-Version")
        .iter()
        .any(|v| v.contains_token("13"));
    if !version_ok {
        return Err(HandshakeError::UnsupportedVersion);
    }

    req.header_text("Sec-WebSocket-Key")
        .filter(|k| !k.is_empty())
        .ok_or(HandshakeError::MissingKey)
}
