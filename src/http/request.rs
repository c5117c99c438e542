use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::BytesMut;

use crate::http::headers::{HeaderValue, Headers};

/// HTTP request methods.
///
/// The standard methods get their own variant. Any other well-formed method
/// token (`PROPFIND`, `MKCOL`, ...) is kept verbatim in [`Method::Other`] so
/// the request can still be routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// TRACE - Loop the request back to the client
    TRACE,
    /// An extension method, exactly as the client sent it
    Other(String),
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - The method token from the request line (case-sensitive)
    ///
    /// # Returns
    ///
    /// * `Some(Method)` - A standard variant, or [`Method::Other`] for any
    ///   other valid token
    /// * `None` - If `s` is empty or contains characters not allowed in a token
    ///
    /// # Example
    ///
    /// ```
    /// # use spindle::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), Some(Method::Other("get".to_string())));
    /// assert_eq!(Method::from_str("GE(T"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let method = match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            "CONNECT" => Method::CONNECT,
            "TRACE" => Method::TRACE,
            _ if is_token(s) => Method::Other(s.to_string()),
            _ => return None,
        };
        Some(method)
    }

    /// The method as it appears on the request line.
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::CONNECT => "CONNECT",
            Method::TRACE => "TRACE",
            Method::Other(name) => name,
        }
    }
}

/// RFC 9110 `token`: one or more visible characters other than delimiters.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// An HTTP request, filled in incrementally by [`Request::update`].
///
/// Until [`Request::is_ready`] returns true the fields reflect whatever has
/// been parsed so far. Once ready, further input is ignored and the request
/// does not change.
#[derive(Debug, Clone)]
pub struct Request {
    /// `None` until the request line has been parsed.
    pub method: Option<Method>,
    /// Path without the query string.
    pub path: String,
    /// HTTP version from the request line, `HTTP/1.1` when omitted
    pub version: String,
    /// Query arguments. Duplicate keys keep the last value.
    pub args: HashMap<String, String>,
    /// Decoded header values, in arrival order.
    pub headers: Headers<HeaderValue>,
    /// Merged from every `Cookie` header.
    pub cookies: HashMap<String, String>,
    /// Exactly `Content-Length` bytes; anything beyond is discarded
    pub body: Vec<u8>,
    /// Address of the client, when the request came from a socket
    pub peer: Option<SocketAddr>,

    pub(crate) content_length: usize,
    pub(crate) partial: BytesMut,
    pub(crate) request_line_done: bool,
    pub(crate) headers_done: bool,
    pub(crate) ready: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: None,
            path: String::new(),
            version: String::new(),
            args: HashMap::new(),
            headers: Headers::new(),
            cookies: HashMap::new(),
            body: Vec::new(),
            peer: None,
            content_length: 0,
            partial: BytesMut::new(),
            request_line_done: false,
            headers_done: false,
            ready: false,
        }
    }
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request for bytes arriving from `peer`.
    pub fn from_peer(peer: SocketAddr) -> Self {
        Self {
            peer: Some(peer),
            ..Self::default()
        }
    }

    /// Declared body length (0 when no `Content-Length` was sent).
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn is_request_line_parsed(&self) -> bool {
        self.request_line_done
    }

    pub fn is_headers_complete(&self) -> bool {
        self.headers_done
    }

    /// True once the headers are complete and the body has reached the
    /// declared length.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// First decoded value for the header `name`.
    ///
    /// # Arguments
    ///
    /// * `name` - Header name, matched case-insensitively
    ///
    /// # Example
    ///
    /// ```
    /// # use spindle::http::request::Request;
    /// let mut req = Request::new();
    /// req.update(b"GET / HTTP/1.1\r\nContent-Length: 0\r\n\r\n").unwrap();
    /// assert_eq!(req.header("content-length").and_then(|v| v.as_integer()), Some(0));
    /// ```
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Every decoded value for `name`, in arrival order.
    pub fn header_values(&self, name: &str) -> &[HeaderValue] {
        self.headers.get_all(name)
    }

    /// First plain-text value for `name`.
    pub fn header_text(&self, name: &str) -> Option<&str> {
        self.header(name).and_then(HeaderValue::as_text)
    }

    /// Query argument `key`, if present.
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The method token, or `""` before the request line is parsed.
    pub fn method_str(&self) -> &str {
        self.method.as_ref().map(Method::as_str).unwrap_or("")
    }
}

/// Splits a request target into path and query arguments.
///
/// The query is split on `&` and then `=`. Keys and values are
/// percent-decoded and `+` becomes a space, so `?q=a%20b` and `?q=a+b` both
/// give `q = "a b"`. A key without `=` maps to an empty value.
///
/// # Example
///
/// ```
/// # use spindle::http::request::split_target;
/// let (path, args) = split_target("/search?q=cats&lang=en");
/// assert_eq!(path, "/search");
/// assert_eq!(args["q"], "cats");
/// assert_eq!(args["lang"], "en");
/// ```
pub fn split_target(target: &str) -> (String, HashMap<String, String>) {
    match target.split_once('?') {
        Some((path, query)) => {
            let args = url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect();
            (path.to_string(), args)
        }
        None => (target.to_string(), HashMap::new()),
    }
}
