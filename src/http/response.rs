use crate::http::headers::Headers;

/// Returns the standard reason phrase for a status code, or `None` for a
/// code outside the table.
///
/// ```
/// # use spindle::http::response::reason_phrase;
/// assert_eq!(reason_phrase(200), Some("OK"));
/// assert_eq!(reason_phrase(418), Some("I'm a teapot"));
/// assert_eq!(reason_phrase(299), None);
/// ```
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    let phrase = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _ => return None,
    };
    Some(phrase)
}

/// The response a handler is building.
///
/// Headers keep insertion order and may carry several values per name;
/// each value is written as its own header line.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers<String>,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Replaces any existing values for `name`.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value.into());
    }

    /// Adds another value for `name`, keeping the earlier ones.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.append(name, value.into());
    }

    /// Sets the body and a matching `Content-Length`.
    ///
    /// # Arguments
    ///
    /// * `body` - Anything convertible to bytes (`&str`, `String`, `Vec<u8>`)
    ///
    /// # Example
    ///
    /// ```
    /// # use spindle::http::response::Response;
    /// let mut resp = Response::new();
    /// resp.set_body("Hello world");
    /// assert_eq!(resp.header("Content-Length"), Some("11"));
    /// ```
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
        self.set_header("Content-Length", self.body.len().to_string());
    }

    /// 301 when `permanent`, otherwise 302, pointing at `location`.
    ///
    /// # Arguments
    ///
    /// * `location` - Value for the `Location` header
    /// * `permanent` - Choose 301 Moved Permanently over 302 Found
    pub fn redirect(&mut self, location: impl Into<String>, permanent: bool) {
        self.status = if permanent { 301 } else { 302 };
        self.set_header("Location", location);
    }

    /// First value set for `name`, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
