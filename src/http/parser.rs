//! Incremental request parsing.
//!
//! Bytes may arrive split at any point, including in the middle of a line.
//! Complete CRLF-terminated lines are consumed as they become available and
//! the incomplete tail is kept in the request's partial buffer until the
//! next call.

use crate::error::ParseError;
use crate::http::headers::{HeaderValue, decode_header};
use crate::http::request::{Method, Request, split_target};

impl Request {
    /// Feeds the next chunk of bytes read from the socket.
    ///
    /// Once the request is ready, further calls are no-ops. Bytes past the
    /// declared `Content-Length` are discarded.
    pub fn update(&mut self, data: &[u8]) -> Result<(), ParseError> {
        if self.ready {
            return Ok(());
        }

        self.partial.extend_from_slice(data);

        while !self.headers_done {
            let Some(pos) = find_crlf(&self.partial) else {
                return Ok(());
            };
            let line = self.partial.split_to(pos + 2);
            let line = &line[..pos];

            if !self.request_line_done {
                // Stray CRLFs ahead of the request line are tolerated.
                if !line.is_empty() {
                    self.parse_request_line(line)?;
                }
            } else if line.is_empty() {
                self.headers_done = true;
            } else {
                self.parse_header_line(line)?;
            }
        }

        self.take_body();
        Ok(())
    }

    fn parse_request_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
        let mut parts = line.split(' ').map(str::trim).filter(|p| !p.is_empty());

        let method = parts.next().ok_or(ParseError::InvalidRequestLine)?;
        let target = parts.next().ok_or(ParseError::InvalidRequestLine)?;
        let version = parts.next().unwrap_or("HTTP/1.1");

        let method =
            Method::from_str(method).ok_or_else(|| ParseError::InvalidMethod(method.to_string()))?;
        let (path, args) = split_target(target);

        self.method = Some(method);
        self.path = path;
        self.args = args;
        self.version = version.to_string();
        self.request_line_done = true;
        Ok(())
    }

    fn parse_header_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
        let (name, raw) = line.split_once(':').ok_or_else(|| ParseError::InvalidHeader {
            name: line.to_string(),
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseError::InvalidHeader { name: line.to_string() });
        }

        let value = if name.eq_ignore_ascii_case("Content-Length") {
            let value = decode_header(name, raw).map_err(|_| ParseError::InvalidContentLength)?;
            let length = value.as_integer().unwrap_or(-1);
            self.content_length =
                usize::try_from(length).map_err(|_| ParseError::InvalidContentLength)?;
            value
        } else {
            decode_header(name, raw)?
        };

        if let HeaderValue::Cookies(cookies) = &value {
            self.cookies
                .extend(cookies.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        self.headers.append(name, value);
        Ok(())
    }

    fn take_body(&mut self) {
        let wanted = self.content_length - self.body.len();
        let take = wanted.min(self.partial.len());
        self.body.extend_from_slice(&self.partial[..take]);
        self.partial.clear();
        self.ready = self.body.len() == self.content_length;
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
