use spindle::error::HandlerError;
use spindle::http::response::{Response, reason_phrase};
use spindle::http::writer::{Flush, ResponseWriter, write_head};

#[test]
fn test_reason_phrases() {
    assert_eq!(reason_phrase(100), Some("Continue"));
    assert_eq!(reason_phrase(101), Some("Switching Protocols"));
    assert_eq!(reason_phrase(200), Some("OK"));
    assert_eq!(reason_phrase(302), Some("Found"));
    assert_eq!(reason_phrase(404), Some("Not Found"));
    assert_eq!(reason_phrase(418), Some("I'm a teapot"));
    assert_eq!(reason_phrase(500), Some("Internal Server Error"));
    assert_eq!(reason_phrase(501), Some("Not Implemented"));
    assert_eq!(reason_phrase(511), Some("Network Authentication Required"));
}

#[test]
fn test_unknown_codes_have_no_phrase() {
    for code in [0, 99, 199, 299, 419, 509, 512, 999] {
        assert_eq!(reason_phrase(code), None, "code {code}");
    }
}

#[test]
fn test_response_defaults() {
    let response = Response::new();
    assert_eq!(response.status, 200);
    assert!(response.headers.is_empty());
    assert!(response.body.is_empty());
}

#[test]
fn test_set_body_sets_content_length() {
    let mut response = Response::new();
    response.set_body("Hello, World!");
    assert_eq!(response.body, b"Hello, World!".to_vec());
    assert_eq!(response.header("Content-Length"), Some("13"));
}

#[test]
fn test_set_header_replaces_add_header_appends() {
    let mut response = Response::new();
    response.add_header("Set-Cookie", "a=1");
    response.add_header("Set-Cookie", "b=2");
    assert_eq!(response.headers.get_all("Set-Cookie").len(), 2);

    response.set_header("Set-Cookie", "c=3");
    assert_eq!(response.headers.get_all("Set-Cookie"), &["c=3".to_string()]);
}

#[test]
fn test_redirect() {
    let mut response = Response::new();
    response.redirect("/elsewhere", false);
    assert_eq!(response.status, 302);
    assert_eq!(response.header("Location"), Some("/elsewhere"));

    response.redirect("/forever", true);
    assert_eq!(response.status, 301);
    assert_eq!(response.header("Location"), Some("/forever"));
}

#[test]
fn test_write_head_layout() {
    let mut response = Response::new();
    response.set_status(201);
    response.add_header("X-B", "1");
    response.add_header("X-A", "2");
    response.add_header("X-B", "3");

    let mut out = Vec::new();
    write_head(&response, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 201 Created\r\nX-B: 1\r\nX-B: 3\r\nX-A: 2\r\n\r\n"
    );
}

#[test]
fn test_write_head_unknown_status_is_an_error() {
    let mut response = Response::new();
    response.set_status(299);

    let mut out = Vec::new();
    let err = write_head(&response, &mut out).unwrap_err();
    assert!(matches!(err, HandlerError::UnknownStatus(299)));
    assert!(out.is_empty());
}

/// Accepts at most `budget` bytes, then reports would-block.
struct Throttled {
    taken: Vec<u8>,
    budget: usize,
}

impl std::io::Write for Throttled {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.budget == 0 {
            return Err(std::io::ErrorKind::WouldBlock.into());
        }
        let n = buf.len().min(self.budget).min(4);
        self.budget -= n;
        self.taken.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_writer_resumes_after_would_block() {
    let mut writer = ResponseWriter::new();
    writer.push(b"0123456789");

    let mut sink = Throttled { taken: Vec::new(), budget: 6 };
    assert_eq!(writer.flush_to(&mut sink).unwrap(), Flush::Pending);
    assert_eq!(writer.pending(), 4);

    sink.budget = 100;
    assert_eq!(writer.flush_to(&mut sink).unwrap(), Flush::Done);
    assert!(writer.is_empty());
    assert_eq!(sink.taken, b"0123456789".to_vec());
}
