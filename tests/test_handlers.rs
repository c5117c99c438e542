use std::io::Write;

use spindle::error::HandlerError;
use spindle::handler::{
    FixedHandler, FnHandler, HandlerTask, LifecycleState, RedirectHandler, StaticFileHandler,
    TextHandler, WebSocketHandler,
};
use spindle::http::request::Request;
use spindle::routing::RouteConfig;

fn get(path: &str, extra_headers: &str) -> Request {
    let mut req = Request::new();
    req.update(format!("GET {path} HTTP/1.1\r\nHost: test\r\n{extra_headers}\r\n").as_bytes())
        .unwrap();
    assert!(req.is_ready());
    req
}

fn run(mut task: HandlerTask) -> (String, HandlerTask) {
    task.preprocess().unwrap();
    assert!(!task.poll_deferred());
    let out = task.complete().unwrap();
    (String::from_utf8(out).unwrap(), task)
}

#[test]
fn test_task_state_progression() {
    let mut task = HandlerTask::new(Box::new(TextHandler::new("hi")), get("/", ""));
    assert_eq!(task.state(), LifecycleState::Created);

    task.preprocess().unwrap();
    assert_eq!(task.state(), LifecycleState::Preprocessed);

    assert!(!task.poll_deferred());
    assert_eq!(task.state(), LifecycleState::Preprocessed);

    task.complete().unwrap();
    assert_eq!(task.state(), LifecycleState::Dumped);
    assert!(task.is_dumped());

    task.cleanup();
    assert_eq!(task.state(), LifecycleState::Cleaned);
}

#[test]
fn test_text_handler() {
    let handler = TextHandler::new("Hello world").content_type("text/plain");
    let (out, _) = run(HandlerTask::new(Box::new(handler), get("/", "")));
    assert_eq!(
        out,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 11\r\n\r\nHello world"
    );
}

#[test]
fn test_text_handler_from_config() {
    let config = RouteConfig::new()
        .with("body", "teapot")
        .with("status", 418u64)
        .with("content_type", "text/plain");
    let handler = TextHandler::from_config(&config).unwrap();
    let (out, _) = run(HandlerTask::new(Box::new(handler), get("/", "")));
    assert!(out.starts_with("HTTP/1.1 418 I'm a teapot\r\n"));
    assert!(out.ends_with("\r\n\r\nteapot"));
}

#[test]
fn test_fn_handler_sees_request() {
    let handler = FnHandler::new(|req: &Request, resp: &mut spindle::http::response::Response| {
        let name = req.arg("name").unwrap_or("stranger").to_string();
        resp.set_body(format!("hello {name}"));
        Ok(())
    });
    let (out, _) = run(HandlerTask::new(Box::new(handler), get("/greet?name=ada", "")));
    assert!(out.ends_with("hello ada"));
}

#[test]
fn test_fn_handler_error_propagates() {
    let handler = FnHandler::new(|_: &Request, _: &mut spindle::http::response::Response| {
        Err(HandlerError::NotImplemented)
    });
    let mut task = HandlerTask::new(Box::new(handler), get("/", ""));
    task.preprocess().unwrap();
    assert!(matches!(task.complete(), Err(HandlerError::NotImplemented)));
    assert!(!task.is_dumped());
}

#[test]
fn test_redirect_handler() {
    let config = RouteConfig::new().with("location", "/new").with("permanent", true);
    let handler = RedirectHandler::from_config(&config).unwrap();
    let (out, _) = run(HandlerTask::new(Box::new(handler), get("/old", "")));
    assert_eq!(
        out,
        "HTTP/1.1 301 Moved Permanently\r\nLocation: /new\r\nContent-Length: 0\r\n\r\n"
    );

    let (out, _) = run(HandlerTask::new(
        Box::new(RedirectHandler::new("/tmp", false)),
        get("/old", ""),
    ));
    assert!(out.starts_with("HTTP/1.1 302 Found\r\nLocation: /tmp\r\n"));
}

#[test]
fn test_redirect_handler_requires_location() {
    assert!(RedirectHandler::from_config(&RouteConfig::new()).is_err());
}

#[test]
fn test_static_file_handler_streams_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let contents: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
    file.write_all(&contents).unwrap();
    file.flush().unwrap();

    let handler = StaticFileHandler::new(file.path()).chunk_size(512);
    let mut task = HandlerTask::new(Box::new(handler), get("/file", ""));
    task.preprocess().unwrap();
    let out = task.complete().unwrap();

    let head = b"HTTP/1.1 200 OK\r\nContent-Length: 2000\r\n\r\n";
    assert_eq!(&out[..head.len()], head);
    assert_eq!(&out[head.len()..], contents.as_slice());
}

#[test]
fn test_static_file_handler_missing_file() {
    let config = RouteConfig::new().with("static", "/definitely/not/here.txt");
    let handler = StaticFileHandler::from_config(&config).unwrap();
    let mut task = HandlerTask::new(Box::new(handler), get("/file", ""));
    task.preprocess().unwrap();
    assert!(matches!(task.complete(), Err(HandlerError::Io(_))));
}

#[test]
fn test_fixed_handlers() {
    let (out, _) = run(HandlerTask::new(Box::new(FixedHandler::not_implemented()), get("/", "")));
    assert_eq!(
        out,
        "HTTP/1.1 501 Not Implemented\r\nContent-Length: 43\r\n\r\nThe page you are looking is not implemented"
    );
}

const UPGRADE_HEADERS: &str = "Connection: keep-alive, Upgrade\r\n\
Upgrade: websocket\r\n\
Sec-WebSocket-Version: 13\r\n\
Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n";

#[test]
fn test_websocket_handshake_accepts() {
    let (out, task) = run(HandlerTask::new(
        Box::new(WebSocketHandler::new()),
        get("/ws", UPGRADE_HEADERS),
    ));

    assert!(task.is_upgrade());
    assert_eq!(
        out,
        "HTTP/1.1 101 Switching Protocols\r\n\
Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\
Connection: upgrade\r\n\
Upgrade: websocket\r\n\r\n"
    );
}

#[test]
fn test_websocket_handshake_rejects_missing_key() {
    let headers = "Connection: Upgrade\r\nSec-WebSocket-Version: 13\r\n";
    let (out, task) = run(HandlerTask::new(Box::new(WebSocketHandler::new()), get("/ws", headers)));

    assert!(!task.is_upgrade());
    assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[test]
fn test_websocket_configured_reject_code() {
    let config = RouteConfig::new().with("reject_code", 426u64);
    let handler = WebSocketHandler::from_config(&config).unwrap();
    let (out, task) = run(HandlerTask::new(Box::new(handler), get("/ws", "")));

    assert!(!task.is_upgrade());
    assert!(out.starts_with("HTTP/1.1 426 Upgrade Required\r\n"));
}

#[test]
fn test_websocket_channel_callback() {
    let handler = WebSocketHandler::new().on_message(|data, out| {
        out.write_all(b"echo:")?;
        out.write_all(data)
    });
    let (_, mut task) = run(HandlerTask::new(Box::new(handler), get("/ws", UPGRADE_HEADERS)));

    let mut out = Vec::new();
    task.channel_data(b"ping", &mut out).unwrap();
    assert_eq!(out, b"echo:ping".to_vec());
}
