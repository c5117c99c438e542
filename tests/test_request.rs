use spindle::http::request::{Method, Request, split_target};

#[test]
fn test_split_target_with_query() {
    let (path, args) = split_target("/search?q=cats&lang=en");
    assert_eq!(path, "/search");
    assert_eq!(args.get("q").map(String::as_str), Some("cats"));
    assert_eq!(args.get("lang").map(String::as_str), Some("en"));
}

#[test]
fn test_split_target_without_query() {
    let (path, args) = split_target("/plain/path");
    assert_eq!(path, "/plain/path");
    assert!(args.is_empty());
}

#[test]
fn test_split_target_decodes_escapes_and_bare_keys() {
    let (path, args) = split_target("/s?name=a%20b&flag");
    assert_eq!(path, "/s");
    assert_eq!(args["name"], "a b");
    assert_eq!(args["flag"], "");
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from_str("GET"), Some(Method::GET));
    assert_eq!(Method::from_str("POST"), Some(Method::POST));
    assert_eq!(Method::from_str("get"), Some(Method::Other("get".into()))); // Case-sensitive
    assert_eq!(Method::from_str("GE(T"), None);
    assert_eq!(Method::from_str(""), None);
}

#[test]
fn test_extension_method_is_kept_verbatim() {
    let method = Method::from_str("PROPFIND").unwrap();
    assert_eq!(method, Method::Other("PROPFIND".to_string()));
    assert_eq!(method.as_str(), "PROPFIND");
}

#[test]
fn test_method_round_trips_through_as_str() {
    for m in [Method::GET, Method::PUT, Method::DELETE, Method::TRACE, Method::Other("MKCOL".into())] {
        assert_eq!(Method::from_str(m.as_str()), Some(m));
    }
}

#[test]
fn test_new_request_is_blank() {
    let req = Request::new();
    assert_eq!(req.method, None);
    assert_eq!(req.method_str(), "");
    assert!(req.path.is_empty());
    assert!(!req.is_request_line_parsed());
    assert!(!req.is_headers_complete());
    assert!(!req.is_ready());
    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_remembers_peer() {
    let peer = "10.0.0.7:4242".parse().unwrap();
    let req = Request::from_peer(peer);
    assert_eq!(req.peer, Some(peer));
}

#[test]
fn test_request_accessors() {
    let mut req = Request::new();
    req.update(b"GET /p?x=1 HTTP/1.0\r\nHost: h\r\nCookie: sid=abc\r\n\r\n").unwrap();

    assert_eq!(req.method_str(), "GET");
    assert_eq!(req.version, "HTTP/1.0");
    assert_eq!(req.arg("x"), Some("1"));
    assert_eq!(req.arg("y"), None);
    assert_eq!(req.cookie("sid"), Some("abc"));
    assert_eq!(req.header_text("host"), Some("h"));
    assert_eq!(req.header_text("Missing"), None);
}
