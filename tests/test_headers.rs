use chrono::{Datelike, Timelike};
use spindle::error::ParseError;
use spindle::http::headers::{HeaderKind, HeaderValue, Headers, decode_header, parse_cookies};

#[test]
fn test_decoding_table_by_name() {
    assert_eq!(HeaderKind::for_name("Accept"), HeaderKind::QualityList);
    assert_eq!(HeaderKind::for_name("accept-language"), HeaderKind::QualityList);
    assert_eq!(HeaderKind::for_name("Cache-Control"), HeaderKind::List);
    assert_eq!(HeaderKind::for_name("Content-Type"), HeaderKind::List);
    assert_eq!(HeaderKind::for_name("Content-Length"), HeaderKind::Integer);
    assert_eq!(HeaderKind::for_name("DNT"), HeaderKind::Integer);
    assert_eq!(HeaderKind::for_name("DPR"), HeaderKind::Float);
    assert_eq!(HeaderKind::for_name("Cookie"), HeaderKind::Cookie);
    assert_eq!(HeaderKind::for_name("Authorization"), HeaderKind::Auth);
    assert_eq!(HeaderKind::for_name("If-Modified-Since"), HeaderKind::Date);
    assert_eq!(HeaderKind::for_name("Host"), HeaderKind::Text);
}

#[test]
fn test_quality_list_coerces_q_to_float() {
    let value = decode_header("Accept-Language", "en-US, fr;q=0.8, de ; q=0.5").unwrap();
    let items = value.as_list().unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].value, "en-US");
    assert_eq!(items[0].quality, None);
    assert_eq!(items[1].value, "fr");
    assert_eq!(items[1].quality, Some(0.8));
    assert_eq!(items[2].value, "de");
    assert_eq!(items[2].quality, Some(0.5));
}

#[test]
fn test_quality_list_rejects_bad_weight() {
    let err = decode_header("Accept", "text/html;q=high").unwrap_err();
    assert!(matches!(err, ParseError::InvalidHeader { name } if name == "Accept"));
}

#[test]
fn test_list_with_parameters() {
    let value = decode_header("Content-Type", "text/html; charset=\"utf-8\"").unwrap();
    let items = value.as_list().unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].value, "text/html");
    assert_eq!(items[0].param("charset"), Some("utf-8"));
}

#[test]
fn test_list_splits_on_commas() {
    let value = decode_header("Cache-Control", "no-cache, max-age=3600").unwrap();
    let values: Vec<_> = value.as_list().unwrap().iter().map(|i| i.value.as_str()).collect();
    assert_eq!(values, vec!["no-cache", "max-age=3600"]);
}

#[test]
fn test_integer_and_float_headers() {
    assert_eq!(decode_header("DNT", " 1 ").unwrap(), HeaderValue::Integer(1));
    assert_eq!(decode_header("Device-Memory", "0.5").unwrap(), HeaderValue::Float(0.5));
    assert!(decode_header("DNT", "yes").is_err());
}

#[test]
fn test_auth_header_tokens() {
    let value = decode_header("Authorization", "Bearer   abc.def  ").unwrap();
    assert_eq!(value.as_tokens().unwrap(), &["Bearer".to_string(), "abc.def".to_string()]);
}

#[test]
fn test_date_header() {
    let value = decode_header("Date", "Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
    let date = value.as_date().unwrap();
    assert_eq!(date.year(), 1994);
    assert_eq!(date.month(), 11);
    assert_eq!(date.day(), 6);
    assert_eq!(date.hour(), 8);
    assert_eq!(date.second(), 37);

    assert!(decode_header("Date", "yesterday").is_err());
}

#[test]
fn test_other_headers_are_trimmed_text() {
    assert_eq!(
        decode_header("X-Anything", "  spaced out  ").unwrap(),
        HeaderValue::Text("spaced out".to_string())
    );
}

#[test]
fn test_cookie_decoding() {
    let cookies = parse_cookies("a=1; b=2");
    assert_eq!(cookies.len(), 2);
    assert_eq!(cookies["a"], "1");
    assert_eq!(cookies["b"], "2");

    let cookies = parse_cookies("a=1; a=2; flag");
    assert_eq!(cookies["a"], "2");
    assert_eq!(cookies["flag"], "");
}

#[test]
fn test_contains_token() {
    let value = decode_header("Connection", "keep-alive, Upgrade").unwrap();
    assert!(value.contains_token("upgrade"));
    assert!(!value.contains_token("close"));
}

#[test]
fn test_header_map_keeps_order_and_values() {
    let mut headers: Headers = Headers::new();
    headers.append("Set-Cookie", "a=1".to_string());
    headers.append("Content-Type", "text/plain".to_string());
    headers.append("set-cookie", "b=2".to_string());

    let entries: Vec<_> = headers.iter().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "Set-Cookie");
    assert_eq!(entries[0].1, &["a=1".to_string(), "b=2".to_string()]);
    assert_eq!(entries[1].0, "Content-Type");

    headers.set("SET-COOKIE", "c=3".to_string());
    assert_eq!(headers.get_all("Set-Cookie"), &["c=3".to_string()]);
    assert_eq!(headers.len(), 2);

    assert!(headers.remove("content-type").is_some());
    assert!(!headers.contains("Content-Type"));
}
