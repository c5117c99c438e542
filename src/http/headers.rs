use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::ParseError;

/// Fixed HTTP date format (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Ordered header map.
///
/// Names keep their first-seen spelling and insertion order; lookups are
/// case-insensitive. Every name maps to the list of values it was given,
/// in the order they arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Headers<V = String> {
    entries: Vec<(String, Vec<V>)>,
}

impl<V> Default for Headers<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> Headers<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Appends a value, keeping any earlier values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Replaces every value for `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = vec![value],
            None => self.entries.push((name, vec![value])),
        }
    }

    pub fn get_all(&self, name: &str) -> &[V] {
        self.position(name)
            .map(|idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    /// First value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.get_all(name).first()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<V>> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates names in insertion order with all their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[V])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }
}

/// One element of a comma separated header such as `Accept` or
/// `Content-Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub value: String,
    /// `;key=value` parameters, in order. Parameters without `=` keep an
    /// empty value.
    pub params: Vec<(String, String)>,
    /// The `q` parameter, for content negotiation headers.
    pub quality: Option<f32>,
}

impl ListItem {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// A request header value after per-name decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Text(String),
    Integer(i64),
    Float(f64),
    List(Vec<ListItem>),
    Cookies(HashMap<String, String>),
    Tokens(Vec<String>),
    Date(DateTime<Utc>),
}

impl HeaderValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            HeaderValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            HeaderValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ListItem]> {
        match self {
            HeaderValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tokens(&self) -> Option<&[String]> {
        match self {
            HeaderValue::Tokens(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            HeaderValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// True when the value (or any list element) equals `needle`,
    /// ignoring ASCII case.
    pub fn contains_token(&self, needle: &str) -> bool {
        match self {
            HeaderValue::Text(s) => s
                .split(',')
                .any(|part| part.trim().eq_ignore_ascii_case(needle)),
            HeaderValue::List(items) => items.iter().any(|i| i.value.eq_ignore_ascii_case(needle)),
            HeaderValue::Tokens(tokens) => tokens.iter().any(|t| t.eq_ignore_ascii_case(needle)),
            HeaderValue::Integer(n) => n.to_string() == needle,
            _ => false,
        }
    }
}

/// How a header is decoded, keyed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// Comma list whose items may carry a `q` weight.
    QualityList,
    /// Comma list with `;key=value` parameters.
    List,
    Integer,
    Float,
    Cookie,
    /// Whitespace separated tokens (scheme + credentials).
    Auth,
    Date,
    Text,
}

impl HeaderKind {
    pub fn for_name(name: &str) -> Self {
        const QUALITY: &[&str] = &["accept", "accept-charset", "accept-encoding", "accept-language"];
        const LIST: &[&str] = &[
            "cache-control",
            "allow",
            "connection",
            "content-disposition",
            "content-encoding",
            "content-language",
            "content-type",
            "forwarded",
            "if-match",
            "if-none-match",
            "keep-alive",
            "te",
            "upgrade",
            "via",
            "want-digest",
            "x-forwarded-for",
        ];
        const INTEGER: &[&str] = &["content-length", "dnt", "early-data", "upgrade-insecure-requests"];
        const FLOAT: &[&str] = &["device-memory", "dpr"];
        const AUTH: &[&str] = &["authorization", "proxy-authorization", "www-authenticate", "proxy-authenticate"];
        const DATE: &[&str] = &["date", "if-modified-since", "if-unmodified-since"];

        let lower = name.to_ascii_lowercase();
        let lower = lower.as_str();
        if QUALITY.contains(&lower) {
            HeaderKind::QualityList
        } else if LIST.contains(&lower) {
            HeaderKind::List
        } else if INTEGER.contains(&lower) {
            HeaderKind::Integer
        } else if FLOAT.contains(&lower) {
            HeaderKind::Float
        } else if lower == "cookie" {
            HeaderKind::Cookie
        } else if AUTH.contains(&lower) {
            HeaderKind::Auth
        } else if DATE.contains(&lower) {
            HeaderKind::Date
        } else {
            HeaderKind::Text
        }
    }
}

/// Decodes a raw header value according to the table in [`HeaderKind`].
pub fn decode_header(name: &str, raw: &str) -> Result<HeaderValue, ParseError> {
    let invalid = || ParseError::InvalidHeader { name: name.to_string() };
    let raw = raw.trim();

    let value = match HeaderKind::for_name(name) {
        HeaderKind::QualityList => HeaderValue::List(
            split_list(raw)
                .map(|item| {
                    let mut item = parse_list_item(item);
                    if let Some(q) = item.param("q") {
                        item.quality = Some(q.parse().map_err(|_| invalid())?);
                    }
                    Ok(item)
                })
                .collect::<Result<_, ParseError>>()?,
        ),
        HeaderKind::List => HeaderValue::List(split_list(raw).map(parse_list_item).collect()),
        HeaderKind::Integer => HeaderValue::Integer(raw.parse().map_err(|_| invalid())?),
        HeaderKind::Float => HeaderValue::Float(raw.parse().map_err(|_| invalid())?),
        HeaderKind::Cookie => HeaderValue::Cookies(parse_cookies(raw)),
        HeaderKind::Auth => HeaderValue::Tokens(raw.split_whitespace().map(str::to_string).collect()),
        HeaderKind::Date => HeaderValue::Date(
            NaiveDateTime::parse_from_str(raw, HTTP_DATE_FORMAT)
                .map_err(|_| invalid())?
                .and_utc(),
        ),
        HeaderKind::Text => HeaderValue::Text(raw.to_string()),
    };

    Ok(value)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_list_item(item: &str) -> ListItem {
    let mut parts = item.split(';').map(str::trim);
    let value = parts.next().unwrap_or_default().to_string();
    let params = parts
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v.trim().trim_matches('"').to_string()),
            None => (p.to_string(), String::new()),
        })
        .collect();

    ListItem {
        value,
        params,
        quality: None,
    }
}

/// `a=1; b=2` → `{a: 1, b: 2}`. Later duplicates win.
pub fn parse_cookies(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            if pair.is_empty() {
                return None;
            }
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
