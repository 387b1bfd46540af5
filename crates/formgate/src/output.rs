//! Wire output: external parameter maps, query strings and URLs.

use indexmap::IndexMap;
use serde::Serialize;
use url::form_urlencoded;

/// A field value in wire form, with every scalar already formatted as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WireValue {
    Single(String),
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

impl WireValue {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            WireValue::Single(s) => Some(s),
            _ => None,
        }
    }
}

/// Encode external parameters as an `application/x-www-form-urlencoded` string.
///
/// Arrays use `code[]` pairs, hashes `code[key]` pairs, in map order. Codes,
/// keys and values are escaped; the brackets themselves are kept literal.
pub fn encode_query(params: &IndexMap<String, WireValue>) -> String {
    let mut pairs = Vec::new();
    for (code, value) in params {
        let code = escape(code);
        match value {
            WireValue::Single(v) => pairs.push(format!("{}={}", code, escape(v))),
            WireValue::List(items) => pairs.extend(
                items
                    .iter()
                    .map(|item| format!("{}[]={}", code, escape(item))),
            ),
            WireValue::Map(entries) => pairs.extend(
                entries
                    .iter()
                    .map(|(key, v)| format!("{}[{}]={}", code, escape(key), escape(v))),
            ),
        }
    }
    pairs.join("&")
}

fn escape(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Append a query string to a URL, joining with `&` when it already has a query.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, sep, query)
}
