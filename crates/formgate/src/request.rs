//! Untrusted input.
//!
//! The engine never looks at a transport. It asks a [`Request`] for the raw
//! value posted under a field's code and gets back an [`Input`]: text as
//! undecoded bytes, a flat list, or a map. [`QueryRequest`] adapts
//! `application/x-www-form-urlencoded` data with the usual `a[]` / `a[k]`
//! nesting conventions.

use indexmap::IndexMap;
use percent_encoding::percent_decode;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// A raw posted value, before sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Text exactly as received; not necessarily valid UTF-8.
    Text(Vec<u8>),
    List(Vec<Input>),
    Map(Vec<(String, Input)>),
}

impl Input {
    pub fn text(bytes: impl AsRef<[u8]>) -> Self {
        Input::Text(bytes.as_ref().to_vec())
    }

    pub fn list<T: Into<Input>>(items: impl IntoIterator<Item = T>) -> Self {
        Input::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<K: Into<String>, T: Into<Input>>(entries: impl IntoIterator<Item = (K, T)>) -> Self {
        Input::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Convert a decoded JSON value. `null` is treated as absent.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;
        Some(match value {
            Json::Null => return None,
            Json::String(s) => Input::text(s),
            Json::Bool(b) => Input::text(b.to_string()),
            Json::Number(n) => Input::text(n.to_string()),
            Json::Array(items) => Input::List(items.iter().filter_map(Input::from_json).collect()),
            Json::Object(entries) => Input::Map(
                entries
                    .iter()
                    .filter_map(|(k, v)| Input::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            ),
        })
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::text(s)
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Text(s.into_bytes())
    }
}

impl From<Vec<u8>> for Input {
    fn from(bytes: Vec<u8>) -> Self {
        Input::Text(bytes)
    }
}

impl From<&[u8]> for Input {
    fn from(bytes: &[u8]) -> Self {
        Input::text(bytes)
    }
}

/// Source of untrusted values, keyed by external field code.
pub trait Request {
    fn param(&self, code: &str) -> Option<Input>;
}

impl Request for HashMap<String, Input> {
    fn param(&self, code: &str) -> Option<Input> {
        self.get(code).cloned()
    }
}

impl Request for IndexMap<String, Input> {
    fn param(&self, code: &str) -> Option<Input> {
        self.get(code).cloned()
    }
}

impl Request for BTreeMap<String, Input> {
    fn param(&self, code: &str) -> Option<Input> {
        self.get(code).cloned()
    }
}

impl Request for serde_json::Map<String, serde_json::Value> {
    fn param(&self, code: &str) -> Option<Input> {
        self.get(code).and_then(Input::from_json)
    }
}

/// Request parsed from a URL query or urlencoded body.
///
/// Values are kept byte-exact, so input that is not valid UTF-8 reaches
/// validation instead of being replaced here. For repeated plain keys the
/// last value wins; `a[]` keys collect a list and `a[k]` keys a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    params: IndexMap<String, Input>,
}

#[derive(Debug)]
enum Node {
    Leaf(Vec<u8>),
    List(Vec<Node>),
    Map(IndexMap<String, Node>),
}

#[derive(Debug)]
enum Segment {
    Key(String),
    Push,
}

impl QueryRequest {
    pub fn parse(query: &str) -> Self {
        Self::parse_bytes(query.as_bytes())
    }

    pub fn parse_bytes(query: &[u8]) -> Self {
        let query = query.strip_prefix(b"?").unwrap_or(query);
        let mut root: IndexMap<String, Node> = IndexMap::new();

        for pair in query.split(|&b| b == b'&') {
            if pair.is_empty() {
                continue;
            }
            let (raw_key, raw_value) = match pair.iter().position(|&b| b == b'=') {
                Some(pos) => (&pair[..pos], &pair[pos + 1..]),
                None => (pair, &b""[..]),
            };
            let key = String::from_utf8_lossy(&decode(raw_key)).into_owned();
            let value = decode(raw_value);

            let Some((base, path)) = split_key(&key) else {
                continue;
            };
            let slot = root.entry(base).or_insert(Node::Map(IndexMap::new()));
            if path.is_empty() {
                *slot = Node::Leaf(value);
            } else {
                insert(slot, &path, value);
            }
        }

        Self {
            params: root.into_iter().map(|(k, v)| (k, v.into_input())).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }
}

impl Request for QueryRequest {
    fn param(&self, code: &str) -> Option<Input> {
        self.params.get(code).cloned()
    }
}

/// Percent-decode a query component, treating `+` as space.
fn decode(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect();
    percent_decode(&spaced).collect()
}

/// Deepest bracket path accepted in a query key.
pub const MAX_NESTING: usize = 100;

/// Split `a[b][]` into `a` and its bracket path. Keys with unbalanced
/// brackets are taken literally. Keys nested deeper than [`MAX_NESTING`]
/// are dropped.
fn split_key(key: &str) -> Option<(String, Vec<Segment>)> {
    let Some(open) = key.find('[') else {
        return (!key.is_empty()).then(|| (key.to_string(), Vec::new()));
    };
    let base = &key[..open];
    if base.is_empty() {
        return None;
    }

    let mut path = Vec::new();
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            return Some((key.to_string(), Vec::new()));
        };
        if path.len() == MAX_NESTING {
            warn!(base, depth = MAX_NESTING, "query key nested too deep, dropped");
            return None;
        }
        let name = &inner[..close];
        path.push(if name.is_empty() {
            Segment::Push
        } else {
            Segment::Key(name.to_string())
        });
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        return Some((key.to_string(), Vec::new()));
    }
    Some((base.to_string(), path))
}

fn insert(slot: &mut Node, path: &[Segment], value: Vec<u8>) {
    let Some((head, rest)) = path.split_first() else {
        *slot = Node::Leaf(value);
        return;
    };
    match head {
        Segment::Key(key) => {
            if !matches!(slot, Node::Map(_)) {
                *slot = Node::Map(IndexMap::new());
            }
            if let Node::Map(map) = slot {
                let child = map
                    .entry(key.clone())
                    .or_insert_with(|| Node::Map(IndexMap::new()));
                insert(child, rest, value);
            }
        }
        Segment::Push => {
            if !matches!(slot, Node::List(_)) {
                *slot = Node::List(Vec::new());
            }
            if let Node::List(items) = slot {
                // `a[][k]=..` keeps filling the last map until a key repeats.
                let reuse_last = match (rest.first(), items.last()) {
                    (Some(Segment::Key(k)), Some(Node::Map(last))) => !last.contains_key(k),
                    _ => false,
                };
                if !reuse_last {
                    items.push(match rest.first() {
                        None => Node::Leaf(Vec::new()),
                        Some(Segment::Key(_)) => Node::Map(IndexMap::new()),
                        Some(Segment::Push) => Node::List(Vec::new()),
                    });
                }
                if let Some(last) = items.last_mut() {
                    insert(last, rest, value);
                }
            }
        }
    }
}

impl Node {
    fn into_input(self) -> Input {
        match self {
            Node::Leaf(bytes) => Input::Text(bytes),
            Node::List(items) => Input::List(items.into_iter().map(Node::into_input).collect()),
            Node::Map(map) => Input::Map(map.into_iter().map(|(k, v)| (k, v.into_input())).collect()),
        }
    }
}
