//! @ai:module:intent Typed meta values and per-key value semantics
//! @ai:module:layer domain
//! @ai:module:public_api KeyKind, MetaValue, Callers, Meta
//! @ai:module:stateless true

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// @ai:intent Value semantics of a meta key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// `modules`, `threads`: lowercased set of strings.
    Set,
    /// `callers`: `*`, a count, or a list of caller symbols.
    Callers,
    /// `flags`: set of single characters.
    Flags,
    /// Any other key, kept verbatim.
    Opaque,
}

impl KeyKind {
    /// @ai:intent Look up the semantics of a key
    /// @ai:example ("modules") -> Set
    /// @ai:example ("owner") -> Opaque
    /// @ai:effects pure
    pub fn of(key: &str) -> Self {
        match key {
            "modules" | "threads" => KeyKind::Set,
            "callers" => KeyKind::Callers,
            "flags" => KeyKind::Flags,
            _ => KeyKind::Opaque,
        }
    }
}

/// @ai:intent The `callers` value: unbounded, a count, or named callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callers {
    Unbounded,
    Count(u64),
    Symbols(Vec<String>),
}

impl Serialize for Callers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Callers::Unbounded => serializer.serialize_str("*"),
            Callers::Count(n) => serializer.serialize_u64(*n),
            Callers::Symbols(symbols) => symbols.serialize(serializer),
        }
    }
}

/// @ai:intent A typed meta value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Set(Vec<String>),
    Callers(Callers),
    Flags(Vec<char>),
    List(Vec<String>),
}

impl MetaValue {
    /// @ai:intent Interpret comma-split segments according to the key's semantics
    /// @ai:pre segments contain no empty strings
    /// @ai:post Err carries a human readable reason; the entry is then dropped
    /// @ai:effects pure
    pub fn parse(key: &str, segments: &[&str]) -> Result<Self, String> {
        match KeyKind::of(key) {
            KeyKind::Set => Ok(MetaValue::Set(unique_lowercase(segments))),
            KeyKind::Callers => parse_callers(segments).map(MetaValue::Callers),
            KeyKind::Flags => parse_flags(segments).map(MetaValue::Flags),
            KeyKind::Opaque => Ok(MetaValue::List(
                segments.iter().map(|s| s.to_string()).collect(),
            )),
        }
    }

    /// @ai:intent Rebuild a typed value from its JSON form
    /// @ai:effects pure
    pub fn from_json(key: &str, value: serde_json::Value) -> Result<Self, String> {
        use serde_json::Value;

        match (KeyKind::of(key), value) {
            (KeyKind::Callers, Value::String(s)) if s == "*" => {
                Ok(MetaValue::Callers(Callers::Unbounded))
            }
            (KeyKind::Callers, Value::Number(n)) => n
                .as_u64()
                .map(|n| MetaValue::Callers(Callers::Count(n)))
                .ok_or_else(|| format!("`{}` count must be a non-negative integer", key)),
            (KeyKind::Callers, Value::Array(items)) => {
                Ok(MetaValue::Callers(Callers::Symbols(string_array(key, items)?)))
            }
            (KeyKind::Flags, Value::Array(items)) => {
                let flags = string_array(key, items)?;
                let refs: Vec<&str> = flags.iter().map(String::as_str).collect();
                parse_flags(&refs).map(MetaValue::Flags)
            }
            (KeyKind::Flags, Value::String(s)) => {
                Ok(MetaValue::Flags(unique_chars(s.chars())))
            }
            (KeyKind::Set, Value::Array(items)) => Ok(MetaValue::Set(string_array(key, items)?)),
            (KeyKind::Opaque, Value::Array(items)) => {
                Ok(MetaValue::List(string_array(key, items)?))
            }
            (_, other) => Err(format!("unexpected value for `{}`: {}", key, other)),
        }
    }

    /// @ai:intent String members of set and list values
    /// @ai:effects pure
    pub fn strings(&self) -> &[String] {
        match self {
            MetaValue::Set(values) | MetaValue::List(values) => values,
            MetaValue::Callers(Callers::Symbols(values)) => values,
            _ => &[],
        }
    }
}

fn string_array(key: &str, items: Vec<serde_json::Value>) -> Result<Vec<String>, String> {
    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(s) => Ok(s),
            other => Err(format!("`{}` must contain only strings, found {}", key, other)),
        })
        .collect()
}

fn unique_lowercase(segments: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(segments.len());
    for segment in segments {
        let lowered = segment.to_lowercase();
        if !out.contains(&lowered) {
            out.push(lowered);
        }
    }
    out
}

fn unique_chars(chars: impl Iterator<Item = char>) -> Vec<char> {
    let mut out = Vec::new();
    for ch in chars {
        if !out.contains(&ch) {
            out.push(ch);
        }
    }
    out
}

/// A digit string too large for `u64` is kept verbatim as a one-element symbol list.
fn parse_callers(segments: &[&str]) -> Result<Callers, String> {
    match segments {
        [] | ["*"] => Ok(Callers::Unbounded),
        [single] if single.bytes().all(|b| b.is_ascii_digit()) => Ok(single
            .parse::<u64>()
            .map(Callers::Count)
            .unwrap_or_else(|_| Callers::Symbols(vec![single.to_string()]))),
        many => Ok(Callers::Symbols(many.iter().map(|s| s.to_string()).collect())),
    }
}

fn parse_flags(segments: &[&str]) -> Result<Vec<char>, String> {
    let mut chars = Vec::with_capacity(segments.len());
    for segment in segments {
        let mut it = segment.chars();
        match (it.next(), it.next()) {
            (Some(ch), None) => chars.push(ch),
            _ => return Err(format!("flag `{}` is not a single character", segment)),
        }
    }
    Ok(unique_chars(chars.into_iter()))
}

/// @ai:intent Resolved key to value mapping of one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Meta(BTreeMap<String, MetaValue>);

impl Meta {
    /// @ai:intent Look up a key
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// @ai:intent String members of a set or list key, empty if absent
    /// @ai:effects pure
    pub fn strings(&self, key: &str) -> &[String] {
        self.0.get(key).map(MetaValue::strings).unwrap_or(&[])
    }

    /// @ai:intent Flag characters, empty if absent
    pub fn flags(&self) -> &[char] {
        match self.0.get("flags") {
            Some(MetaValue::Flags(flags)) => flags,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, MetaValue>> for Meta {
    fn from(map: BTreeMap<String, MetaValue>) -> Self {
        Self(map)
    }
}

impl<'de> Deserialize<'de> for Meta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                MetaValue::from_json(&key, value)
                    .map(|typed| (key, typed))
                    .map_err(D::Error::custom)
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Meta)
    }
}
