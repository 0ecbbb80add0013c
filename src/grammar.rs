//! @ai:module:intent Parse the token grammar of one meta comment line
//! @ai:module:layer domain
//! @ai:module:public_api MetaEntry, Token, ParsedLine, parse_line
//! @ai:module:depends_on value, diagnostic
//! @ai:module:stateless true

use crate::diagnostic::{Diagnostic, DiagnosticKind, Location};
use crate::value::MetaValue;
use once_cell::sync::Lazy;
use regex::Regex;

static EQUALS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*=\s*").expect("Invalid regex"));
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid regex"));

/// @ai:intent One `key=value` pair from a meta line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    pub key: String,
    pub raw_value: String,
    pub value: MetaValue,
}

/// @ai:intent A recognized token on a meta line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Id(String),
    Anchor(String),
    Entry(MetaEntry),
}

/// @ai:intent Tokens and problems found on one meta line
#[derive(Debug, Clone, Default)]
pub struct ParsedLine {
    pub line_number: usize,
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// @ai:intent Parse the content of a meta line into tokens
/// @ai:pre content is the text after the meta marker
/// @ai:post every token is either in tokens or reported in diagnostics
/// @ai:example ("modules = db  #state") -> [Entry(modules=[db]), Id(state)]
/// @ai:effects pure
pub fn parse_line(content: &str, source_file: &str, line_number: usize) -> ParsedLine {
    let mut parsed = ParsedLine {
        line_number,
        ..Default::default()
    };

    let normalized = EQUALS_RE.replace_all(content.trim(), "=");

    for raw in normalized.split_whitespace() {
        match parse_token(raw) {
            Ok(token) => parsed.tokens.push(token),
            Err(reason) => parsed.diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedEntry,
                Location::new(source_file, line_number),
                format!("malformed meta token `{}`: {}", raw, reason),
            )),
        }
    }

    parsed
}

/// @ai:intent Classify a single whitespace-free token
/// @ai:effects pure
fn parse_token(raw: &str) -> Result<Token, String> {
    if !raw.contains('=') {
        if let Some(name) = raw.strip_prefix('#') {
            if name.is_empty() {
                return Err("empty id".to_string());
            }
            return Ok(Token::Id(name.to_string()));
        }
        if let Some(name) = raw.strip_prefix('@') {
            if !NAME_RE.is_match(name) {
                return Err("anchor names use letters, digits, `_` and `-`".to_string());
            }
            return Ok(Token::Anchor(name.to_string()));
        }
        return Err("expected `key=value`, `#id` or `@anchor`".to_string());
    }

    let (key, raw_value) = raw.split_once('=').unwrap_or((raw, ""));

    if !NAME_RE.is_match(key) {
        return Err(format!("bad key `{}`", key));
    }

    let segments: Vec<&str> = if raw_value.is_empty() {
        Vec::new()
    } else {
        raw_value.split(',').collect()
    };

    for segment in &segments {
        if segment.is_empty() {
            return Err("empty value in list".to_string());
        }
        if segment.contains('=') {
            return Err(format!("bad value `{}`", segment));
        }
    }

    let value = MetaValue::parse(key, &segments)?;

    Ok(Token::Entry(MetaEntry {
        key: key.to_string(),
        raw_value: raw_value.to_string(),
        value,
    }))
}
