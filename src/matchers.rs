//! @ai:module:intent Recognize the handful of Python line shapes a meta block can bind to
//! @ai:module:layer domain
//! @ai:module:public_api LineShape, match_line, is_decorator, bracket_delta, scan_brackets, is_open_bracket
//! @ai:module:stateless true

use once_cell::sync::Lazy;
use regex::Regex;

/// @ai:intent Lexical shape of a source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape {
    Function(String),
    Class(String),
    Assignment(String),
    /// `"key": value` line, only meaningful inside an enclosing literal.
    LiteralEntry(String),
}

#[derive(Clone, Copy)]
enum ShapeKind {
    Function,
    Class,
    Assignment,
    LiteralEntry,
}

struct Matcher {
    kind: ShapeKind,
    re: Regex,
}

/// Tried in order; the first match wins.
static MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    [
        (
            ShapeKind::Function,
            r"^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(",
        ),
        (ShapeKind::Class, r"^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)\s*[\(:]"),
        (
            ShapeKind::Assignment,
            r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?::[^=]+)?=(?:[^=]|$)",
        ),
        (
            ShapeKind::LiteralEntry,
            r#"^\s*(?:"([^"\\]+)"|'([^'\\]+)')\s*:"#,
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| Matcher {
        kind,
        re: Regex::new(pattern).expect("Invalid regex pattern"),
    })
    .collect()
});

/// Reserved words that can precede `:` in a compound statement such as `else: x = 1`.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

static DECORATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*@").expect("Invalid regex"));

/// @ai:intent Classify a line by trying each shape matcher in priority order
/// @ai:example ("async def load(x):") -> Some(Function("load"))
/// @ai:example ("    \"db\": {") -> Some(LiteralEntry("db"))
/// @ai:example ("return x") -> None
/// @ai:effects pure
pub fn match_line(line: &str) -> Option<LineShape> {
    MATCHERS.iter().find_map(|matcher| {
        let captures = matcher.re.captures(line)?;
        let name = captures
            .iter()
            .skip(1)
            .flatten()
            .next()?
            .as_str()
            .to_string();

        if matches!(matcher.kind, ShapeKind::Assignment) && KEYWORDS.contains(&name.as_str()) {
            return None;
        }

        Some(match matcher.kind {
            ShapeKind::Function => LineShape::Function(name),
            ShapeKind::Class => LineShape::Class(name),
            ShapeKind::Assignment => LineShape::Assignment(name),
            ShapeKind::LiteralEntry => LineShape::LiteralEntry(name),
        })
    })
}

/// @ai:intent Check whether a line starts a decorator
/// @ai:effects pure
pub fn is_decorator(line: &str) -> bool {
    DECORATOR_RE.is_match(line)
}

/// @ai:intent Net bracket depth change of a line, skipping strings and comments
/// @ai:pre in_triple carries the open triple quote from the previous line, if any
/// @ai:post in_triple holds the triple quote still open at end of line
/// @ai:effects pure
pub fn bracket_delta(line: &str, in_triple: &mut Option<&'static str>) -> i64 {
    let mut delta = 0;
    scan_brackets(line, in_triple, |bracket| {
        if is_open_bracket(bracket) {
            delta += 1;
        } else {
            delta -= 1;
        }
    });
    delta
}

/// @ai:intent Whether a bracket byte reported by `scan_brackets` opens a group
/// @ai:effects pure
pub fn is_open_bracket(bracket: u8) -> bool {
    matches!(bracket, b'(' | b'[' | b'{')
}

/// @ai:intent Report every bracket of a line in order, skipping strings and comments
/// @ai:pre in_triple carries the open triple quote from the previous line, if any
/// @ai:post in_triple holds the triple quote still open at end of line
pub fn scan_brackets(
    line: &str,
    in_triple: &mut Option<&'static str>,
    mut on_bracket: impl FnMut(u8),
) {
    let bytes = line.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if let Some(quote) = *in_triple {
            match line[i..].find(quote) {
                Some(pos) => {
                    i += pos + quote.len();
                    *in_triple = None;
                    continue;
                }
                None => break,
            }
        }

        match bytes[i] {
            b'#' => break,
            q @ (b'"' | b'\'') => {
                let triple = if q == b'"' { "\"\"\"" } else { "'''" };
                if line[i..].starts_with(triple) {
                    *in_triple = Some(triple);
                    i += triple.len();
                    continue;
                }
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            bracket @ (b'(' | b'[' | b'{' | b')' | b']' | b'}') => {
                on_bracket(bracket);
                i += 1;
            }
            _ => i += 1,
        }
    }
}
