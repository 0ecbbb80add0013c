//! @ai:module:intent Track the lexical nesting path (classes, functions, literals) while walking a file
//! @ai:module:layer domain
//! @ai:module:public_api ScopeTracker, ScopeContext
//! @ai:module:depends_on matchers
//! @ai:module:stateless false

use crate::matchers::{is_open_bracket, match_line, scan_brackets, LineShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    /// `class` or `def` body, closed by dedent.
    Block,
    /// Bracketed literal, closed when bracket depth drops below `depth`.
    Literal,
}

#[derive(Debug, Clone)]
struct Scope {
    name: String,
    kind: ScopeKind,
    indent: usize,
    depth: usize,
}

/// @ai:intent Nesting information for one line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    /// Names of enclosing scopes, outermost first.
    pub path: Vec<String>,
    /// The innermost open bracket at the line is a `{`, named or not.
    pub in_literal: bool,
}

/// @ai:intent Forward-only scope tracker over a file's lines
///
/// Lines must be queried in non-decreasing order; the tracker never seeks back.
pub struct ScopeTracker<'a> {
    lines: &'a [&'a str],
    cursor: usize,
    stack: Vec<Scope>,
    /// Open brackets, innermost last.
    open: Vec<u8>,
    in_triple: Option<&'static str>,
}

impl<'a> ScopeTracker<'a> {
    /// @ai:intent Start tracking at the top of a file
    pub fn new(lines: &'a [&'a str]) -> Self {
        Self {
            lines,
            cursor: 0,
            stack: Vec::new(),
            open: Vec::new(),
            in_triple: None,
        }
    }

    /// @ai:intent Nesting context in effect at a 0-based line index
    /// @ai:pre idx is not smaller than any index queried before
    pub fn context_at(&mut self, idx: usize) -> ScopeContext {
        while self.cursor < idx && self.cursor < self.lines.len() {
            self.observe(self.cursor);
            self.cursor += 1;
        }

        if let Some(line) = self.lines.get(idx) {
            if self.in_triple.is_none() && is_code(line) {
                let depth = self.open.len();
                self.close_scopes(indent_of(line), depth);
            }
        }

        ScopeContext {
            path: self.stack.iter().map(|s| s.name.clone()).collect(),
            in_literal: self.open.last() == Some(&b'{'),
        }
    }

    fn observe(&mut self, idx: usize) {
        let line = self.lines[idx];
        let starts_in_string = self.in_triple.is_some();
        let depth_before = self.open.len();
        let in_dict = self.open.last() == Some(&b'{');

        let open = &mut self.open;
        scan_brackets(line, &mut self.in_triple, |bracket| {
            if is_open_bracket(bracket) {
                open.push(bracket);
            } else {
                open.pop();
            }
        });
        let depth_after = self.open.len();

        if starts_in_string || !is_code(line) {
            return;
        }

        let indent = indent_of(line);
        self.close_scopes(indent, depth_before);

        match match_line(line) {
            Some(LineShape::Function(name)) | Some(LineShape::Class(name)) if depth_before == 0 => {
                self.stack.push(Scope {
                    name,
                    kind: ScopeKind::Block,
                    indent,
                    depth: 0,
                });
            }
            Some(LineShape::Assignment(name)) if depth_before == 0 && depth_after > 0 => {
                self.stack.push(Scope {
                    name,
                    kind: ScopeKind::Literal,
                    indent,
                    depth: depth_after,
                });
            }
            Some(LineShape::LiteralEntry(key)) if in_dict && depth_after > depth_before => {
                self.stack.push(Scope {
                    name: key,
                    kind: ScopeKind::Literal,
                    indent,
                    depth: depth_after,
                });
            }
            _ => {}
        }
    }

    /// Pops scopes that end before a code line starting at `indent` and bracket `depth`.
    fn close_scopes(&mut self, indent: usize, depth: usize) {
        if depth == 0 {
            while let Some(top) = self.stack.last() {
                let closed = match top.kind {
                    ScopeKind::Literal => true,
                    ScopeKind::Block => top.indent >= indent,
                };
                if !closed {
                    break;
                }
                self.stack.pop();
            }
        } else {
            while self
                .stack
                .last()
                .is_some_and(|s| s.kind == ScopeKind::Literal && s.depth > depth)
            {
                self.stack.pop();
            }
        }
    }
}

fn is_code(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_at(source: &str, line_number: usize) -> ScopeContext {
        let lines: Vec<&str> = source.lines().collect();
        let mut tracker = ScopeTracker::new(&lines);
        tracker.context_at(line_number - 1)
    }

    #[test]
    fn test_top_level_has_empty_path() {
        let ctx = path_at("import os\n\ndb = []\n", 3);
        assert!(ctx.path.is_empty());
        assert!(!ctx.in_literal);
    }

    #[test]
    fn test_method_inside_class() {
        let source = "class Store:\n    def open(self):\n        pass\n\n    def close(self):\n        pass\n";
        assert_eq!(path_at(source, 5).path, vec!["Store".to_string()]);
    }

    #[test]
    fn test_dedent_closes_class() {
        let source = "class Store:\n    x = 1\n\ndef free():\n    pass\n";
        assert!(path_at(source, 4).path.is_empty());
    }

    #[test]
    fn test_multiline_signature_keeps_function_open() {
        let source = "def f(\n    a,\n):\n    inner = 1\n";
        assert_eq!(path_at(source, 4).path, vec!["f".to_string()]);
    }

    #[test]
    fn test_nested_literal_entries() {
        let source = "SETTINGS = {\n    \"db\": {\n        \"url\": \"x\",\n    },\n    \"cache\": 1,\n}\nafter = 2\n";
        let url = path_at(source, 3);
        assert_eq!(url.path, vec!["SETTINGS".to_string(), "db".to_string()]);
        assert!(url.in_literal);

        let cache = path_at(source, 5);
        assert_eq!(cache.path, vec!["SETTINGS".to_string()]);
        assert!(cache.in_literal);

        assert!(path_at(source, 7).path.is_empty());
    }

    #[test]
    fn test_unnamed_dict_is_a_literal() {
        let source = "def make():\n    return {\n        \"db\": connect(),\n    }\n";
        let ctx = path_at(source, 3);
        assert_eq!(ctx.path, vec!["make".to_string()]);
        assert!(ctx.in_literal);
    }

    #[test]
    fn test_dict_inside_list() {
        let source = "ROUTES = [\n    {\n        \"path\": \"/\",\n    },\n]\n";
        let ctx = path_at(source, 3);
        assert_eq!(ctx.path, vec!["ROUTES".to_string()]);
        assert!(ctx.in_literal);

        let list_item = path_at("ROUTES = [\n    \"a\",\n]\n", 2);
        assert!(!list_item.in_literal);
    }

    #[test]
    fn test_entry_nested_in_unnamed_dict_is_named() {
        let source = "register({\n    \"db\": {\n        \"url\": \"x\",\n    },\n})\n";
        assert_eq!(path_at(source, 3).path, vec!["db".to_string()]);
    }

    #[test]
    fn test_docstring_does_not_confuse_nesting() {
        let source = "class A:\n    \"\"\"\nclass Fake:\n    \"\"\"\n    def m(self):\n        pass\n";
        assert_eq!(path_at(source, 5).path, vec!["A".to_string()]);
    }
}
