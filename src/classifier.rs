//! @ai:module:intent Classify raw source lines as meta comment lines or other lines
//! @ai:module:layer domain
//! @ai:module:public_api MetaSyntax, LineKind
//! @ai:module:depends_on config, error
//! @ai:module:stateless true

use crate::config::SyntaxConfig;
use crate::error::{Error, Result};
use regex::Regex;

/// @ai:intent Classification of one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A meta comment; `content` is the trimmed text after the marker.
    Meta { content: &'a str, line_number: usize },
    Other,
}

/// @ai:intent Compiled recognizer for meta comment lines
#[derive(Debug, Clone)]
pub struct MetaSyntax {
    comment: String,
    meta_re: Regex,
}

impl MetaSyntax {
    /// @ai:intent Compile the recognizer from a comment token and marker
    /// @ai:pre comment and marker are non-empty
    /// @ai:effects pure
    pub fn new(comment: &str, marker: &str) -> Result<Self> {
        let comment = comment.trim();
        let marker = marker.trim();
        if comment.is_empty() || marker.is_empty() {
            return Err(Error::Syntax(
                "comment token and marker must not be empty".to_string(),
            ));
        }

        let pattern = format!(
            r"^\s*{}\s*{}(.*)$",
            regex::escape(comment),
            regex::escape(marker)
        );
        let meta_re = Regex::new(&pattern).map_err(|e| Error::Syntax(e.to_string()))?;

        Ok(Self {
            comment: comment.to_string(),
            meta_re,
        })
    }

    /// @ai:intent Build the recognizer described by configuration
    pub fn from_config(config: &SyntaxConfig) -> Result<Self> {
        Self::new(&config.comment, &config.marker)
    }

    /// @ai:intent Classify one line; purely lexical, never looks at neighbours
    /// @ai:example ("  # meta: modules=db", 4) -> Meta { content: "modules=db", line_number: 4 }
    /// @ai:example ("# plain comment", 1) -> Other
    /// @ai:effects pure
    pub fn classify_line<'a>(&self, line: &'a str, line_number: usize) -> LineKind<'a> {
        match self.meta_re.captures(line).and_then(|c| c.get(1)) {
            Some(body) => LineKind::Meta {
                content: body.as_str().trim(),
                line_number,
            },
            None => LineKind::Other,
        }
    }

    /// @ai:intent Check whether a line is a meta comment line
    /// @ai:effects pure
    pub fn is_meta_line(&self, line: &str) -> bool {
        self.meta_re.is_match(line)
    }

    /// @ai:intent Check whether a line is any comment in the host syntax
    /// @ai:effects pure
    pub fn is_comment(&self, line: &str) -> bool {
        line.trim_start().starts_with(&self.comment)
    }
}

impl Default for MetaSyntax {
    fn default() -> Self {
        Self::new("#", "meta:").expect("default meta syntax is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_meta_line() {
        let syntax = MetaSyntax::default();
        assert_eq!(
            syntax.classify_line("    # meta: modules=db threads=main  ", 12),
            LineKind::Meta {
                content: "modules=db threads=main",
                line_number: 12
            }
        );
    }

    #[test]
    fn test_marker_spacing_is_insignificant() {
        let syntax = MetaSyntax::default();
        assert_eq!(
            syntax.classify_line("#meta:modules=db", 1),
            LineKind::Meta {
                content: "modules=db",
                line_number: 1
            }
        );
    }

    #[test]
    fn test_other_lines() {
        let syntax = MetaSyntax::default();
        assert_eq!(syntax.classify_line("", 1), LineKind::Other);
        assert_eq!(syntax.classify_line("# just a comment", 2), LineKind::Other);
        assert_eq!(syntax.classify_line("x = 1  # meta: nope", 3), LineKind::Other);
        assert!(syntax.is_comment("   # just a comment"));
    }

    #[test]
    fn test_custom_syntax() {
        let syntax = MetaSyntax::new("//", "meta:").unwrap();
        assert!(syntax.is_meta_line("// meta: modules=io"));
        assert!(!syntax.is_meta_line("# meta: modules=io"));
    }

    #[test]
    fn test_rejects_empty_marker() {
        assert!(MetaSyntax::new("#", "  ").is_err());
    }
}
