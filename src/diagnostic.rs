//! @ai:module:intent Diagnostics collected while scanning meta comments
//! @ai:module:layer domain
//! @ai:module:public_api Diagnostic, DiagnosticKind, Severity, Location
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Severity level for a diagnostic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// @ai:intent Closed taxonomy of problems the scanner can report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    MalformedEntry,
    DuplicateStructuralToken,
    UnboundBlock,
    IdentifierCollision,
    UnreadableSource,
}

impl DiagnosticKind {
    /// @ai:intent Stable short code shown next to messages
    /// @ai:effects pure
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::MalformedEntry => "M001",
            DiagnosticKind::DuplicateStructuralToken => "M002",
            DiagnosticKind::UnboundBlock => "B001",
            DiagnosticKind::IdentifierCollision => "I001",
            DiagnosticKind::UnreadableSource => "S001",
        }
    }

    /// @ai:intent Default severity for each kind
    /// @ai:effects pure
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::MalformedEntry
            | DiagnosticKind::DuplicateStructuralToken
            | DiagnosticKind::UnboundBlock => Severity::Warning,
            DiagnosticKind::IdentifierCollision | DiagnosticKind::UnreadableSource => {
                Severity::Error
            }
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MalformedEntry => "malformed-entry",
            DiagnosticKind::DuplicateStructuralToken => "duplicate-structural-token",
            DiagnosticKind::UnboundBlock => "unbound-block",
            DiagnosticKind::IdentifierCollision => "identifier-collision",
            DiagnosticKind::UnreadableSource => "unreadable-source",
        };
        f.write_str(name)
    }
}

/// @ai:intent A position in a scanned source file, by logical file name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    /// @ai:intent Create a new Location
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// @ai:intent A single problem found while scanning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub location: Location,
    /// Earlier location involved in the problem, e.g. the first holder of a colliding id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<Location>,
}

impl Diagnostic {
    /// @ai:intent Build a diagnostic with the kind's default severity and code
    /// @ai:effects pure
    pub fn new(kind: DiagnosticKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            code: kind.code().to_string(),
            message: message.into(),
            location,
            related: None,
        }
    }

    /// @ai:intent Attach a related earlier location
    pub fn with_related(mut self, related: Location) -> Self {
        self.related = Some(related);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.location, self.message, self.code)?;
        if let Some(related) = &self.related {
            write!(f, " [first at {}]", related)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_severity() {
        let diag = Diagnostic::new(
            DiagnosticKind::UnboundBlock,
            Location::new("a.py", 3),
            "meta block is not followed by a bindable symbol",
        );
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code, "B001");
    }

    #[test]
    fn test_display_includes_related() {
        let diag = Diagnostic::new(
            DiagnosticKind::IdentifierCollision,
            Location::new("b.py", 7),
            "identifier `db` already registered",
        )
        .with_related(Location::new("a.py", 2));

        assert_eq!(
            diag.to_string(),
            "b.py:7: identifier `db` already registered (I001) [first at a.py:2]"
        );
    }
}
