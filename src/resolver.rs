//! @ai:module:intent Find the code element or anchor a meta block binds to
//! @ai:module:layer domain
//! @ai:module:public_api BindingTarget, SymbolType, ResolvedTarget, SymbolResolver
//! @ai:module:depends_on block, classifier, matchers, scope, diagnostic
//! @ai:module:stateless false

use crate::block::MetaBlock;
use crate::classifier::MetaSyntax;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::matchers::{bracket_delta, is_decorator, match_line, LineShape};
use crate::scope::ScopeTracker;
use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Reported kind of a bound symbol
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SymbolType {
    Function,
    Class,
    Assignment,
    Anchor,
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolType::Function => "function",
            SymbolType::Class => "class",
            SymbolType::Assignment => "assignment",
            SymbolType::Anchor => "anchor",
        })
    }
}

/// @ai:intent The element a meta block attaches to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingTarget {
    Function(String),
    Class(String),
    Assignment(String),
    AnchorOnly(String),
}

impl BindingTarget {
    /// @ai:effects pure
    pub fn symbol_type(&self) -> SymbolType {
        match self {
            BindingTarget::Function(_) => SymbolType::Function,
            BindingTarget::Class(_) => SymbolType::Class,
            BindingTarget::Assignment(_) => SymbolType::Assignment,
            BindingTarget::AnchorOnly(_) => SymbolType::Anchor,
        }
    }

    /// @ai:intent Surface name of the target
    /// @ai:effects pure
    pub fn name(&self) -> &str {
        match self {
            BindingTarget::Function(name)
            | BindingTarget::Class(name)
            | BindingTarget::Assignment(name)
            | BindingTarget::AnchorOnly(name) => name,
        }
    }
}

/// @ai:intent A resolved target plus where and inside what it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub target: BindingTarget,
    /// Enclosing scope names, outermost first; empty for anchors.
    pub path: Vec<String>,
    /// 1-based line of the binding site.
    pub site_line: usize,
}

/// @ai:intent Resolves blocks of one file in line order
pub struct SymbolResolver<'a> {
    lines: &'a [&'a str],
    syntax: &'a MetaSyntax,
    scopes: ScopeTracker<'a>,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(lines: &'a [&'a str], syntax: &'a MetaSyntax) -> Self {
        Self {
            lines,
            syntax,
            scopes: ScopeTracker::new(lines),
        }
    }

    /// @ai:intent Resolve the target of a block
    /// @ai:pre blocks are passed in increasing line order
    /// @ai:post Err is an UnboundBlock diagnostic located at the block's first line
    pub fn resolve(&mut self, block: &MetaBlock) -> Result<ResolvedTarget, Diagnostic> {
        // end_line is 1-based, so it is also the index of the following line
        let start = block.end_line;

        if let Some(anchor) = &block.anchor {
            return self.resolve_anchor(block, anchor, start);
        }

        let idx = self.skip_to_substantive(block, start)?;
        let line = self.lines[idx];
        let context = self.scopes.context_at(idx);

        let target = match match_line(line) {
            Some(LineShape::Function(name)) => BindingTarget::Function(name),
            Some(LineShape::Class(name)) => BindingTarget::Class(name),
            Some(LineShape::Assignment(name)) => BindingTarget::Assignment(name),
            Some(LineShape::LiteralEntry(key)) if context.in_literal => {
                BindingTarget::Assignment(key)
            }
            _ => {
                return Err(unbound(
                    block,
                    format!("line {} is not a bindable symbol: `{}`", idx + 1, line.trim()),
                ))
            }
        };

        Ok(ResolvedTarget {
            target,
            path: context.path,
            site_line: idx + 1,
        })
    }

    fn resolve_anchor(
        &self,
        block: &MetaBlock,
        anchor: &str,
        start: usize,
    ) -> Result<ResolvedTarget, Diagnostic> {
        let site = (start..self.lines.len()).find(|&i| !self.lines[i].trim().is_empty());

        match site {
            Some(idx) if !self.syntax.is_meta_line(self.lines[idx]) => Ok(ResolvedTarget {
                target: BindingTarget::AnchorOnly(anchor.to_string()),
                path: Vec::new(),
                site_line: idx + 1,
            }),
            Some(idx) => Err(unbound(
                block,
                format!(
                    "anchor `{}` is followed by another meta block at line {}",
                    anchor,
                    idx + 1
                ),
            )),
            None => Err(unbound(
                block,
                format!("anchor `{}` has nothing following it", anchor),
            )),
        }
    }

    /// Skips blank lines, plain comments and decorators (with their bracketed arguments).
    fn skip_to_substantive(&self, block: &MetaBlock, start: usize) -> Result<usize, Diagnostic> {
        let mut idx = start;

        loop {
            let Some(line) = self.lines.get(idx) else {
                return Err(unbound(block, "meta block reaches end of file"));
            };

            if line.trim().is_empty() {
                idx += 1;
            } else if self.syntax.is_meta_line(line) {
                return Err(unbound(
                    block,
                    format!("meta block is followed by another meta block at line {}", idx + 1),
                ));
            } else if self.syntax.is_comment(line) {
                idx += 1;
            } else if is_decorator(line) {
                let mut in_triple = None;
                let mut depth = bracket_delta(line, &mut in_triple);
                idx += 1;
                while depth > 0 && idx < self.lines.len() {
                    depth += bracket_delta(self.lines[idx], &mut in_triple);
                    idx += 1;
                }
            } else {
                return Ok(idx);
            }
        }
    }
}

fn unbound(block: &MetaBlock, message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::UnboundBlock, block.location(), message)
}
