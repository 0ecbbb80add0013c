//! @ai:module:intent Group consecutive meta lines into blocks with resolved keys
//! @ai:module:layer domain
//! @ai:module:public_api MetaBlock, collect_blocks
//! @ai:module:depends_on classifier, grammar, value, diagnostic
//! @ai:module:stateless true

use crate::classifier::{LineKind, MetaSyntax};
use crate::diagnostic::{Diagnostic, DiagnosticKind, Location};
use crate::grammar::{parse_line, ParsedLine, Token};
use crate::value::{Meta, MetaValue};
use std::collections::BTreeMap;

/// @ai:intent A run of adjacent meta lines describing one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaBlock {
    pub source_file: String,
    /// 1-based line of the first meta line.
    pub start_line: usize,
    /// 1-based line of the last meta line.
    pub end_line: usize,
    pub meta: Meta,
    pub id: Option<String>,
    pub anchor: Option<String>,
}

#[derive(Default)]
struct Fold {
    meta: BTreeMap<String, MetaValue>,
    id: Option<String>,
    anchor: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl MetaBlock {
    /// @ai:intent Fold parsed lines into a block, last occurrence of a key wins
    /// @ai:pre lines is non-empty and ordered by line number
    /// @ai:post the first id and first anchor are kept, later ones are reported
    /// @ai:effects pure
    pub fn fold(source_file: &str, lines: &[ParsedLine]) -> (MetaBlock, Vec<Diagnostic>) {
        let start_line = lines.first().map(|l| l.line_number).unwrap_or(0);
        let end_line = lines.last().map(|l| l.line_number).unwrap_or(start_line);

        let folded = lines
            .iter()
            .flat_map(|line| line.tokens.iter().map(move |t| (line.line_number, t)))
            .fold(Fold::default(), |mut acc, (line_number, token)| {
                match token {
                    Token::Entry(entry) => {
                        acc.meta.insert(entry.key.clone(), entry.value.clone());
                    }
                    Token::Id(name) => keep_first(
                        &mut acc.id,
                        name,
                        "id",
                        source_file,
                        line_number,
                        &mut acc.diagnostics,
                    ),
                    Token::Anchor(name) => keep_first(
                        &mut acc.anchor,
                        name,
                        "anchor",
                        source_file,
                        line_number,
                        &mut acc.diagnostics,
                    ),
                }
                acc
            });

        let block = MetaBlock {
            source_file: source_file.to_string(),
            start_line,
            end_line,
            meta: Meta::from(folded.meta),
            id: folded.id,
            anchor: folded.anchor,
        };

        (block, folded.diagnostics)
    }

    /// @ai:intent Location of the block's first line
    pub fn location(&self) -> Location {
        Location::new(self.source_file.clone(), self.start_line)
    }
}

fn keep_first(
    slot: &mut Option<String>,
    name: &str,
    what: &str,
    source_file: &str,
    line_number: usize,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match slot {
        None => *slot = Some(name.to_string()),
        Some(first) => diagnostics.push(Diagnostic::new(
            DiagnosticKind::DuplicateStructuralToken,
            Location::new(source_file, line_number),
            format!("second {} token `{}` ignored; block keeps `{}`", what, name, first),
        )),
    }
}

/// @ai:intent Split a file's lines into meta blocks
/// @ai:post blocks are ordered by start line; any non-meta line, blank included, ends a run
/// @ai:effects pure
pub fn collect_blocks(
    lines: &[&str],
    syntax: &MetaSyntax,
    source_file: &str,
) -> (Vec<MetaBlock>, Vec<Diagnostic>) {
    let mut blocks = Vec::new();
    let mut diagnostics = Vec::new();
    let mut run: Vec<ParsedLine> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        match syntax.classify_line(line, idx + 1) {
            LineKind::Meta {
                content,
                line_number,
            } => {
                let mut parsed = parse_line(content, source_file, line_number);
                diagnostics.append(&mut parsed.diagnostics);
                run.push(parsed);
            }
            LineKind::Other => {
                if !run.is_empty() {
                    let (block, mut block_diags) = MetaBlock::fold(source_file, &run);
                    diagnostics.append(&mut block_diags);
                    blocks.push(block);
                    run.clear();
                }
            }
        }
    }

    if !run.is_empty() {
        let (block, mut block_diags) = MetaBlock::fold(source_file, &run);
        diagnostics.append(&mut block_diags);
        blocks.push(block);
    }

    (blocks, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blocks_of(source: &str) -> (Vec<MetaBlock>, Vec<Diagnostic>) {
        let lines: Vec<&str> = source.lines().collect();
        collect_blocks(&lines, &MetaSyntax::default(), "mod.py")
    }

    #[test]
    fn test_last_occurrence_wins_across_lines() {
        let (blocks, diags) = blocks_of(
            "# meta: modules=db threads=main\n# meta: modules=storage\ndef f():\n    pass\n",
        );
        assert!(diags.is_empty());
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].meta.get("modules"),
            Some(&MetaValue::Set(vec!["storage".to_string()]))
        );
        assert_eq!(
            blocks[0].meta.get("threads"),
            Some(&MetaValue::Set(vec!["main".to_string()]))
        );
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 2));
    }

    #[test]
    fn test_last_occurrence_wins_on_same_line() {
        let (blocks, _) = blocks_of("# meta: modules=db modules=io\nx = 1\n");
        assert_eq!(
            blocks[0].meta.get("modules"),
            Some(&MetaValue::Set(vec!["io".to_string()]))
        );
    }

    #[test]
    fn test_blank_line_ends_run() {
        let (blocks, _) = blocks_of("# meta: modules=a\n\n# meta: modules=b\nx = 1\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].start_line, 3);
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let (blocks, diags) = blocks_of("# meta: #first\n# meta: #second @A @B\nx = 1\n");
        assert_eq!(blocks[0].id.as_deref(), Some("first"));
        assert_eq!(blocks[0].anchor.as_deref(), Some("A"));
        assert_eq!(diags.len(), 2);
        assert!(diags
            .iter()
            .all(|d| d.kind == DiagnosticKind::DuplicateStructuralToken));
        assert_eq!(diags[0].location.line, 2);
    }

    #[test]
    fn test_block_at_end_of_file() {
        let (blocks, _) = blocks_of("x = 1\n# meta: modules=a");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 2);
    }
}
