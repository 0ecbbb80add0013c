//! @ai:module:intent Run the per-file pipeline and the whole-run reduction
//! @ai:module:layer application
//! @ai:module:public_api Scanner, FileScan, scan_path
//! @ai:module:depends_on classifier, block, resolver, identity, record, discovery, config, error
//! @ai:module:stateless true

use crate::block::collect_blocks;
use crate::classifier::MetaSyntax;
use crate::config::Config;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Location};
use crate::discovery::{discover, SourceFile};
use crate::error::Result;
use crate::identity::{identify, IdentityRule, QualifiedPath};
use crate::record::{build_inventory, Binding, Inventory};
use crate::resolver::SymbolResolver;
use std::path::Path;

/// @ai:intent Everything one file contributed before corpus-wide checks
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    pub source_file: String,
    pub readable: bool,
    pub blocks: usize,
    pub bindings: Vec<Binding>,
    pub diagnostics: Vec<Diagnostic>,
}

/// @ai:intent Per-file pipeline: classify, parse, aggregate, resolve, identify
pub struct Scanner {
    syntax: MetaSyntax,
    identity: Box<dyn IdentityRule>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            syntax: MetaSyntax::default(),
            identity: Box::new(QualifiedPath::default()),
        }
    }
}

impl Scanner {
    /// @ai:intent Build a scanner from configuration
    /// @ai:effects pure
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            syntax: MetaSyntax::from_config(&config.syntax)?,
            identity: Box::new(QualifiedPath::new(config.identity.separator.clone())),
        })
    }

    /// @ai:intent Replace the identifier derivation rule
    pub fn with_identity_rule(mut self, rule: impl IdentityRule + 'static) -> Self {
        self.identity = Box::new(rule);
        self
    }

    /// @ai:intent Scan in-memory source text
    /// @ai:post every block ends up as a binding or an UnboundBlock diagnostic
    /// @ai:effects pure
    pub fn scan_source(&self, source_file: &str, content: &str) -> FileScan {
        let lines: Vec<&str> = content.lines().collect();
        let (blocks, mut diagnostics) = collect_blocks(&lines, &self.syntax, source_file);
        let mut resolver = SymbolResolver::new(&lines, &self.syntax);
        let mut bindings = Vec::with_capacity(blocks.len());
        let block_count = blocks.len();

        for block in blocks {
            match resolver.resolve(&block) {
                Ok(resolved) => {
                    let id = identify(&block, &resolved, self.identity.as_ref());
                    tracing::trace!(
                        %id,
                        line = block.start_line,
                        site = resolved.site_line,
                        "bound meta block"
                    );
                    bindings.push(Binding {
                        id,
                        block,
                        resolved,
                    });
                }
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        diagnostics.sort_by_key(|d| d.location.line);

        tracing::debug!(
            file = source_file,
            blocks = block_count,
            bindings = bindings.len(),
            diagnostics = diagnostics.len(),
            "scanned source"
        );

        FileScan {
            source_file: source_file.to_string(),
            readable: true,
            blocks: block_count,
            bindings,
            diagnostics,
        }
    }

    /// @ai:intent Read and scan one file; unreadable files become a diagnostic
    /// @ai:effects fs:read
    pub fn scan_file(&self, file: &SourceFile) -> FileScan {
        match std::fs::read_to_string(&file.path) {
            Ok(content) => self.scan_source(&file.name, &content),
            Err(e) => {
                tracing::warn!(file = %file.path.display(), error = %e, "skipping unreadable source");
                FileScan {
                    source_file: file.name.clone(),
                    readable: false,
                    diagnostics: vec![Diagnostic::new(
                        DiagnosticKind::UnreadableSource,
                        Location::new(file.name.clone(), 0),
                        format!("cannot read source: {}", e),
                    )],
                    ..Default::default()
                }
            }
        }
    }

    /// @ai:intent Scan files independently, then reduce them into one inventory
    /// @ai:effects fs:read
    pub fn scan_files(&self, files: &[SourceFile]) -> Inventory {
        let scans = files.iter().map(|file| self.scan_file(file)).collect();
        build_inventory(scans)
    }
}

/// @ai:intent Discover, scan and reduce everything under a path
/// @ai:pre path exists
/// @ai:effects fs:read
pub fn scan_path(path: &Path, config: &Config) -> Result<Inventory> {
    let scanner = Scanner::new(config)?;
    let files = discover(path, &config.discovery)?;
    tracing::info!(root = %path.display(), files = files.len(), "scanning");
    Ok(scanner.scan_files(&files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SymbolType;
    use crate::value::MetaValue;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_scan_source_end_to_end() {
        let scan = Scanner::default().scan_source(
            "loader.py",
            "# meta: modules=io threads=startup\ndef load_config():\n    pass\n",
        );
        assert!(scan.diagnostics.is_empty());
        assert_eq!(scan.bindings.len(), 1);

        let binding = &scan.bindings[0];
        assert_eq!(binding.id, "loader.py.load_config");
        assert_eq!(binding.resolved.target.symbol_type(), SymbolType::Function);
        assert_eq!(
            binding.block.meta.get("threads"),
            Some(&MetaValue::Set(vec!["startup".to_string()]))
        );
    }

    #[test]
    fn test_custom_identity_rule() {
        struct NameOnly;
        impl IdentityRule for NameOnly {
            fn derive(&self, _source_file: &str, _path: &[String], symbol: &str) -> String {
                symbol.to_uppercase()
            }
        }

        let scan = Scanner::default()
            .with_identity_rule(NameOnly)
            .scan_source("a.py", "# meta: modules=x\ndb = {}\n");
        assert_eq!(scan.bindings[0].id, "DB");
    }

    #[test]
    fn test_custom_marker_from_config() {
        let config = Config::from_toml("[syntax]\nmarker = \"note:\"\n").unwrap();
        let scanner = Scanner::new(&config).unwrap();
        let scan = scanner.scan_source("a.py", "# note: modules=x\nx = 1\n# meta: modules=y\ny = 2\n");
        assert_eq!(scan.bindings.len(), 1);
        assert_eq!(scan.bindings[0].resolved.target.name(), "x");
    }

    #[test]
    fn test_unreadable_file() {
        let mut file = NamedTempFile::with_suffix(".py").unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x80]).unwrap();

        let source = SourceFile {
            path: file.path().to_path_buf(),
            name: "bad.py".to_string(),
        };
        let scan = Scanner::default().scan_file(&source);

        assert!(!scan.readable);
        assert_eq!(scan.diagnostics.len(), 1);
        assert_eq!(scan.diagnostics[0].kind, DiagnosticKind::UnreadableSource);
    }
}
