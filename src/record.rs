//! @ai:module:intent Assemble records from bindings and enforce corpus-wide identifier uniqueness
//! @ai:module:layer application
//! @ai:module:public_api Binding, Record, Inventory, Summary, build_inventory
//! @ai:module:depends_on block, resolver, scan, diagnostic, value, error
//! @ai:module:stateless true

use crate::block::MetaBlock;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Location};
use crate::error::{Error, Result};
use crate::resolver::{ResolvedTarget, SymbolType};
use crate::scan::FileScan;
use crate::value::Meta;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// @ai:intent A block paired with its target and identifier
#[derive(Debug, Clone)]
pub struct Binding {
    pub id: String,
    pub block: MetaBlock,
    pub resolved: ResolvedTarget,
}

impl Binding {
    pub fn location(&self) -> Location {
        self.block.location()
    }
}

/// @ai:intent The emitted, normalized unit of the inventory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Record {
    pub id: String,
    pub symbol_name: String,
    pub symbol_type: SymbolType,
    pub source_file: String,
    pub line_number: usize,
    pub meta: Meta,
}

impl From<Binding> for Record {
    fn from(binding: Binding) -> Self {
        Self {
            symbol_name: binding.resolved.target.name().to_string(),
            symbol_type: binding.resolved.target.symbol_type(),
            source_file: binding.block.source_file,
            line_number: binding.block.start_line,
            meta: binding.block.meta,
            id: binding.id,
        }
    }
}

/// @ai:intent Counts reported at the end of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub blocks: usize,
    pub records: usize,
    pub diagnostics: BTreeMap<DiagnosticKind, usize>,
}

/// @ai:intent Records and diagnostics of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inventory {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: Summary,
}

impl Inventory {
    /// @ai:intent Number of diagnostics of a kind
    /// @ai:effects pure
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.summary.diagnostics.get(&kind).copied().unwrap_or(0)
    }

    /// @ai:intent Whether the run succeeds under the given mode
    /// @ai:post lenient runs always pass; strict runs fail on collisions or unbound blocks
    /// @ai:effects pure
    pub fn passed(&self, strict: bool) -> bool {
        !strict
            || (self.count(DiagnosticKind::IdentifierCollision) == 0
                && self.count(DiagnosticKind::UnboundBlock) == 0)
    }

    /// @ai:intent Turn a failed strict run into an error
    pub fn check(&self, strict: bool) -> Result<()> {
        if self.passed(strict) {
            Ok(())
        } else {
            Err(Error::StrictFailure {
                collisions: self.count(DiagnosticKind::IdentifierCollision),
                unbound: self.count(DiagnosticKind::UnboundBlock),
            })
        }
    }
}

/// @ai:intent Reduce per-file scans into one inventory, registering identifiers in order
/// @ai:pre scans are in file order and each scan's bindings in line order
/// @ai:post the first holder of an id is kept; every later holder yields one IdentifierCollision
/// @ai:effects pure
pub fn build_inventory(scans: Vec<FileScan>) -> Inventory {
    let mut registry: HashMap<String, Location> = HashMap::new();
    let mut inventory = Inventory::default();

    for scan in scans {
        if scan.readable {
            inventory.summary.files_scanned += 1;
        } else {
            inventory.summary.files_skipped += 1;
        }
        inventory.summary.blocks += scan.blocks;
        inventory.diagnostics.extend(scan.diagnostics);

        for binding in scan.bindings {
            let location = binding.location();

            if let Some(first) = registry.get(&binding.id) {
                tracing::warn!(id = %binding.id, at = %location, first = %first, "identifier collision");
                inventory.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::IdentifierCollision,
                        location,
                        format!("identifier `{}` is already used", binding.id),
                    )
                    .with_related(first.clone()),
                );
                continue;
            }

            registry.insert(binding.id.clone(), location);
            inventory.records.push(Record::from(binding));
        }
    }

    inventory.summary.records = inventory.records.len();
    for diagnostic in &inventory.diagnostics {
        *inventory
            .summary
            .diagnostics
            .entry(diagnostic.kind)
            .or_insert(0) += 1;
    }

    tracing::info!(
        records = inventory.summary.records,
        diagnostics = inventory.diagnostics.len(),
        "inventory built"
    );

    inventory
}

/// @ai:intent Read a previously written inventory, a JSON array of records
/// @ai:post unknown fields or mistyped meta values are rejected
/// @ai:effects fs:read
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Inventory(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Scanner;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn scan_all(files: &[(&str, &str)]) -> Inventory {
        let scanner = Scanner::default();
        let scans = files
            .iter()
            .map(|(name, content)| scanner.scan_source(name, content))
            .collect();
        build_inventory(scans)
    }

    #[test]
    fn test_explicit_id_collision_reported_once() {
        let inventory = scan_all(&[
            ("a.py", "# meta: #shared modules=a\ndef f():\n    pass\n"),
            ("b.py", "x = 1\n\n# meta: #shared\ndef g():\n    pass\n"),
        ]);

        assert_eq!(inventory.records.len(), 1);
        assert_eq!(inventory.records[0].source_file, "a.py");
        assert_eq!(inventory.count(DiagnosticKind::IdentifierCollision), 1);

        let collision = &inventory.diagnostics[0];
        assert_eq!(collision.location, Location::new("b.py", 3));
        assert_eq!(collision.related, Some(Location::new("a.py", 1)));
    }

    #[test]
    fn test_derived_ids_from_different_files_do_not_collide() {
        let inventory = scan_all(&[
            ("a.py", "# meta: modules=x\ndef main():\n    pass\n"),
            ("b.py", "# meta: modules=x\ndef main():\n    pass\n"),
        ]);
        assert_eq!(inventory.records.len(), 2);
        assert_eq!(inventory.records[0].id, "a.py.main");
        assert_eq!(inventory.records[1].id, "b.py.main");
        assert!(inventory.diagnostics.is_empty());
    }

    #[test]
    fn test_derived_collision_is_reported() {
        let inventory = scan_all(&[(
            "a.py",
            "# meta: modules=x\ndef main():\n    pass\n\n# meta: modules=y\ndef main():\n    pass\n",
        )]);
        assert_eq!(inventory.records.len(), 1);
        assert_eq!(inventory.count(DiagnosticKind::IdentifierCollision), 1);
    }

    #[test]
    fn test_strict_mode_fails_on_unbound() {
        let inventory = scan_all(&[("a.py", "x = 1\n# meta: modules=a\n")]);
        assert!(inventory.records.is_empty());
        assert_eq!(inventory.count(DiagnosticKind::UnboundBlock), 1);
        assert!(inventory.passed(false));
        assert!(!inventory.passed(true));
        assert!(matches!(
            inventory.check(true),
            Err(Error::StrictFailure {
                collisions: 0,
                unbound: 1
            })
        ));
    }

    #[test]
    fn test_summary_counts() {
        let inventory = scan_all(&[
            ("a.py", "# meta: modules=a junk\nx = 1\n# meta: @A\n"),
            ("b.py", "# meta: modules=b\ny = 2\n"),
        ]);
        assert_eq!(inventory.summary.files_scanned, 2);
        assert_eq!(inventory.summary.blocks, 3);
        assert_eq!(inventory.summary.records, 2);
        assert_eq!(inventory.count(DiagnosticKind::MalformedEntry), 1);
        assert_eq!(inventory.count(DiagnosticKind::UnboundBlock), 1);
    }

    #[test]
    fn test_records_survive_a_json_file() {
        let inventory = scan_all(&[(
            "a.py",
            "# meta: modules=io callers=3 flags=r owner=ops
def f():
    pass
",
        )]);

        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, "{}", serde_json::to_string(&inventory.records).unwrap()).unwrap();

        let loaded = load_records(file.path()).unwrap();
        assert_eq!(loaded, inventory.records);
    }

    #[test]
    fn test_load_rejects_extra_fields() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            file,
            r#"[{{"id":"x","symbol_name":"x","symbol_type":"function","source_file":"a.py","line_number":1,"meta":{{}},"extra":1}}]"#
        )
        .unwrap();

        assert!(matches!(load_records(file.path()), Err(Error::Inventory(_))));
    }
}
