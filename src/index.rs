//! @ai:module:intent Build lookup indexes over an inventory of records
//! @ai:module:layer application
//! @ai:module:public_api IndexKind, Index, Indexes, build_indexes
//! @ai:module:depends_on record
//! @ai:module:stateless true

use crate::record::Record;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// @ai:intent Available index views
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKind {
    BySymbol,
    ByFile,
    ByModule,
    ByThread,
    ByFlag,
}

impl IndexKind {
    pub const ALL: [IndexKind; 5] = [
        IndexKind::BySymbol,
        IndexKind::ByFile,
        IndexKind::ByModule,
        IndexKind::ByThread,
        IndexKind::ByFlag,
    ];

    /// @ai:intent Key of the index in serialized output
    /// @ai:effects pure
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::BySymbol => "by-symbol",
            IndexKind::ByFile => "by-file",
            IndexKind::ByModule => "by-module",
            IndexKind::ByThread => "by-thread",
            IndexKind::ByFlag => "by-flag",
        }
    }
}

/// Unique symbol name to record id.
pub type Bucket = BTreeMap<String, String>;

/// @ai:intent One index: a single bucket or buckets keyed by file, module, thread or flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Index {
    Flat(Bucket),
    Grouped(BTreeMap<String, Bucket>),
}

/// @ai:intent Requested indexes keyed by their serialized name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Indexes(BTreeMap<&'static str, Index>);

impl Indexes {
    pub fn get(&self, kind: IndexKind) -> Option<&Index> {
        self.0.get(kind.name())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Default)]
struct Buckets {
    buckets: BTreeMap<String, Bucket>,
    counts: HashMap<(String, String), usize>,
}

impl Buckets {
    /// Repeated symbol names in one bucket become `name (2)`, `name (3)`, ...
    fn add(&mut self, bucket: &str, record: &Record) {
        let seen = self
            .counts
            .entry((bucket.to_string(), record.symbol_name.clone()))
            .or_insert(0);
        *seen += 1;

        let key = if *seen == 1 {
            record.symbol_name.clone()
        } else {
            format!("{} ({})", record.symbol_name, seen)
        };

        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key, record.id.clone());
    }
}

/// @ai:intent Build the requested indexes; an empty request builds all of them
/// @ai:effects pure
pub fn build_indexes(records: &[Record], only: &[IndexKind]) -> Indexes {
    let wanted: Vec<IndexKind> = if only.is_empty() {
        IndexKind::ALL.to_vec()
    } else {
        IndexKind::ALL
            .iter()
            .copied()
            .filter(|k| only.contains(k))
            .collect()
    };

    let mut indexes = Indexes::default();
    for kind in wanted {
        indexes.0.insert(kind.name(), build_one(records, kind));
    }
    indexes
}

fn build_one(records: &[Record], kind: IndexKind) -> Index {
    let mut buckets = Buckets::default();

    for record in records {
        match kind {
            IndexKind::BySymbol => buckets.add("", record),
            IndexKind::ByFile => buckets.add(&record.source_file, record),
            IndexKind::ByModule => {
                for module in record.meta.strings("modules") {
                    buckets.add(module, record);
                }
            }
            IndexKind::ByThread => {
                for thread in record.meta.strings("threads") {
                    buckets.add(thread, record);
                }
            }
            IndexKind::ByFlag => {
                for flag in record.meta.flags() {
                    buckets.add(&flag.to_string(), record);
                }
            }
        }
    }

    match kind {
        IndexKind::BySymbol => Index::Flat(buckets.buckets.remove("").unwrap_or_default()),
        _ => Index::Grouped(buckets.buckets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::build_inventory;
    use crate::scan::Scanner;
    use pretty_assertions::assert_eq;

    fn records() -> Vec<Record> {
        let scanner = Scanner::default();
        let scans = vec![
            scanner.scan_source(
                "a.py",
                "# meta: modules=db,io flags=x\ndef main():\n    pass\n",
            ),
            scanner.scan_source(
                "b.py",
                "# meta: modules=db threads=worker flags=x,y\ndef main():\n    pass\n",
            ),
        ];
        build_inventory(scans).records
    }

    fn bucket(entries: &[(&str, &str)]) -> Bucket {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_by_symbol_suffixes_repeats() {
        let indexes = build_indexes(&records(), &[IndexKind::BySymbol]);
        assert_eq!(indexes.len(), 1);
        assert_eq!(
            indexes.get(IndexKind::BySymbol),
            Some(&Index::Flat(bucket(&[
                ("main", "a.py.main"),
                ("main (2)", "b.py.main")
            ])))
        );
    }

    #[test]
    fn test_by_module_groups() {
        let indexes = build_indexes(&records(), &[]);
        assert_eq!(indexes.len(), 5);

        let Some(Index::Grouped(by_module)) = indexes.get(IndexKind::ByModule) else {
            panic!("by-module must be grouped");
        };
        assert_eq!(
            by_module.get("db"),
            Some(&bucket(&[("main", "a.py.main"), ("main (2)", "b.py.main")]))
        );
        assert_eq!(by_module.get("io"), Some(&bucket(&[("main", "a.py.main")])));

        let Some(Index::Grouped(by_flag)) = indexes.get(IndexKind::ByFlag) else {
            panic!("by-flag must be grouped");
        };
        assert_eq!(by_flag.len(), 2);
        assert_eq!(by_flag.get("y"), Some(&bucket(&[("main", "b.py.main")])));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(build_indexes(&records(), &[IndexKind::ByThread])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"by-thread": {"worker": {"main": "b.py.main"}}})
        );
    }
}
