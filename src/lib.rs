//! @ai:module:intent Marginalia library: bind `# meta:` comment blocks to the symbols they describe
//! @ai:module:layer infrastructure
//! @ai:module:public_api block, classifier, config, diagnostic, discovery, error, grammar, identity, index, matchers, output, record, resolver, routing, scan, scope, value
//! @ai:module:stateless true
//!
//! # Marginalia
//!
//! Reads Python source, finds runs of `# meta:` comment lines, resolves the
//! function, class, assignment or anchor each run describes and emits one
//! normalized [`Record`] per binding. Sources are only read, never executed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use marginalia::{output, scan_path, Config};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let inventory = scan_path(Path::new("src"), &config).unwrap();
//! let json = output::format_records(&inventory.records, output::OutputFormat::JsonPretty).unwrap();
//! println!("{}", json);
//! eprint!("{}", output::format_diagnostics(&inventory, config.strict));
//! ```

pub mod block;
pub mod classifier;
pub mod config;
pub mod diagnostic;
pub mod discovery;
pub mod error;
pub mod grammar;
pub mod identity;
pub mod index;
pub mod matchers;
pub mod output;
pub mod record;
pub mod resolver;
pub mod routing;
pub mod scan;
pub mod scope;
pub mod value;

pub use block::{collect_blocks, MetaBlock};
pub use classifier::{LineKind, MetaSyntax};
pub use config::Config;
pub use diagnostic::{Diagnostic, DiagnosticKind, Location, Severity};
pub use discovery::{discover, SourceFile};
pub use error::{Error, Result};
pub use grammar::{parse_line, MetaEntry, Token};
pub use identity::{IdentityRule, QualifiedPath};
pub use index::{build_indexes, Index, IndexKind, Indexes};
pub use output::{format_diagnostics, format_records, to_json, write_output, OutputFormat};
pub use record::{build_inventory, load_records, Binding, Inventory, Record, Summary};
pub use resolver::{BindingTarget, SymbolType};
pub use routing::{route_one, route_scan, Destination, ScanRoutes};
pub use scan::{scan_path, FileScan, Scanner};
pub use value::{Callers, Meta, MetaValue};
