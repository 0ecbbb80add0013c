//! @ai:module:intent Format inventories, indexes and diagnostics for output
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_records, format_diagnostics, to_json, write_output
//! @ai:module:depends_on record, diagnostic, routing, error
//! @ai:module:stateless true

use crate::diagnostic::{DiagnosticKind, Severity};
use crate::error::{Error, Result};
use crate::record::{Inventory, Record};
use crate::routing::Destination;
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format records as a string
/// @ai:effects pure
pub fn format_records(records: &[Record], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(records, false),
        OutputFormat::JsonPretty => to_json(records, true),
        OutputFormat::Text => format_records_text(records),
    }
}

/// @ai:intent Format records as human-readable text
/// @ai:effects pure
fn format_records_text(records: &[Record]) -> Result<String> {
    let mut output = String::new();

    for record in records {
        output.push_str(&format!(
            "{} {} ({}) {}\n",
            record.id.bold(),
            record.symbol_name.cyan(),
            record.symbol_type,
            format!("{}:{}", record.source_file, record.line_number).dimmed()
        ));

        for (key, value) in record.meta.iter() {
            output.push_str(&format!("    {}: {}\n", key, serde_json::to_string(value)?));
        }
    }

    Ok(output)
}

/// @ai:intent Render diagnostics and the run summary as coloured text
/// @ai:effects pure
pub fn format_diagnostics(inventory: &Inventory, strict: bool) -> String {
    let mut output = String::new();

    for diagnostic in &inventory.diagnostics {
        let severity_str = match diagnostic.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warning => "WARN".yellow().bold(),
            Severity::Info => "INFO".blue(),
        };

        output.push_str(&format!(
            "{} {} - {} ({})\n",
            severity_str,
            diagnostic.location.to_string().dimmed(),
            diagnostic.message,
            diagnostic.code.dimmed()
        ));

        if let Some(related) = &diagnostic.related {
            output.push_str(&format!("  {} {}\n", "first defined at".cyan(), related));
        }
    }

    let summary = &inventory.summary;
    output.push('\n');
    output.push_str(&format!(
        "Scanned {} files ({} skipped), {} blocks, {} records\n",
        summary.files_scanned, summary.files_skipped, summary.blocks, summary.records
    ));

    for (kind, count) in &summary.diagnostics {
        output.push_str(&format!("  {}: {}\n", kind, count));
    }

    if !inventory.passed(strict) {
        output.push_str(&format!(
            "{} strict mode: {} collisions, {} unbound blocks\n",
            "FAILED".red().bold(),
            inventory.count(DiagnosticKind::IdentifierCollision),
            inventory.count(DiagnosticKind::UnboundBlock)
        ));
    } else if inventory.diagnostics.is_empty() {
        output.push_str(&format!("{} No issues found\n", "OK".green().bold()));
    } else {
        output.push_str(&format!(
            "{} {} diagnostics\n",
            "OK".green().bold(),
            inventory.diagnostics.len().to_string().yellow()
        ));
    }

    output
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// @ai:intent Write rendered output to its destination
/// @ai:post files always end with a newline
/// @ai:effects fs:write, io:stdout
pub fn write_output(destination: &Destination, content: &str) -> Result<()> {
    match destination {
        Destination::Stdout => {
            println!("{}", content);
            Ok(())
        }
        Destination::File(path) => {
            let mut text = content.to_string();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            std::fs::write(path, text).map_err(Error::Io)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::build_inventory;
    use crate::scan::Scanner;
    use tempfile::TempDir;

    fn inventory(source: &str) -> Inventory {
        build_inventory(vec![Scanner::default().scan_source("a.py", source)])
    }

    #[test]
    fn test_json_records() {
        let inv = inventory("# meta: modules=io threads=startup\ndef load_config():\n    pass\n");
        let json: serde_json::Value =
            serde_json::from_str(&format_records(&inv.records, OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "id": "a.py.load_config",
                "symbol_name": "load_config",
                "symbol_type": "function",
                "source_file": "a.py",
                "line_number": 1,
                "meta": {"modules": ["io"], "threads": ["startup"]}
            }])
        );
    }

    #[test]
    fn test_text_summary_mentions_failures() {
        colored::control::set_override(false);
        let inv = inventory("x = 1\n# meta: modules=a\n");

        let lenient = format_diagnostics(&inv, false);
        assert!(lenient.contains("WARN a.py:2"));
        assert!(lenient.contains("unbound-block: 1"));
        assert!(!lenient.contains("FAILED"));

        let strict = format_diagnostics(&inv, true);
        assert!(strict.contains("FAILED strict mode: 0 collisions, 1 unbound blocks"));
    }

    #[test]
    fn test_text_records() {
        colored::control::set_override(false);
        let inv = inventory("# meta: modules=io callers=2\ndef load_config():\n    pass\n");
        let text = format_records(&inv.records, OutputFormat::Text).unwrap();

        assert_eq!(
            text,
            "a.py.load_config load_config (function) a.py:1\n    callers: 2\n    modules: [\"io\"]\n"
        );
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.json");
        write_output(&Destination::File(path.clone()), "[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
