//! @ai:module:intent CLI entry point for the marginalia scanner
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on scan, index, output, routing, config

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use marginalia::routing::DEFAULT_INDEXES;
use marginalia::{
    build_indexes, load_records, output, route_one, route_scan, scan_path, Config, IndexKind,
    OutputFormat,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "marginalia")]
#[command(author, version, about = "Marginalia - inventory of `# meta:` annotations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan source files for meta comments and emit an inventory and indexes
    Scan {
        /// File or directory to scan
        path: PathBuf,

        /// Path to a marginalia.toml configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit the inventory, to `stdout` or a file (default inventory.json)
        #[arg(long, value_name = "DEST", num_args = 0..=1)]
        inventory: Option<Option<String>>,

        /// Emit indexes, to `stdout` or a file (default indexes.json)
        #[arg(long, value_name = "DEST", num_args = 0..=1)]
        indexes: Option<Option<String>>,

        /// Restrict emitted indexes
        #[arg(long, value_enum, num_args = 1..)]
        only: Vec<IndexArg>,

        /// Glob patterns of files to include (replaces the configured list)
        #[arg(long)]
        files: Vec<String>,

        /// Glob patterns of files or directories to exclude (replaces the configured list)
        #[arg(long)]
        exclude: Vec<String>,

        /// Inventory format
        #[arg(long, value_enum, default_value = "json")]
        format: Format,

        /// Fail on identifier collisions or unbound blocks
        #[arg(long)]
        strict: bool,

        /// Do not print diagnostics
        #[arg(long, short)]
        quiet: bool,

        #[command(flatten)]
        json: JsonStyle,
    },

    /// Build indexes from an existing inventory file
    Indexes {
        /// Inventory JSON written by `marginalia scan`
        inventory: PathBuf,

        /// Write indexes to `stdout` or a file (default indexes.json)
        #[arg(long, value_name = "DEST", num_args = 0..=1)]
        indexes: Option<Option<String>>,

        /// Restrict emitted indexes
        #[arg(long, value_enum, num_args = 1..)]
        only: Vec<IndexArg>,

        #[command(flatten)]
        json: JsonStyle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Args)]
struct JsonStyle {
    /// Pretty-print JSON output (default)
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Minified JSON output
    #[arg(long)]
    compact: bool,
}

impl JsonStyle {
    fn pretty(&self) -> bool {
        self.pretty || !self.compact
    }

    fn format(&self) -> OutputFormat {
        if self.pretty() {
            OutputFormat::JsonPretty
        } else {
            OutputFormat::Json
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum IndexArg {
    BySymbol,
    ByFile,
    ByModule,
    ByThread,
    ByFlag,
}

impl From<IndexArg> for IndexKind {
    fn from(arg: IndexArg) -> Self {
        match arg {
            IndexArg::BySymbol => IndexKind::BySymbol,
            IndexArg::ByFile => IndexKind::ByFile,
            IndexArg::ByModule => IndexKind::ByModule,
            IndexArg::ByThread => IndexKind::ByThread,
            IndexArg::ByFlag => IndexKind::ByFlag,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("marginalia=warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the run passed.
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Scan {
            path,
            config,
            inventory: inventory_opt,
            indexes: indexes_opt,
            only,
            files,
            exclude,
            format,
            strict,
            quiet,
            json,
        } => {
            let routes = route_scan(
                inventory_opt.as_ref().map(|v| v.as_deref()),
                indexes_opt.as_ref().map(|v| v.as_deref()),
                Path::new(""),
            )?;

            let mut config = load_config(config.as_deref())?;
            if !files.is_empty() {
                config.discovery.include = files;
            }
            if !exclude.is_empty() {
                config.discovery.exclude = exclude;
            }
            config.strict |= strict;

            let inventory = scan_path(&path, &config)
                .with_context(|| format!("scanning {}", path.display()))?;

            if !quiet {
                eprint!("{}", output::format_diagnostics(&inventory, config.strict));
            }

            if let Err(failure) = inventory.check(config.strict) {
                tracing::error!(%failure, "no output written");
                return Ok(false);
            }

            if let Some(destination) = &routes.inventory {
                let format = match format {
                    Format::Json => json.format(),
                    Format::Text => OutputFormat::Text,
                };
                let rendered = output::format_records(&inventory.records, format)?;
                output::write_output(destination, &rendered)
                    .with_context(|| format!("writing inventory to {}", destination))?;
            }

            if let Some(destination) = &routes.indexes {
                let kinds: Vec<IndexKind> = only.into_iter().map(IndexKind::from).collect();
                let built = build_indexes(&inventory.records, &kinds);
                output::write_output(destination, &output::to_json(&built, json.pretty())?)
                    .with_context(|| format!("writing indexes to {}", destination))?;
            }

            Ok(true)
        }

        Commands::Indexes {
            inventory,
            indexes,
            only,
            json,
        } => {
            let records = load_records(&inventory)?;
            let kinds: Vec<IndexKind> = only.into_iter().map(IndexKind::from).collect();
            let built = build_indexes(&records, &kinds);
            let destination = route_one(
                indexes.as_ref().and_then(|v| v.as_deref()),
                Path::new(DEFAULT_INDEXES),
            );
            output::write_output(&destination, &output::to_json(&built, json.pretty())?)?;
            Ok(true)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => {
            let default_path = Path::new("marginalia.toml");
            if default_path.is_file() {
                tracing::debug!("using ./marginalia.toml");
                Ok(Config::load(default_path)?)
            } else {
                Ok(Config::default())
            }
        }
    }
}
