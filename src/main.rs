//! optable - declarative option tables with deferred dispatch.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use optable::{
    generate_help, parse_args, parse_file, scan_and_run, Collector, Outcome, TableConfig,
    TerminalSize,
};
use std::ops::ControlFlow;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Parse arguments against a JSON-declared option table.
#[derive(Parser, Debug)]
#[command(name = "optable", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse arguments and print the collected values as JSON
    Parse {
        /// JSON option table declaration
        #[arg(long)]
        config: String,

        /// Read `key value` lines from this file instead of ARGS
        #[arg(long)]
        file: Option<PathBuf>,

        /// Arguments to parse
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print the help table for a declaration
    Help {
        /// JSON option table declaration
        #[arg(long)]
        config: String,

        /// Terminal width (defaults to $COLUMNS, then 80)
        #[arg(long)]
        columns: Option<usize>,
    },
}

fn load_config(json: &str) -> Result<TableConfig> {
    let cfg = TableConfig::from_json(json).context("failed to parse config JSON")?;
    cfg.validate().context("invalid config")?;
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { config, file, args } => {
            let cfg = load_config(&config)?;
            let collector = Collector::new();
            let table = cfg.build(&collector);

            let store = match file {
                Some(path) => parse_file(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => parse_args(std::iter::once(cfg.program_name()).chain(args.iter().map(String::as_str)))?,
            };

            let outcome = scan_and_run(&store, &table, |jobs| {
                if jobs.count("help") > 0 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })?;

            match outcome {
                Outcome::Vetoed => print!("{}", generate_help(&table, TerminalSize::from_env())?),
                Outcome::Ran => println!("{}", serde_json::to_string_pretty(&collector.to_json())?),
            }
        }
        Commands::Help { config, columns } => {
            let cfg = load_config(&config)?;
            let table = cfg.build(&Collector::new());
            let mut size = TerminalSize::from_env();
            if let Some(columns) = columns {
                size.columns = columns;
            }
            if let Some(ref description) = cfg.description {
                println!("{}", description);
            }
            print!("{}", generate_help(&table, size)?);
        }
    }

    Ok(())
}
