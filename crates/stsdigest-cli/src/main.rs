//! CLI for stsdigest: compile NIST STS result trees into one JSON document.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stsdigest")]
#[command(about = "stsdigest: compile NIST STS result trees into one JSON document")]
#[command(version = stsdigest_core::VERSION)]
struct Cli {
    /// Only log warnings and errors (RUST_LOG still takes precedence)
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every run under a results root into a single JSON document
    Compile {
        /// Results root containing one directory per category
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Comma-separated category directories to scan
        #[arg(long, default_value_t = stsdigest_core::DEFAULT_CATEGORIES.join(","))]
        categories: String,

        /// Report file name inside each run directory
        #[arg(long, default_value = stsdigest_core::DEFAULT_REPORT_FILE)]
        report_file: String,

        /// Bit-count file name inside each run directory
        #[arg(long, default_value = stsdigest_core::DEFAULT_FREQUENCY_FILE)]
        freq_file: String,

        /// Output path (defaults to <root>/nist_results_compressed.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the corpus summaries of a compiled document
    Show {
        /// Compiled document to read
        path: PathBuf,

        /// Corpus key to break down per test, e.g. blowfish_encrypted
        #[arg(long)]
        corpus: Option<String>,

        /// Break down every corpus per test
        #[arg(long)]
        all: bool,
    },

    /// Parse a single report and print its header, rows and summary
    Inspect {
        /// Path to a finalAnalysisReport.txt
        report: PathBuf,

        /// Bit-count file (defaults to freq.txt next to the report)
        #[arg(long)]
        freq: Option<PathBuf>,

        /// Print the run record as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Scrape key/value pairs from captured battery console output
    Scrape {
        /// Captured console text; reads stdin when omitted
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Compile {
            root,
            categories,
            report_file,
            freq_file,
            output,
        } => commands::compile::run(commands::compile::CompileCommandConfig {
            root: &root,
            categories: &categories,
            report_file,
            freq_file,
            output_path: output.as_deref(),
        }),
        Commands::Show { path, corpus, all } => {
            commands::show::run(&path, corpus.as_deref(), all)
        }
        Commands::Inspect { report, freq, json } => {
            commands::inspect::run(&report, freq.as_deref(), json)
        }
        Commands::Scrape { path } => commands::scrape::run(path.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compile_defaults_follow_core_constants() {
        let cli = Cli::try_parse_from(["stsdigest", "compile"]).unwrap();
        let Commands::Compile {
            categories,
            report_file,
            freq_file,
            output,
            ..
        } = cli.command
        else {
            panic!("expected compile");
        };
        assert_eq!(
            commands::parse_categories(&categories),
            stsdigest_core::DEFAULT_CATEGORIES
        );
        assert_eq!(report_file, stsdigest_core::DEFAULT_REPORT_FILE);
        assert_eq!(freq_file, stsdigest_core::DEFAULT_FREQUENCY_FILE);
        assert!(output.is_none());
    }
}
