//! hacfg - HAProxy configuration toolkit
//!
//! This is the main entry point for the hacfg CLI.

use anyhow::Context;
use ariadne::{Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand, ValueEnum};
use hacfg_config::{build, parse_with, render, JsonAdapter, ParseError, ParserConfig, TomlAdapter};
use hacfg_core::config::Configuration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// hacfg - parse, validate and reformat HAProxy configuration files
#[derive(Parser)]
#[command(name = "hacfg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable the parser's memo table
    #[arg(long, global = true)]
    no_memo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "haproxy.cfg")]
        config: String,
    },

    /// Reformat a configuration file
    Fmt {
        /// Path to the configuration file
        #[arg(default_value = "haproxy.cfg")]
        config: String,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the parsed model
    Dump {
        /// Path to the configuration file
        #[arg(default_value = "haproxy.cfg")]
        config: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = DumpFormat::Json)]
        format: DumpFormat,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Json,
    Toml,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `fmt` and `dump` output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let parser_config = ParserConfig {
        memoize: !cli.no_memo,
    };

    match cli.command {
        Commands::Validate { config } => {
            tracing::info!("Validating config: {}", config);
            let model = load_or_exit(&config, &parser_config);
            println!(
                "✅ Configuration '{}' is valid! ({} section(s), {} line(s))",
                config,
                model.section_count(),
                model.line_count()
            );
        }

        Commands::Fmt { config, output } => {
            let model = load_or_exit(&config, &parser_config);
            match output {
                Some(path) => {
                    hacfg_config::save_file(&model, &path)?;
                    tracing::info!("Wrote formatted config to {}", path);
                }
                None => print!("{}", render(&model)),
            }
        }

        Commands::Dump { config, format } => {
            let model = load_or_exit(&config, &parser_config);
            let text = match format {
                DumpFormat::Json => JsonAdapter::serialize(&model)?,
                DumpFormat::Toml => TomlAdapter::serialize(&model)?,
            };
            println!("{}", text);
        }

        Commands::Version => {
            println!("hacfg v{}", hacfg_core::VERSION);
        }
    }

    Ok(())
}

fn load_or_exit(path: &str, parser_config: &ParserConfig) -> Configuration {
    match load(path, parser_config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load {}: {:#}", path, e);
            eprintln!("❌ Configuration Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn load(path: &str, parser_config: &ParserConfig) -> anyhow::Result<Configuration> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    let document = match parse_with(&source, parser_config) {
        Ok(document) => document,
        Err(e) => {
            report_parse_error(path, &source, &e);
            anyhow::bail!("syntax error on line {}, column {}", e.line, e.column);
        }
    };

    let config = build(&document).with_context(|| format!("invalid configuration in {path}"))?;
    Ok(config)
}

/// Pretty-print a syntax error with the offending source line
fn report_parse_error(path: &str, source: &str, err: &ParseError) {
    let source = source.replace("\r\n", "\n");
    let offset = err.offset.min(source.len());
    // ariadne counts characters, the parser counts bytes
    let start = source[..offset].chars().count();
    let span = start..start + 1;
    let id = path.to_string();

    let printed = Report::build(ReportKind::Error, (id.clone(), span.clone()))
        .with_message(format!("syntax error on line {}", err.line))
        .with_label(
            Label::new((id.clone(), span))
                .with_message(format!("expected {}", err.expected.join(", "))),
        )
        .finish()
        .eprint((id, Source::from(source)));

    if printed.is_err() {
        eprintln!("{err}");
    }
}
