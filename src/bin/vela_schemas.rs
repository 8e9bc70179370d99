//! Vela Schemas CLI
//!
//! Generates the KubeVela editor schema bundle from a captured cluster
//! envelope, checks a committed bundle for drift, and manages configuration.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vela_schemas::{
    check_directory, generate, Bundle, BundleOptions, DirectorySink, DriftReport, OutputFormat,
    VelaSchemasConfig,
};

#[derive(Parser)]
#[command(name = "vela-schemas")]
#[command(about = "Build JSON Schemas for KubeVela Application manifests")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the schema bundle
    Generate {
        /// Envelope JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON layout (pretty or compact)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Also write a sha256 manifest
        #[arg(long)]
        checksums: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Dry run - don't write any files
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that an output directory matches a fresh bundle
    Check {
        /// Envelope JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Directory to compare against
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "vela-schemas.toml")]
        output: String,
    },

    /// Validate configuration
    Validate,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Generate {
            input,
            output,
            format,
            checksums,
            json,
            dry_run,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            if checksums {
                config.output.include_checksums = true;
            }

            let bundle = build_bundle(&input, &config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&bundle.summary)?);
            } else {
                print_summary(&bundle);
            }

            if dry_run {
                println!();
                println!("🔍 Dry run - not writing files");
                return Ok(0);
            }

            let dir = config.output_dir();
            let mut sink = DirectorySink::create(&dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            bundle
                .write_to(&mut sink)
                .with_context(|| format!("writing schemas to {}", dir.display()))?;
            if !json {
                println!();
                println!("✅ Wrote {} files to {:?}", bundle.artifacts.len(), dir);
            }
            Ok(0)
        }

        Commands::Check { input, output, json } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(dir) = output {
                config.output.dir = dir;
            }

            let bundle = build_bundle(&input, &config)?;
            let dir = config.output_dir();
            let report = check_directory(&bundle.artifacts, &dir)
                .with_context(|| format!("comparing with {}", dir.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_drift(&report);
            }

            if report.has_drift() {
                eprintln!();
                eprintln!("❌ {}", vela_schemas::SchemaError::Drift { count: report.drift_count() });
                Ok(1)
            } else {
                eprintln!();
                eprintln!("✅ No drift detected - schemas are in sync");
                Ok(0)
            }
        }

        Commands::Config { command } => run_config(command, cli.config.as_deref()),
    }
}

fn load_config(path: Option<&str>) -> Result<VelaSchemasConfig> {
    VelaSchemasConfig::load_from(path).context("loading configuration")
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading envelope from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading envelope {}", input))
    }
}

fn build_bundle(input: &str, config: &VelaSchemasConfig) -> Result<Bundle> {
    let text = read_input(input)?;
    let options = BundleOptions::from(config);
    generate(&text, &options).context("generating schema bundle")
}

fn print_summary(bundle: &Bundle) {
    let summary = &bundle.summary;
    println!("📦 Vela Schema Bundle");
    println!("  Records: {}", summary.records);
    for (category, count) in &summary.entries {
        println!("  {}: {}", category, count);
    }

    if !summary.skipped_records.is_empty() {
        println!();
        println!("  Skipped ({}):", summary.skipped_records.len());
        for name in summary.skipped_records.iter().take(5) {
            println!("    - {}", name);
        }
        if summary.skipped_records.len() > 5 {
            println!("    ... and {} more", summary.skipped_records.len() - 5);
        }
    }

    if !summary.invalid_type_schemas.is_empty() {
        println!();
        println!("⚠️  {} property schema(s) failed to compile:", summary.invalid_type_schemas.len());
        for name in &summary.invalid_type_schemas {
            println!("    - {}", name);
        }
    }

    if !summary.missing_sites.is_empty() {
        println!();
        let sites: Vec<_> = summary.missing_sites.iter().map(|c| c.label()).collect();
        println!("⚠️  Injection sites not found: {}", sites.join(", "));
    }

    let definitions: Vec<_> = summary.definitions_written.iter().map(|c| c.label()).collect();
    println!();
    println!(
        "  Definition schemas: {}",
        if definitions.is_empty() { "none".to_string() } else { definitions.join(", ") }
    );
}

fn print_drift(report: &DriftReport) {
    println!("🔍 Schema Drift Check\n");
    println!("  Unchanged: {}", report.unchanged);

    for name in &report.missing {
        println!("  ➕ {} (missing)", name);
    }
    for name in &report.stale {
        println!("  ➖ {} (stale)", name);
    }
    for change in &report.changed {
        println!(
            "  ✏️  {} (+{} -{})",
            change.name, change.added_lines, change.removed_lines
        );
        print!("{}", change.diff);
    }
}

fn run_config(command: ConfigCommands, path: Option<&str>) -> Result<i32> {
    match command {
        ConfigCommands::Show { toml, json } => {
            let cfg = load_config(path)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Vela Schemas Configuration\n");
                println!("Output:");
                println!("  Directory: {:?}", cfg.output.dir);
                println!("  Format: {:?}", cfg.output.format);
                println!("  Checksums: {}", cfg.output.include_checksums);

                println!("\nRecords:");
                println!("  Prefix: {}", cfg.records.prefix);
                println!("  Content key: {}", cfg.records.content_key);

                println!("\nValidation:");
                println!("  Check type schemas: {}", cfg.validation.check_type_schemas);
            }
            Ok(0)
        }

        ConfigCommands::Init { output } => {
            VelaSchemasConfig::default()
                .save(&output)
                .with_context(|| format!("writing {}", output))?;
            println!("✅ Created config file: {}", output);
            Ok(0)
        }

        ConfigCommands::Validate => match VelaSchemasConfig::load_from(path) {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                println!("   Output: {:?}", cfg.output.dir);
                println!("   Record prefix: {}", cfg.records.prefix);
                Ok(0)
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                Ok(1)
            }
        },
    }
}
