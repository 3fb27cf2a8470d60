//! svcmodel CLI
//!
//! Command-line interface for translating raw service descriptions into
//! normalized service models.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use svcmodel_common::{NormalizedApi, TranslateOptions};
use svcmodel_translator::{plugins, ApiTranslator};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "svcmodel")]
#[command(version, about = "Translate raw service descriptions into normalized service models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a raw service description and emit the normalized model
    #[command(after_help = "EXAMPLES:\n  \
        # Print the normalized model as JSON\n  \
        svcmodel translate --spec DynamoDB-2012-08-10.json\n\n  \
        # Use an options file, include errors, write YAML\n  \
        svcmodel translate \\\n    \
        --spec S3-2006-03-01.json \\\n    \
        --config translate.yaml \\\n    \
        --errors \\\n    \
        --format yaml \\\n    \
        --output s3.yaml")]
    Translate {
        /// Path to the raw service description (JSON)
        #[arg(short, long)]
        spec: PathBuf,

        #[command(flatten)]
        options: OptionArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the plugin list derived for a protocol and signer
    #[command(after_help = "EXAMPLES:\n  \
        svcmodel plugins --type json --signature-version v4\n  \
        svcmodel plugins --type rest-xml --signature-version s3")]
    Plugins {
        /// Wire protocol (e.g., "query", "json", "rest-json", "rest-xml")
        #[arg(short = 't', long = "type")]
        protocol: String,

        /// Signature version (e.g., "v4", "v2", "s3")
        #[arg(long)]
        signature_version: Option<String>,
    },

    /// Translate a raw service description and print a summary
    Inspect {
        /// Path to the raw service description (JSON)
        #[arg(short, long)]
        spec: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },
}

/// Translation options settable from the command line
#[derive(clap::Args)]
struct OptionArgs {
    /// YAML options file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Timestamp format prefix (e.g., "unix", "iso8601", "rfc822")
    #[arg(long)]
    timestamp_format: Option<String>,

    /// Populate each operation's error list
    #[arg(long)]
    errors: bool,

    /// Override the raw protocol type
    #[arg(long)]
    protocol: Option<String>,

    /// Override the raw signature version
    #[arg(long)]
    signature_version: Option<String>,

    /// Override the endpoint template
    #[arg(long)]
    endpoint: Option<String>,
}

impl OptionArgs {
    /// Options file (if any) overlaid with command-line flags
    fn resolve(&self) -> Result<TranslateOptions> {
        let base = match &self.config {
            Some(path) => TranslateOptions::load(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => TranslateOptions::default(),
        };

        Ok(base.merge(TranslateOptions {
            timestamp_format: self.timestamp_format.clone(),
            errors: self.errors,
            result_wrapped: None,
            protocol: self.protocol.clone(),
            signature_version: self.signature_version.clone(),
            endpoint: self.endpoint.clone(),
        }))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Yaml => write!(f, "YAML"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Translate {
            spec,
            options,
            format,
            output,
        } => {
            let options = options.resolve()?;
            translate_command(&spec, options, format, output.as_deref(), cli.verbose)?;
        }
        Commands::Plugins {
            protocol,
            signature_version,
        } => {
            plugins_command(&protocol, signature_version.as_deref())?;
        }
        Commands::Inspect { spec, options } => {
            let options = options.resolve()?;
            inspect_command(&spec, options, cli.verbose)?;
        }
    }

    Ok(())
}

/// Install the log subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,svcmodel={level},svcmodel_translator={level},svcmodel_common={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load_and_translate(spec_path: &Path, options: TranslateOptions) -> Result<NormalizedApi> {
    tracing::debug!(spec = %spec_path.display(), ?options, "loading service description");
    let translator = ApiTranslator::from_file(spec_path, options)
        .with_context(|| format!("Failed to load {}", spec_path.display()))?;
    translator
        .translate()
        .with_context(|| format!("Failed to translate {}", spec_path.display()))
}

fn translate_command(
    spec_path: &Path,
    options: TranslateOptions,
    format: OutputFormat,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("{} Translating: {}", "→".cyan(), spec_path.display());
        eprintln!("  Format: {}", format);
        if let Some(ts) = &options.timestamp_format {
            eprintln!("  Timestamp format: {}", ts);
        }
        eprintln!("  Errors: {}", options.errors);
    }

    let api = load_and_translate(spec_path, options)?;

    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&api).context("Failed to serialize model as JSON")?
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&api).context("Failed to serialize model as YAML")?
        }
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} operations to {}",
                "✓".green(),
                api.operations.len(),
                path.display().to_string().yellow()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn plugins_command(protocol: &str, signature_version: Option<&str>) -> Result<()> {
    let derived = plugins::derive_plugins(protocol, signature_version)
        .context("Failed to derive plugins")?;

    println!("{}", "Plugins:".bold());
    for (i, plugin) in derived.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, plugin.cyan());
    }
    Ok(())
}

fn inspect_command(spec_path: &Path, options: TranslateOptions, verbose: bool) -> Result<()> {
    println!("{} Inspecting: {}", "→".cyan(), spec_path.display());

    let api = load_and_translate(spec_path, options)?;

    println!("\n{}", "✓ Translation successful!".green().bold());
    println!("\n{}", "Service:".bold());
    if let Some(name) = api.metadata_str("service_full_name") {
        println!("  Name: {}", name.yellow());
    }
    if let Some(class_name) = api.metadata_str("service_class_name") {
        println!("  Class: {}", class_name.yellow());
    }
    if let Some(version) = &api.version {
        println!("  Version: {}", version.yellow());
    }
    if let Some(endpoint) = &api.endpoint {
        println!("  Endpoint: {}", endpoint);
    }
    println!("  Plugins: {}", api.plugins.join(", "));
    println!("  Operations: {}", api.operations.len());

    if verbose {
        println!("\n{}", "Operations:".bold());
        for (key, operation) in &api.operations {
            let members = operation
                .input
                .as_ref()
                .map(|input| input.members.len())
                .unwrap_or(0);
            println!(
                "  • {} {} {}",
                key.cyan(),
                operation.http_method,
                operation.http_path
            );
            println!("    Input members: {}", members);
            if let Some(payload) = operation.input.as_ref().and_then(|i| i.payload.as_ref()) {
                println!("    Payload: {}", payload);
            }
            if let Some(errors) = &operation.errors {
                println!("    Errors: {}", errors.len());
            }
        }
    }

    Ok(())
}
