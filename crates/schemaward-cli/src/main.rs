use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemaward_catalog::{
    ComponentRegistry, ComponentType, FileDeploymentConfig, FsComponentRegistry, JsonPersistor,
    JsonSchemaReader, ReaderSchemaConfig,
};
use schemaward_core::{Config, GenerationReport, ModuleOutcome, ALL_MODULES};
use schemaward_engine::{IdentifierNameResolver, WhitelistBuilder, WhitelistGenerator};

const DEFAULT_CONFIG_FILE: &str = "schemaward.toml";

/// Schemaward - declarative schema whitelist generator
#[derive(Parser)]
#[command(name = "schemaward")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemaward.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate db_schema_whitelist.json for one module or all modules
    Generate {
        /// Module name (Vendor_Module), or "all"
        #[arg(long = "module-name", default_value = ALL_MODULES)]
        module_name: String,

        /// Also save the generation report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// List registered modules and their paths
    Modules,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "schemaward=debug" } else { "schemaward=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    tracing::debug!(project_root = %config.project_root.display(), "Loaded configuration");

    match cli.command {
        Commands::Generate { module_name, report } => {
            generate_command(&config, &module_name, report.as_deref(), cli.verbose)
        }
        Commands::Modules => modules_command(&config),
    }
}

/// Load the config file, falling back to defaults when none exists
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(config_path) = path {
        return Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return Config::from_file(default_path).context("Failed to load schemaward.toml");
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Generate command - build and persist module whitelists
fn generate_command(config: &Config, module: &str, report_path: Option<&Path>, verbose: bool) -> Result<()> {
    let registry = FsComponentRegistry::discover(config);
    if verbose {
        eprintln!("{} {} modules", "Discovered".cyan(), registry.len());
    }

    let deployment_path = config.resolve(&config.deployment_config);
    let deployment = FileDeploymentConfig::load(&deployment_path)
        .with_context(|| format!("Failed to load deployment config {}", deployment_path.display()))?;

    let reader = JsonSchemaReader::new(&registry, config);
    let schema_config = ReaderSchemaConfig::new(&reader);
    let persistor = JsonPersistor::new(config.indent);
    let resolver = IdentifierNameResolver::new();

    let builder = WhitelistBuilder::new(config, &registry, &reader, &persistor, &resolver);
    let report = WhitelistGenerator::new(&deployment, &schema_config, builder)
        .generate(module)
        .with_context(|| format!("Whitelist generation failed for '{}'", module))?;

    print_generation_summary(&report, verbose);

    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to save report {}", path.display()))?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }

    Ok(())
}

/// Modules command - show what `generate all` would visit
fn modules_command(config: &Config) -> Result<()> {
    let registry = FsComponentRegistry::discover(config);
    let modules = registry.paths(ComponentType::Module);

    if modules.is_empty() {
        println!("{}", "No modules registered".yellow());
        return Ok(());
    }

    for (name, path) in modules {
        let marker = if config.is_module_skipped(&name) {
            "skipped".yellow()
        } else if config.schema_path(&path).exists() {
            "declared".green()
        } else {
            "no schema".dimmed()
        };
        println!("{:<40} {:<10} {}", name.bold(), marker, path.display());
    }

    Ok(())
}

/// Print generation summary
fn print_generation_summary(report: &GenerationReport, verbose: bool) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Whitelist Generation Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{}", "Summary:".bold());
    println!("  Modules:          {}", report.summary.modules);
    println!("  Files written:    {}", format!("{}", report.summary.files_written).green());
    println!("  Nothing declared: {}", report.summary.unchanged);

    if report.summary.elements_skipped > 0 {
        println!(
            "  Elements skipped: {}",
            format!("{}", report.summary.elements_skipped).yellow()
        );
    } else {
        println!("  Elements skipped: {}", "0".green());
    }
    println!();

    for module in &report.modules {
        match &module.outcome {
            ModuleOutcome::Written { path, tables } => {
                println!("  {} {} ({} tables) -> {}", "✓".green(), module.module, tables, path.display())
            }
            ModuleOutcome::NoDeclaredTables => {
                println!("  {} {} (no declared tables)", "-".dimmed(), module.module)
            }
            ModuleOutcome::Skipped => println!("  {} {} (skipped)", "-".yellow(), module.module),
        }
    }

    if verbose && !report.skipped.is_empty() {
        println!();
        println!("{}", "Skipped Elements:".bold());
        for skipped in &report.skipped {
            println!(
                "  [{}] {}.{}: {}",
                skipped.code.as_str().yellow(),
                skipped.table,
                skipped.category,
                skipped.message
            );
            if let Some(name) = &skipped.declared_name {
                println!("    Declared name: {}", name);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
