//! `cache-policy`: validate, query and export edge cache policy descriptors.
//!
//! # Commands
//! - `validate`: load and validate a descriptor, listing every violation
//! - `resolve`: print the policy governing types or `Type.field` paths
//! - `export`: print the validated descriptor in the platform's wire shape
//! - `watch`: hot-reload a descriptor file until Ctrl+C
//!
//! Without `--config`, commands operate on the bundled `cosmofy` descriptor.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::{Parser, Subcommand, ValueEnum};

use cache_policy::config::bundled;
use cache_policy::config::watcher::{apply_updates, ConfigWatcher};
use cache_policy::observability::logging::{self, LogFormat};
use cache_policy::{CachePolicyDescriptor, ConfigError, ConfigFormat, PolicyResolution};

#[derive(Parser)]
#[command(name = "cache-policy")]
#[command(about = "Validate and inspect GraphQL edge cache policy descriptors", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format (pretty or json).
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a descriptor
    Validate {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Resolve the policy of types or Type.field paths
    Resolve {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Print the validated descriptor
    Export {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
    /// Reload a descriptor file whenever it changes
    Watch { config: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Toml,
}

impl From<ExportFormat> for ConfigFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => ConfigFormat::Json,
            ExportFormat::Toml => ConfigFormat::Toml,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level, cli.log_format) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(e.as_ref());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Validate { config } => {
            let descriptor = load(config.as_deref())?;
            let config = descriptor.config();
            let types: usize = config.rules.iter().map(|r| r.types.len()).sum();
            println!(
                "{}: valid ({} rules, {} types, {} non-cacheable, partial query caching {})",
                descriptor.name(),
                config.rules.len(),
                types,
                config.non_cacheable.len(),
                if descriptor.partial_query_caching() { "on" } else { "off" },
            );
        }
        Commands::Resolve { config, paths } => {
            let descriptor = load(config.as_deref())?;
            for path in &paths {
                match descriptor.resolve(path) {
                    PolicyResolution::Cached(rule) => println!(
                        "{}\t{}\t{}",
                        path,
                        rule.policy.cache_control(),
                        rule.description
                    ),
                    other => println!("{}\t{}", path, other),
                }
            }
        }
        Commands::Export { config, format } => {
            let descriptor = load(config.as_deref())?;
            let rendered = match ConfigFormat::from(format) {
                ConfigFormat::Json => descriptor.to_json_pretty()?,
                ConfigFormat::Toml => descriptor.to_toml()?,
            };
            println!("{}", rendered);
        }
        Commands::Watch { config } => watch(&config).await?,
    }

    Ok(())
}

fn load(path: Option<&Path>) -> Result<CachePolicyDescriptor, ConfigError> {
    match path {
        Some(path) => CachePolicyDescriptor::load(path),
        None => {
            tracing::debug!("No --config given, using bundled descriptor");
            bundled::cosmofy()
        }
    }
}

async fn watch(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let live = Arc::new(ArcSwap::from_pointee(CachePolicyDescriptor::load(path)?));

    let (watcher, updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;
    let updater = tokio::spawn(apply_updates(live.clone(), updates));

    tokio::signal::ctrl_c().await?;
    updater.abort();

    tracing::info!(service = %live.load().name(), "Stopped watching");
    Ok(())
}

fn report(error: &(dyn std::error::Error + 'static)) {
    match error.downcast_ref::<ConfigError>() {
        Some(ConfigError::Invalid(errors)) => {
            eprintln!("Error: descriptor rejected with {} violation(s):", errors.len());
            for err in errors {
                eprintln!("  - {}", err);
            }
        }
        _ => eprintln!("Error: {}", error),
    }
}
