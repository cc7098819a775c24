//! route-dispatch: compile, query and watch a routes file.
//!
//! ```text
//! route-dispatch [-c route-dispatch.toml] check
//! route-dispatch match GET /users/42
//! route-dispatch reverse Users.Show id=42 tab=posts
//! route-dispatch watch
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use route_dispatch::config::{load_config, watch_routes, DispatchConfig};
use route_dispatch::observability::logging::init_logging;
use route_dispatch::registry::{ActionTable, ModuleDirectory};
use route_dispatch::routing::{MatchOutcome, Router};

const DEFAULT_CONFIG: &str = "route-dispatch.toml";

#[derive(Parser)]
#[command(name = "route-dispatch")]
#[command(about = "Route table compiler, matcher and reverse router", long_about = None)]
struct Cli {
    /// Config file. Defaults apply when the default file is absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Routes file, overriding the config.
    #[arg(short, long)]
    routes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the routes file and print the table
    Check,
    /// Match a request against the table
    Match { method: String, path: String },
    /// Generate the URL for an action
    Reverse {
        action: String,
        /// Arguments as key=value
        args: Vec<String>,
    },
    /// Rebuild the table whenever a routes file changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => load_config(Path::new(DEFAULT_CONFIG))?,
        None => DispatchConfig::default(),
    };
    if let Some(routes) = cli.routes {
        config.routes.path = routes;
    }

    init_logging(&config.observability.log_level)?;
    tracing::info!(
        routes = %config.routes.path.display(),
        modules = config.modules.len(),
        validate = config.routes.validate,
        "Configuration loaded"
    );

    let router = Arc::new(build_router(&config));
    let table = router.refresh()?;

    match cli.command {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(table.routes())?);
        }
        Commands::Match { method, path } => match router.route(&method.to_uppercase(), &path) {
            MatchOutcome::Matched(m) => println!("{}", serde_json::to_string_pretty(&m)?),
            MatchOutcome::IntentionalNotFound => println!("404 (intentionally)"),
            MatchOutcome::NoMatch => println!("404 No matching route found"),
        },
        Commands::Reverse { action, args } => {
            let target = router.reverse(&action, parse_args(&args)?)?;
            println!("{}", serde_json::to_string_pretty(&target)?);
        }
        Commands::Watch => {
            let Some((_watcher, mut updates)) = watch_routes(router.clone(), &config.routes)? else {
                return Ok(());
            };

            loop {
                tokio::select! {
                    Some(table) = updates.recv() => {
                        tracing::info!(routes = table.len(), "Serving rebuilt route table");
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutting down");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

fn build_router(config: &DispatchConfig) -> Router {
    let modules = ModuleDirectory::new(config.modules.clone());
    let router = Router::new(config.routes.path.clone()).with_modules(Arc::new(modules));

    // Without declared actions there is nothing to validate against.
    if config.routes.validate && !config.actions.is_empty() {
        router.with_registry(Arc::new(ActionTable::from_declarations(&config.actions)))
    } else {
        router
    }
}

fn parse_args(args: &[String]) -> Result<BTreeMap<String, String>, String> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("argument '{}' is not key=value", arg))
        })
        .collect()
}
