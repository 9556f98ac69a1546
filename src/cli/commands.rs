use crate::builtins::register_builtins;
use crate::config::AppConfig;
use crate::function::{FunctionRegistry, HandlerKind};
use crate::invoker::Invoker;
use crate::runtime_config::RuntimeConfig;
use crate::server::{FunctionService, HttpServer, ServerHandle};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line interface for brrtfn
#[derive(Parser, Debug)]
#[command(name = "brrtfn", version)]
#[command(about = "Serve functions, consumers and suppliers over HTTP", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP dispatcher with the built-in functions
    Serve {
        /// Listen address (overrides `http.addr`)
        #[arg(long, env = "BRRTFN_ADDR")]
        addr: Option<String>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tap every element stream into debug logs
        #[arg(long, default_value_t = false)]
        debug: bool,

        /// Prefix stripped before function names are matched (overrides `dispatcher.base_path`)
        #[arg(long)]
        base_path: Option<String>,
    },
    /// List the built-in functions and their signatures
    Functions {
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    Json,
}

/// One row of `brrtfn functions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionInfo {
    pub name: String,
    pub kind: HandlerKind,
    pub signature: String,
}

/// Describe every function in `registry`, sorted by name.
pub fn describe_functions(registry: &FunctionRegistry) -> Vec<FunctionInfo> {
    registry
        .names()
        .into_iter()
        .filter_map(|name| registry.get(&name))
        .map(|entry| FunctionInfo {
            name: entry.name.to_string(),
            kind: entry.kind(),
            signature: entry.signature.to_string(),
        })
        .collect()
}

/// Render the function list in the requested format.
///
/// # Errors
///
/// JSON serialization failed.
pub fn render_functions(functions: &[FunctionInfo], format: ListFormat) -> Result<String> {
    match format {
        ListFormat::Json => Ok(serde_json::to_string_pretty(functions)?),
        ListFormat::Table => {
            let width = functions.iter().map(|f| f.name.len()).max().unwrap_or(4).max(4);
            let mut out = format!("{:<width$}  {:<9}  SIGNATURE\n", "NAME", "KIND");
            for f in functions {
                out.push_str(&format!(
                    "{:<width$}  {:<9}  {}\n",
                    f.name,
                    f.kind.as_str(),
                    f.signature
                ));
            }
            Ok(out)
        }
    }
}

/// Resolve file config plus command line overrides.
///
/// # Errors
///
/// The configuration file cannot be loaded.
pub fn resolve_config(
    config: Option<&PathBuf>,
    addr: Option<String>,
    debug: bool,
    base_path: Option<String>,
) -> Result<AppConfig> {
    let file = match config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let mut resolved = file.with_overrides(addr, debug);
    if base_path.is_some() {
        resolved.dispatcher.base_path = base_path;
    }
    Ok(resolved)
}

/// Execute a parsed command line.
///
/// # Errors
///
/// Configuration, bind or shutdown failures.
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Functions { format } => {
            let registry = FunctionRegistry::new();
            register_builtins(&registry);
            print!("{}", render_functions(&describe_functions(&registry), format)?);
            Ok(())
        }
        Commands::Serve {
            addr,
            config,
            debug,
            base_path,
        } => {
            let config = resolve_config(config.as_ref(), addr, debug, base_path)?;
            let runtime = RuntimeConfig::from_env();
            may::config().set_stack_size(runtime.stack_size);

            let registry = match config.dispatcher.base_path.as_deref() {
                Some(base) => FunctionRegistry::with_base_path(base),
                None => FunctionRegistry::new(),
            };
            register_builtins(&registry);

            let debug = runtime.debug || config.dispatcher.debug;
            let service = FunctionService::new(Arc::new(registry), Invoker::new(&runtime))
                .with_debug(debug);

            let handle = HttpServer(service)
                .start(config.http.addr.as_str())
                .with_context(|| format!("Failed to bind {}", config.http.addr))?;
            handle.wait_ready().context("Server did not become ready")?;
            info!(
                addr = %handle.local_addr(),
                stack_size = runtime.stack_size,
                debug,
                base_path = config.dispatcher.base_path.as_deref().unwrap_or("/"),
                "brrtfn serving"
            );
            wait_for_shutdown(handle)
        }
    }
}

/// Block until SIGINT or SIGTERM, then stop the server.
#[cfg(unix)]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server coroutine panicked: {e:?}"))
}
