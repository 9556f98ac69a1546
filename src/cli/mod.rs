//! # CLI Module
//!
//! Command-line entry points for the `brrtfn` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Start the HTTP dispatcher with the built-in functions:
//!
//! ```bash
//! brrtfn serve --addr 127.0.0.1:8080 --config brrtfn.yaml --debug
//! ```
//!
//! Options:
//! - `--addr <ADDR>` - Listen address (also `BRRTFN_ADDR`)
//! - `--config <FILE>` - YAML configuration file
//! - `--debug` - Tap element streams into the `brrtfn::tap` log target
//! - `--base-path <PATH>` - Prefix stripped before function names are matched
//!
//! The server stops on SIGINT or SIGTERM.
//!
//! ### `functions`
//!
//! List the built-in functions:
//!
//! ```bash
//! brrtfn functions --format json
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use brrtfn::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{
    describe_functions, render_functions, resolve_config, run_cli, Cli, Commands, FunctionInfo,
    ListFormat,
};
