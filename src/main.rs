use brrtfn::cli::{run_cli, Cli, Commands};
use brrtfn::logging::{init_logging_with_config, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // listing commands write to stdout; keep log lines out of it
    let _logging = match cli.command {
        Commands::Serve { .. } => Some(init_logging_with_config(&LogConfig::from_env())?),
        Commands::Functions { .. } => None,
    };
    run_cli(cli)
}
