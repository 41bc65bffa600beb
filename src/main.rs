use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use ns_autotune::cli::args::Args;
use ns_autotune::core::config::ToolConfig;
use ns_autotune::core::pipeline;
use ns_autotune::core::resolver::{RunConfig, SystemClock};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?args, "parsed CLI arguments");

    let config = RunConfig::resolve(&args, &SystemClock);
    let tools =
        ToolConfig::load(args.config.as_deref()).wrap_err("failed to load configuration")?;

    tracing::info!(
        dir = %config.base_dir.display(),
        host = %config.ns_host,
        start = %config.start_date,
        end = %config.end_date,
        runs = config.runs,
        "starting autotune"
    );

    pipeline::run(&config, &tools).wrap_err("autotune run failed")?;
    Ok(())
}
