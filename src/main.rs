use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use freshet::app::AppContext;
use freshet::cli::{commands, Cli, Commands};
use freshet::config::{parse_interval, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.no_head {
        config.watch.probe_with_head = false;
    }

    let mut ctx = AppContext::new(config)?;
    if let Some(timeout) = &cli.timeout {
        ctx.timeout = parse_interval(timeout)?;
    }
    for line in &cli.headers {
        ctx.request = std::mem::take(&mut ctx.request).with_header_line(line)?;
    }

    match cli.command {
        Commands::Check { inputs, state } => {
            commands::check(&ctx, &inputs, state.as_deref()).await?;
        }
        Commands::Watch {
            inputs,
            interval,
            workers,
            output,
        } => {
            let interval = match interval {
                Some(interval) => parse_interval(&interval)?,
                None => ctx.config.watch.interval()?,
            };
            let workers = workers.unwrap_or(ctx.config.watch.workers);
            commands::watch(&ctx, &inputs, interval, workers, output.as_deref()).await?;
        }
    }

    Ok(())
}
