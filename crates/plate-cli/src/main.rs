use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("plate error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    let config = bootstrap::load_config(&flags)?;
    init_tracing(&flags, &config.general.log_level)?;
    context::warn_unconfigured(&config);

    let ctx = context::AppContext::init(config).await?;
    let result = commands::dispatch::dispatch(cli.command, &ctx, &flags).await;
    ctx.shutdown();
    result
}

/// `PLATE_LOG` wins, then `--quiet`/`--verbose`, then `general.log_level`.
fn init_tracing(flags: &cli::GlobalFlags, log_level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PLATE_LOG").or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(fallback_directive(flags, log_level))
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn fallback_directive<'a>(flags: &cli::GlobalFlags, log_level: &'a str) -> &'a str {
    if flags.quiet {
        "error"
    } else if flags.verbose {
        "debug"
    } else {
        log_level
    }
}
