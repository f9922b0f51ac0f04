use anyhow::Result;
use clap::Parser;
use rlcost::cli::Cli;

mod main_runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    if cli.command.is_long_running() {
        main_runtime::init_logging(&config.logging);
    } else {
        main_runtime::init_logging_simple();
    }

    cli.run(config).await
}
