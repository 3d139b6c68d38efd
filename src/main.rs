use clap::Parser;
use insiderwatch::adapter::inbound::cli::command::{Cli, Commands};
use insiderwatch::adapter::inbound::cli::{check, load_config, recover, run};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let command = cli.selected();
    if command != Commands::Check {
        config.init_logging();
    }

    let result = match command {
        Commands::Run => run::execute(config).await,
        Commands::Recover => recover::execute(config).await,
        Commands::Check => check::execute(&config),
    };

    if let Err(e) = result {
        error!(error = %e, "Fatal error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
