mod config;
mod server;

use clap::Parser;
use config::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start(start_config) => {
            server::init_tracing(start_config.debug);
            server::start_server(&start_config).await?;
        }
        Commands::Version => {
            println!("ledgerd v{}", env!("CARGO_PKG_VERSION"));
            println!("Account-and-ledger service");
        }
    }

    Ok(())
}
