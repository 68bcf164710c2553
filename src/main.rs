use clap::Parser;
use search_cache_proxy::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::ClearCache => cli::clear_cache::run().await,
    }
}
