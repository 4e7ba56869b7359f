use anyhow::Result;
use clap::Parser;
use finman::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    finman::logging::init(cli.verbose);
    cli.run().await
}
