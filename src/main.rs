use clap::Parser;
use weather_dataset::cli::{run, Cli};
use weather_dataset::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
