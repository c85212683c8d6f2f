use anyhow::Result;
use mailfiler::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
