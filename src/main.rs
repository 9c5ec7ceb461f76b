use anyhow::Result;
use kora::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
