use anyhow::{Context, Result};
use dlist_server::config::{LoggingConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any variable
    dotenv::dotenv().ok();

    dlist_server::init_logging(&LoggingConfig::from_env());

    // Load configuration from environment variables
    let config = ServerConfig::load().context("Failed to load configuration")?;

    // Run the server using the library's run function
    dlist_server::run(config).await.context("Server error")?;

    Ok(())
}
