use hris_server::{Server, setup_environment};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = setup_environment()?;

    tracing::info!(
        "Starting hris-server {} (env: {})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
