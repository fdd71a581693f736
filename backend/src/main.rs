//! Backend entry-point: loads configuration and runs the HTTP server.

use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use coursepay::server::config::ServerConfig;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env()
        .map_err(|error| std::io::Error::other(error.to_string()))?;

    coursepay::server::run(config).await
}
