use anyhow::Context;

use port_out_validation::config::ServiceConfig;
use port_out_validation::logging::{bootstrap_subscriber, init_logging};
use port_out_validation::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config loading logs before the configured subscriber is installed
    let bootstrap = bootstrap_subscriber(std::io::stderr);
    let config = tracing::subscriber::with_default(bootstrap, ServiceConfig::from_env)
        .context("Failed to load configuration")?;

    // Held until exit so the file writer flushes
    let _log_guard = init_logging(&config.logging);

    eprintln!("📞 Port-out validation v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Endpoint: POST http://0.0.0.0:{}{}",
        config.port, config.path
    );
    eprintln!("   Health:   GET  http://0.0.0.0:{}/health", config.port);
    eprintln!(
        "   Records:  {} (table {})",
        config.database.path.display(),
        config.table_name
    );

    server::run(config).await.context("Server failed")?;
    Ok(())
}
