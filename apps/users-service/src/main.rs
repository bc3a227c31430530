use core_config::tracing::{init_tracing, install_color_eyre};
use database::cassandra::CassandraError;
use database::common::retry_if;
use domain_users::{CassandraUserRepository, UserService};
use tokio::signal;
use tracing::info;
use users_service::config::Config;
use users_service::{log_user_count, start};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    info!(
        nodes = ?config.cassandra.node_addresses(),
        keyspace = config.cassandra.keyspace(),
        write_mode = ?config.write_mode,
        "Starting users service"
    );

    // Connect and bootstrap the schema; nothing below runs until both succeed
    let mut manager = retry_if(
        || start(&config.cassandra),
        config.startup_retry.clone(),
        CassandraError::is_transient,
    )
    .await
    .map_err(|e| eyre::eyre!("Cassandra startup failed: {}", e))?;

    let repository = CassandraUserRepository::new(manager.session()?, manager.keyspace()).await?;
    let service = UserService::new(repository).with_write_mode(config.write_mode);

    let health = manager.health_check().await;
    info!(
        healthy = health.healthy,
        response_time_ms = health.response_time_ms,
        version = ?health.version,
        "Cassandra health"
    );

    log_user_count(&service).await;

    shutdown_signal().await?;

    info!("Shutting down: closing Cassandra connection");
    drop(service);
    manager.disconnect();

    info!("Users service shutdown complete");
    Ok(())
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    #[cfg(unix)]
    let terminate = sigterm.recv();

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Option<()>>();

    tokio::select! {
        result = signal::ctrl_c() => {
            result?;
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }

    Ok(())
}
