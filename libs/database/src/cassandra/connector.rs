use scylla::client::PoolSize;
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::policies::load_balancing::DefaultPolicy;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::CassandraConfig;
use super::error::CassandraError;
use super::health::{HealthStatus, check_health_detailed, get_cluster_info};

/// Shared session handle. Cloning it never opens new connections.
pub type CassandraSession = Arc<Session>;

/// Owns the single long-lived session to the cluster.
///
/// The session is opened once by [`ConnectionManager::connect`] and handed out to
/// the schema bootstrapper and repositories through [`ConnectionManager::session`].
/// No keyspace is bound at connect time, so the manager works against a cluster
/// where the application keyspace does not exist yet.
///
/// The manager never retries; callers decide whether to repeat start-up
/// (see [`crate::common::retry_if`]).
///
/// # Example
/// ```ignore
/// use database::cassandra::{CassandraConfig, ConnectionManager};
///
/// let mut manager = ConnectionManager::connect(CassandraConfig::default()).await?;
/// let session = manager.session()?;
/// // ... hand `session` to repositories ...
/// manager.disconnect();
/// ```
pub struct ConnectionManager {
    config: CassandraConfig,
    session: Option<CassandraSession>,
}

impl ConnectionManager {
    /// Open a pooled session to the cluster described by `config`.
    ///
    /// Fails with [`CassandraError::Connection`] when no contact point is reachable
    /// or authentication is rejected, and with a configuration error when the
    /// descriptor is unusable.
    #[instrument(name = "cassandra.connect", skip(config), fields(keyspace = %config.keyspace))]
    pub async fn connect(config: CassandraConfig) -> Result<Self, CassandraError> {
        config.validate()?;

        let nodes = config.node_addresses();
        info!(
            nodes = ?nodes,
            datacenter = ?config.local_datacenter,
            authenticated = config.credentials().is_some(),
            "Connecting to Cassandra"
        );

        let session = build_session(&config, &nodes).await?;

        let cluster = get_cluster_info(&session)
            .await
            .map_err(|e| CassandraError::Connection(format!("connection check failed: {e}")))?;

        if let (Some(expected), Some(actual)) = (&config.local_datacenter, &cluster.datacenter)
            && expected != actual
        {
            warn!(
                configured = %expected,
                coordinator = %actual,
                "Configured local datacenter differs from the coordinator's datacenter"
            );
        }

        info!(
            cluster = ?cluster.cluster_name,
            datacenter = ?cluster.datacenter,
            version = ?cluster.release_version,
            "Connected to Cassandra"
        );

        Ok(Self {
            config,
            session: Some(Arc::new(session)),
        })
    }

    /// The live session handle; the same `Arc` for the whole connected lifetime.
    pub fn session(&self) -> Result<CassandraSession, CassandraError> {
        self.session.clone().ok_or(CassandraError::NotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &CassandraConfig {
        &self.config
    }

    pub fn keyspace(&self) -> &str {
        self.config.keyspace()
    }

    /// Round trip to `system.local`; reports unhealthy when disconnected.
    pub async fn health_check(&self) -> HealthStatus {
        match &self.session {
            Some(session) => check_health_detailed(session).await,
            None => HealthStatus::unavailable("session is not connected"),
        }
    }

    /// Release the manager's session handle.
    ///
    /// Pooled connections close once the last clone of the handle is dropped.
    /// Calling this on a disconnected manager is a no-op.
    pub fn disconnect(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("Cassandra session already disconnected");
            return;
        };

        let outstanding = Arc::strong_count(&session) - 1;
        drop(session);

        if outstanding > 0 {
            warn!(
                outstanding,
                "Session handles still alive; connections close when they are dropped"
            );
        }
        info!("Cassandra connection closed");
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if self.session.is_some() {
            debug!("ConnectionManager dropped while connected, closing session");
            self.disconnect();
        }
    }
}

async fn build_session(
    config: &CassandraConfig,
    nodes: &[String],
) -> Result<Session, CassandraError> {
    let mut policy = DefaultPolicy::builder();
    if let Some(datacenter) = &config.local_datacenter {
        policy = policy.prefer_datacenter(datacenter.clone());
    }

    let profile = ExecutionProfile::builder()
        .request_timeout(Some(Duration::from_secs(config.request_timeout_secs)))
        .load_balancing_policy(policy.build())
        .build();

    let pool_size = NonZeroUsize::new(config.connections_per_host)
        .map(PoolSize::PerHost)
        .unwrap_or_default();

    let mut builder = SessionBuilder::new()
        .known_nodes(nodes)
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_size(pool_size)
        .default_execution_profile_handle(profile.into_handle());

    if let Some((username, password)) = config.credentials() {
        builder = builder.user(username, password);
    }

    builder
        .build()
        .await
        .map_err(|e| CassandraError::Connection(e.to_string()))
}
