use scylla::client::session::Session;
use std::time::Instant;
use tracing::warn;

use super::error::CassandraError;

/// Health check status for Cassandra
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the database is healthy
    pub healthy: bool,
    /// Optional message (e.g., error details)
    pub message: Option<String>,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Release version reported by the coordinator node (if available)
    pub version: Option<String>,
}

impl HealthStatus {
    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            response_time_ms: 0,
            version: None,
        }
    }
}

/// Information about the coordinator node the session talks to
#[derive(Debug, Clone, Default)]
pub struct ClusterInfo {
    pub cluster_name: Option<String>,
    pub datacenter: Option<String>,
    pub rack: Option<String>,
    pub release_version: Option<String>,
}

/// Check Cassandra health by reading `system.local`, with timing and version
pub async fn check_health_detailed(session: &Session) -> HealthStatus {
    let start = Instant::now();

    match get_cluster_info(session).await {
        Ok(info) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms: start.elapsed().as_millis() as u64,
            version: info.release_version,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms: start.elapsed().as_millis() as u64,
            version: None,
        },
    }
}

/// Read cluster name, datacenter, rack and version of the coordinator node
pub async fn get_cluster_info(session: &Session) -> Result<ClusterInfo, CassandraError> {
    let result = session
        .query_unpaged(
            "SELECT cluster_name, data_center, rack, release_version FROM system.local",
            (),
        )
        .await?;

    let row = result
        .into_rows_result()
        .map_err(|e| CassandraError::Response(format!("system.local: {e}")))
        .and_then(|rows| {
            rows.maybe_first_row::<LocalRow>()
                .map_err(|e| CassandraError::Response(format!("system.local: {e}")))
        });

    cluster_info_from_row(row)
}

type LocalRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn cluster_info_from_row(
    row: Result<Option<LocalRow>, CassandraError>,
) -> Result<ClusterInfo, CassandraError> {
    match row? {
        Some((cluster_name, datacenter, rack, release_version)) => Ok(ClusterInfo {
            cluster_name,
            datacenter,
            rack,
            release_version,
        }),
        None => {
            warn!("system.local returned no rows");
            Ok(ClusterInfo::default())
        }
    }
}
