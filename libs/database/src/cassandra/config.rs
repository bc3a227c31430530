use std::net::{Ipv6Addr, SocketAddr};

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};

use super::error::CassandraError;
use super::schema::validate_identifier;

pub const DEFAULT_PORT: u16 = 9042;
pub const DEFAULT_KEYSPACE: &str = "user_store";
pub const DEFAULT_DATACENTER: &str = "datacenter1";

/// Cassandra/ScyllaDB connection descriptor
///
/// Holds everything needed to open a session: contact points, native-protocol port,
/// the application keyspace, the local datacenter used for load balancing and
/// optional credentials. It can be constructed manually or loaded from environment
/// variables (with the `config` feature).
///
/// # Example
///
/// ```ignore
/// use database::cassandra::CassandraConfig;
///
/// let config = CassandraConfig::new(vec!["10.0.0.1", "10.0.0.2"])
///     .with_keyspace("user_store")
///     .with_datacenter("dc1")
///     .with_credentials("cassandra", "cassandra");
/// ```
#[derive(Clone, Debug)]
pub struct CassandraConfig {
    /// Contact points, either bare hosts (combined with `port`) or `host:port` pairs
    pub contact_points: Vec<String>,

    /// Native protocol port used for hosts without an explicit port
    pub port: u16,

    /// Keyspace the application tables live in
    pub keyspace: String,

    /// Datacenter preferred by the load-balancing policy
    pub local_datacenter: Option<String>,

    /// Optional username for authentication
    pub username: Option<String>,

    /// Optional password for authentication
    pub password: Option<String>,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Number of connections per host
    pub connections_per_host: usize,
}

impl CassandraConfig {
    /// Create a config for the given contact points with default settings
    pub fn new<S: Into<String>>(contact_points: Vec<S>) -> Self {
        Self {
            contact_points: contact_points.into_iter().map(|s| s.into()).collect(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = keyspace.into();
        self
    }

    /// Set the local datacenter for DC-aware load balancing
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.local_datacenter = Some(datacenter.into());
        self
    }

    /// Set authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_connections_per_host(mut self, count: usize) -> Self {
        self.connections_per_host = count;
        self
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Credentials as a pair, only when both halves are present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }

    /// Contact points resolved to `host:port` strings for the driver
    pub fn node_addresses(&self) -> Vec<String> {
        self.contact_points
            .iter()
            .map(|host| host.trim())
            .filter(|host| !host.is_empty())
            .map(|host| {
                if host.parse::<SocketAddr>().is_ok() {
                    host.to_string()
                } else if let Ok(v6) = host.parse::<Ipv6Addr>() {
                    format!("[{}]:{}", v6, self.port)
                } else if has_explicit_port(host) {
                    host.to_string()
                } else {
                    format!("{}:{}", host, self.port)
                }
            })
            .collect()
    }

    /// Reject descriptors that can never produce a usable session.
    pub fn validate(&self) -> Result<(), CassandraError> {
        if self.node_addresses().is_empty() {
            return Err(CassandraError::InvalidConfig(
                "at least one contact point is required".to_string(),
            ));
        }

        validate_identifier(&self.keyspace)?;

        match (&self.username, &self.password) {
            (Some(_), None) | (None, Some(_)) => Err(CassandraError::InvalidConfig(
                "username and password must be provided together".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn has_explicit_port(host: &str) -> bool {
    host.rsplit_once(':')
        .is_some_and(|(name, port)| !name.contains(':') && port.parse::<u16>().is_ok())
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            contact_points: vec!["localhost".to_string()],
            port: DEFAULT_PORT,
            keyspace: DEFAULT_KEYSPACE.to_string(),
            local_datacenter: Some(DEFAULT_DATACENTER.to_string()),
            username: None,
            password: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            connections_per_host: 1,
        }
    }
}

/// Load CassandraConfig from environment variables
///
/// Environment variables:
/// - `CASSANDRA_CONTACT_POINTS` (default: `localhost`) - Comma-separated hosts or host:port pairs
/// - `CASSANDRA_PORT` (default: 9042)
/// - `CASSANDRA_KEYSPACE` (default: `user_store`)
/// - `CASSANDRA_DATACENTER` (default: `datacenter1`)
/// - `CASSANDRA_USERNAME` / `CASSANDRA_PASSWORD` (optional, blank counts as unset)
/// - `CASSANDRA_CONNECT_TIMEOUT_SECS` (default: 10)
/// - `CASSANDRA_REQUEST_TIMEOUT_SECS` (default: 30)
/// - `CASSANDRA_CONNECTIONS_PER_HOST` (default: 1)
#[cfg(feature = "config")]
impl FromEnv for CassandraConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let contact_points: Vec<String> = env_or_default("CASSANDRA_CONTACT_POINTS", "localhost")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if contact_points.is_empty() {
            return Err(ConfigError::ParseError {
                key: "CASSANDRA_CONTACT_POINTS".to_string(),
                details: "No valid contact points provided".to_string(),
            });
        }

        Ok(Self {
            contact_points,
            port: env_parse("CASSANDRA_PORT", DEFAULT_PORT)?,
            keyspace: env_or_default("CASSANDRA_KEYSPACE", DEFAULT_KEYSPACE),
            local_datacenter: Some(env_or_default("CASSANDRA_DATACENTER", DEFAULT_DATACENTER)),
            username: env_optional("CASSANDRA_USERNAME"),
            password: env_optional("CASSANDRA_PASSWORD"),
            connect_timeout_secs: env_parse("CASSANDRA_CONNECT_TIMEOUT_SECS", 10)?,
            request_timeout_secs: env_parse("CASSANDRA_REQUEST_TIMEOUT_SECS", 30)?,
            connections_per_host: env_parse("CASSANDRA_CONNECTIONS_PER_HOST", 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cassandra_config_default() {
        let config = CassandraConfig::default();
        assert_eq!(config.contact_points, vec!["localhost"]);
        assert_eq!(config.port, 9042);
        assert_eq!(config.keyspace(), "user_store");
        assert_eq!(config.local_datacenter.as_deref(), Some("datacenter1"));
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_cassandra_config_builder_pattern() {
        let config = CassandraConfig::new(vec!["10.0.0.1"])
            .with_port(19042)
            .with_keyspace("accounts")
            .with_datacenter("dc1")
            .with_credentials("user", "pass")
            .with_connect_timeout(30)
            .with_request_timeout(5)
            .with_connections_per_host(4);

        assert_eq!(config.port, 19042);
        assert_eq!(config.keyspace(), "accounts");
        assert_eq!(config.local_datacenter, Some("dc1".to_string()));
        assert_eq!(config.credentials(), Some(("user", "pass")));
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.connections_per_host, 4);
    }

    #[test]
    fn test_node_addresses_combine_host_and_port() {
        let config = CassandraConfig::new(vec![
            "scylla-1",
            "10.0.0.2",
            "10.0.0.3:9142",
            "scylla-4:9043",
            "::1",
            "[::1]:9044",
            " ",
        ])
        .with_port(9050);

        assert_eq!(
            config.node_addresses(),
            vec![
                "scylla-1:9050",
                "10.0.0.2:9050",
                "10.0.0.3:9142",
                "scylla-4:9043",
                "[::1]:9050",
                "[::1]:9044",
            ]
        );
    }

    #[test]
    fn test_validate_accepts_default() {
        assert!(CassandraConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_contact_points() {
        let config = CassandraConfig::new(Vec::<String>::new());
        assert!(matches!(
            config.validate(),
            Err(CassandraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unsafe_keyspace() {
        let config = CassandraConfig::default().with_keyspace("users; DROP KEYSPACE system");
        assert!(matches!(
            config.validate(),
            Err(CassandraError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_validate_rejects_half_credentials() {
        let mut config = CassandraConfig::default();
        config.username = Some("cassandra".to_string());
        assert!(matches!(
            config.validate(),
            Err(CassandraError::InvalidConfig(_))
        ));
        assert!(config.credentials().is_none());
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_cassandra_config_from_env() {
        temp_env::with_vars(
            [
                ("CASSANDRA_CONTACT_POINTS", Some("10.0.0.1, 10.0.0.2")),
                ("CASSANDRA_PORT", Some("19042")),
                ("CASSANDRA_KEYSPACE", Some("testkeyspace")),
                ("CASSANDRA_DATACENTER", Some("dc2")),
                ("CASSANDRA_USERNAME", Some("scylla")),
                ("CASSANDRA_PASSWORD", Some("secret")),
            ],
            || {
                let config = CassandraConfig::from_env().unwrap();
                assert_eq!(config.contact_points, vec!["10.0.0.1", "10.0.0.2"]);
                assert_eq!(config.port, 19042);
                assert_eq!(config.keyspace(), "testkeyspace");
                assert_eq!(config.local_datacenter.as_deref(), Some("dc2"));
                assert_eq!(config.credentials(), Some(("scylla", "secret")));
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_cassandra_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("CASSANDRA_CONTACT_POINTS", None::<&str>),
                ("CASSANDRA_PORT", None),
                ("CASSANDRA_KEYSPACE", None),
                ("CASSANDRA_DATACENTER", None),
                ("CASSANDRA_USERNAME", Some("")),
                ("CASSANDRA_PASSWORD", None),
            ],
            || {
                let config = CassandraConfig::from_env().unwrap();
                assert_eq!(config.node_addresses(), vec!["localhost:9042"]);
                assert_eq!(config.keyspace(), DEFAULT_KEYSPACE);
                assert!(config.username.is_none());
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_cassandra_config_from_env_bad_port() {
        temp_env::with_var("CASSANDRA_PORT", Some("ninety"), || {
            assert!(CassandraConfig::from_env().is_err());
        });
    }
}
