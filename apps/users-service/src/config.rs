use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use database::cassandra::CassandraConfig;
use database::common::RetryConfig;
use domain_users::WriteMode;

// Re-export Environment for use in main
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub cassandra: CassandraConfig,
    pub startup_retry: RetryConfig,
    pub write_mode: WriteMode,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        // Defaults: localhost:9042, keyspace user_store
        let cassandra = CassandraConfig::from_env()?;
        let startup_retry =
            RetryConfig::new().with_max_retries(env_parse("STARTUP_MAX_RETRIES", 5)?);
        let write_mode = parse_write_mode(&env_or_default("USERS_WRITE_MODE", "best_effort"))?;

        Ok(Self {
            cassandra,
            startup_retry,
            write_mode,
            environment,
        })
    }
}

fn parse_write_mode(value: &str) -> Result<WriteMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "best_effort" | "best-effort" => Ok(WriteMode::BestEffort),
        "conditional" => Ok(WriteMode::Conditional),
        other => Err(ConfigError::ParseError {
            key: "USERS_WRITE_MODE".to_string(),
            details: format!("expected 'best_effort' or 'conditional', got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars_unset(
            [
                "APP_ENV",
                "CASSANDRA_CONTACT_POINTS",
                "CASSANDRA_KEYSPACE",
                "STARTUP_MAX_RETRIES",
                "USERS_WRITE_MODE",
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.cassandra.keyspace(), "user_store");
                assert_eq!(config.startup_retry.max_retries, 5);
                assert_eq!(config.write_mode, WriteMode::BestEffort);
            },
        );
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("CASSANDRA_CONTACT_POINTS", Some("10.0.0.1,10.0.0.2")),
                ("STARTUP_MAX_RETRIES", Some("2")),
                ("USERS_WRITE_MODE", Some("Conditional")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_production());
                assert_eq!(config.cassandra.contact_points.len(), 2);
                assert_eq!(config.startup_retry.max_retries, 2);
                assert_eq!(config.write_mode, WriteMode::Conditional);
            },
        );
    }

    #[test]
    fn test_invalid_write_mode() {
        assert!(parse_write_mode("sometimes").is_err());
    }

    #[test]
    fn test_invalid_retry_count() {
        temp_env::with_var("STARTUP_MAX_RETRIES", Some("many"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
