//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for all domain crates:
//! - `TestScylla`: ScyllaDB container with a per-instance keyspace (feature: "scylla")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Features
//!
//! - `scylla`: Enables ScyllaDB test infrastructure
//! - `all`: Enables all database test infrastructure
//!
//! # Usage
//!
//! Add `features = ["scylla"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["scylla"] }
//! ```
//!
//! Then in your tests:
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestScylla};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_scylla_test() {
//!     let scylla = TestScylla::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_scylla_test");
//!
//!     let session = scylla.session();
//!     let email = builder.email("main");
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "scylla")]
mod scylla;

#[cfg(feature = "scylla")]
pub use scylla::TestScylla;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded random data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// This is the recommended way to create a builder for consistent test data.
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_resource");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique user ID for testing
    pub fn user_id(&self) -> Uuid {
        // Use seed to generate deterministic UUID
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// Generate a unique email for testing
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// let email = builder.email("main");
    /// // Returns: "main.12345@test.example.com"
    /// ```
    pub fn email(&self, local: &str) -> String {
        format!("{}.{}@test.example.com", local, self.seed)
    }

    /// Generate a keyspace name that passes CQL identifier validation
    pub fn keyspace(&self, prefix: &str) -> String {
        // 20 digits max for u64; prefix should stay short
        format!("{}_{}", prefix, self.seed)
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    /// Assert that two UUIDs are equal with a nice error message
    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
