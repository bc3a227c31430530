//! Integration tests for Users domain
//!
//! These tests use real ScyllaDB via testcontainers to ensure:
//! - Schema bootstrap is idempotent, including for mixed-case keyspace names
//! - Statements are accepted by the cluster and bind correctly
//! - Lightweight transactions report `[applied]` correctly
//! - The connection manager releases the session on disconnect
//!
//! Run with `cargo test -p domain_users -- --ignored` (requires Docker).

use database::cassandra::{CassandraError, ConnectionManager, Session};
use domain_users::*;
use std::time::Duration;
use test_utils::{TestDataBuilder, TestScylla, assertions::*};
use uuid::Uuid;

async fn setup() -> (TestScylla, UserService<CassandraUserRepository>) {
    let scylla = TestScylla::new().await;
    let session = scylla.session();

    schema::bootstrap(&session, scylla.keyspace()).await.unwrap();

    let repo = CassandraUserRepository::new(session, scylla.keyspace())
        .await
        .unwrap();
    (scylla, UserService::new(repo))
}

// ============================================================================
// Schema Tests
// ============================================================================

/// Tables, columns and indexes of a keyspace, sorted
#[derive(Debug, PartialEq)]
struct SchemaSnapshot {
    tables: Vec<String>,
    columns: Vec<(String, String, String, String)>,
    indexes: Vec<(String, String, String)>,
}

async fn schema_snapshot(session: &Session, keyspace: &str) -> SchemaSnapshot {
    // Unquoted identifiers are stored lower-cased
    let keyspace = keyspace.to_lowercase();

    let mut tables: Vec<String> = session
        .query_unpaged(
            "SELECT table_name FROM system_schema.tables WHERE keyspace_name = ?",
            (&keyspace,),
        )
        .await
        .unwrap()
        .into_rows_result()
        .unwrap()
        .rows::<(String,)>()
        .unwrap()
        .map(|row| row.unwrap().0)
        .collect();
    tables.sort();

    let mut columns: Vec<(String, String, String, String)> = session
        .query_unpaged(
            "SELECT table_name, column_name, type, kind FROM system_schema.columns WHERE keyspace_name = ?",
            (&keyspace,),
        )
        .await
        .unwrap()
        .into_rows_result()
        .unwrap()
        .rows::<(String, String, String, String)>()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    columns.sort();

    let mut indexes: Vec<(String, String, String)> = session
        .query_unpaged(
            "SELECT table_name, index_name, kind FROM system_schema.indexes WHERE keyspace_name = ?",
            (&keyspace,),
        )
        .await
        .unwrap()
        .into_rows_result()
        .unwrap()
        .rows::<(String, String, String)>()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    indexes.sort();

    SchemaSnapshot {
        tables,
        columns,
        indexes,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_bootstrap_twice_is_idempotent() {
    let scylla = TestScylla::new().await;
    let session = scylla.session();

    schema::bootstrap(&session, scylla.keyspace()).await.unwrap();
    let first = schema_snapshot(&session, scylla.keyspace()).await;

    schema::bootstrap(&session, scylla.keyspace()).await.unwrap();
    let second = schema_snapshot(&session, scylla.keyspace()).await;

    assert_eq!(first, second);
    assert_eq!(first.tables, vec!["users".to_string()]);
    assert_eq!(first.columns.len(), 6);
    assert!(
        first
            .indexes
            .iter()
            .any(|(table, index, _)| table == "users" && index == "users_email_idx")
    );

    // Table is usable after the second run
    let repo = CassandraUserRepository::new(session, scylla.keyspace())
        .await
        .unwrap();
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_bootstrap_mixed_case_keyspace() {
    let scylla = TestScylla::new().await;
    let session = scylla.session();
    let keyspace = TestDataBuilder::from_test_name("bootstrap_mixed_case").keyspace("UserStore");

    schema::bootstrap(&session, &keyspace).await.unwrap();
    schema::bootstrap(&session, &keyspace).await.unwrap();

    let snapshot = schema_snapshot(&session, &keyspace).await;
    assert_eq!(snapshot.tables, vec!["users".to_string()]);

    let service = UserService::new(
        CassandraUserRepository::new(session, &keyspace)
            .await
            .unwrap(),
    );
    let created = service
        .create_user(CreateUser::new("mixed@x.com", "Mixed", "Case"))
        .await
        .unwrap();
    let fetched = service
        .get_user_by_id(&created.id.to_string())
        .await
        .unwrap();
    assert_eq!(assert_some(fetched, "user in mixed-case keyspace"), created);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_bootstrap_rejects_unsafe_keyspace() {
    let scylla = TestScylla::new().await;
    let err = schema::bootstrap(&scylla.session(), "users; DROP KEYSPACE system")
        .await
        .unwrap_err();
    assert!(matches!(err, CassandraError::InvalidIdentifier(_)));
}

// ============================================================================
// Repository / Service Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_update_delete_scenario() {
    let (_scylla, service) = setup().await;

    let created = service
        .create_user(CreateUser::new("a@x.com", "A", "B"))
        .await
        .unwrap();
    let id = created.id.to_string();

    let fetched = service.get_user_by_id(&id).await.unwrap();
    assert_eq!(assert_some(fetched, "created user"), created);

    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = service
        .update_user(&id, UpdateUser::default().with_last_name("C"))
        .await
        .unwrap();
    let updated = assert_some(updated, "updated user");
    assert_eq!(updated.first_name, "A");
    assert_eq!(updated.last_name, "C");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    assert!(service.delete_user(&id).await.unwrap());
    assert!(service.get_user_by_id(&id).await.unwrap().is_none());
    assert!(!service.delete_user(&id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_missing_user_creates_no_row() {
    let (_scylla, service) = setup().await;
    let id = Uuid::new_v4().to_string();

    let result = service
        .update_user(&id, UpdateUser::default().with_email("ghost@x.com"))
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(service.get_all_users().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_users_by_email() {
    let (_scylla, service) = setup().await;
    let builder = TestDataBuilder::from_test_name("scylla_find_by_email");
    let shared = builder.email("shared");

    for first_name in ["One", "Two"] {
        service
            .create_user(CreateUser::new(&shared, first_name, "User"))
            .await
            .unwrap();
    }
    service
        .create_user(CreateUser::new(builder.email("other"), "Three", "User"))
        .await
        .unwrap();

    // ScyllaDB indexes are view-backed and catch up asynchronously
    let mut found = Vec::new();
    for _ in 0..50 {
        found = service.find_users_by_email(&shared).await.unwrap();
        if found.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|u| u.email == shared));
    assert_eq!(service.get_all_users().await.unwrap().len(), 3);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_conditional_write_mode() {
    let (_scylla, service) = setup().await;
    let service = service.with_write_mode(WriteMode::Conditional);

    let created = service
        .create_user(CreateUser::new("lwt@x.com", "L", "W"))
        .await
        .unwrap();
    let id = created.id.to_string();

    let updated = service
        .update_user(&id, UpdateUser::default().with_first_name("T"))
        .await
        .unwrap();
    assert_eq!(assert_some(updated, "conditional update").first_name, "T");

    assert!(service.delete_user(&id).await.unwrap());
    assert!(!service.delete_user(&id).await.unwrap());

    let missing = service
        .update_user(&id, UpdateUser::default().with_first_name("X"))
        .await
        .unwrap();
    assert!(missing.is_none());
    assert!(service.get_all_users().await.unwrap().is_empty());
}

// ============================================================================
// Connection Manager Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_disconnect_releases_session() {
    let scylla = TestScylla::new().await;
    let mut manager = ConnectionManager::connect(scylla.config()).await.unwrap();

    assert!(manager.is_connected());
    assert!(manager.health_check().await.healthy);

    manager.disconnect();
    assert!(!manager.is_connected());
    assert!(matches!(
        manager.session(),
        Err(CassandraError::NotConnected)
    ));

    // Second call is a no-op
    manager.disconnect();
    assert!(!manager.health_check().await.healthy);
}
