//! Unit tests for the memory driver

use super::*;
use docroute_core::{ConnectionConfig, DocrouteError, Document, DocumentId, StoreDriver};
use serde_json::json;
use std::time::Duration;

fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn config(database: &str) -> ConnectionConfig {
    ConnectionConfig::new("memory://", database)
}

mod driver_metadata_tests {
    use super::*;

    #[test]
    fn test_memory_driver_id() {
        let driver = MemoryDriver::new();
        assert_eq!(driver.id(), "memory");
        assert_eq!(driver.display_name(), "In-memory");
    }

    #[test]
    fn test_memory_driver_accepts_memory_uri() {
        let driver = MemoryDriver::new();
        assert!(driver.accepts_uri("memory://"));
        assert!(driver.accepts_uri("memory://local"));
        assert!(!driver.accepts_uri("mongodb://localhost"));
        assert!(!driver.accepts_uri("memory"));
    }
}

mod connect_tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_opens_connection_scoped_to_database() {
        let driver = MemoryDriver::new();
        let conn = driver.connect(&config("shop")).await.unwrap();
        assert_eq!(conn.database(), "shop");
        assert_eq!(conn.driver_name(), "memory");
        assert_eq!(driver.connect_attempts(), 1);
        assert_eq!(driver.connections_opened(), 1);
    }

    #[tokio::test]
    async fn test_refused_database_fails_with_connection_error() {
        let driver = MemoryDriver::new();
        driver.refuse_database("locked");
        let err = driver.connect(&config("locked")).await.err().unwrap();
        assert!(matches!(err, DocrouteError::Connection(_)));
        assert_eq!(driver.connections_opened(), 0);

        driver.accept_database("locked");
        assert!(driver.connect(&config("locked")).await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_next_connects_then_recover() {
        let driver = MemoryDriver::new();
        driver.fail_next_connects(2);
        assert!(driver.connect(&config("shop")).await.is_err());
        assert!(driver.connect(&config("shop")).await.is_err());
        assert!(driver.connect(&config("shop")).await.is_ok());
        assert_eq!(driver.connect_attempts(), 3);
        assert_eq!(driver.connections_opened(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_delay() {
        let driver = MemoryDriver::new().with_connect_delay(Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        driver.connect(&config("shop")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_closed_connection_rejects_operations() {
        let driver = MemoryDriver::new();
        let conn = driver.connect(&config("shop")).await.unwrap();
        conn.close().await.unwrap();
        assert!(conn.is_closed());
        let err = conn.find_all("items").await.unwrap_err();
        assert!(matches!(err, DocrouteError::Connection(_)));
    }
}

mod document_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_id_and_find_all_returns_in_order() {
        let driver = MemoryDriver::new();
        let conn = driver.connect(&config("shop")).await.unwrap();

        let first = conn.insert("items", doc(json!({ "n": 1 }))).await.unwrap();
        let second = conn.insert("items", doc(json!({ "n": 2 }))).await.unwrap();
        assert!(DocumentId::of(&first).is_some());
        assert_ne!(first["_id"], second["_id"]);

        let all = conn.find_all("items").await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn test_find_all_on_missing_collection_is_empty() {
        let driver = MemoryDriver::new();
        let conn = driver.connect(&config("shop")).await.unwrap();
        assert!(conn.find_all("nothing").await.unwrap().is_empty());
        assert!(!conn.collection_exists("nothing").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let driver = MemoryDriver::new();
        let conn = driver.connect(&config("shop")).await.unwrap();
        let stored = conn
            .insert("items", doc(json!({ "a": 1, "b": 2 })))
            .await
            .unwrap();
        let id = DocumentId::of(&stored).unwrap();

        let updated = conn
            .update_by_id("items", id, doc(json!({ "b": 3, "c": 4 })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["a"], json!(1));
        assert_eq!(updated["b"], json!(3));
        assert_eq!(updated["c"], json!(4));
        assert_eq!(conn.find_by_id("items", id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let driver = MemoryDriver::new();
        let conn = driver.connect(&config("shop")).await.unwrap();
        conn.insert("items", doc(json!({ "a": 1 }))).await.unwrap();
        let unknown = DocumentId::generate();
        assert!(
            conn.update_by_id("items", unknown, doc(json!({ "a": 2 })))
                .await
                .unwrap()
                .is_none()
        );
        assert!(conn.delete_by_id("items", unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_removed_document() {
        let driver = MemoryDriver::new();
        let conn = driver.connect(&config("shop")).await.unwrap();
        let stored = conn.insert("items", doc(json!({ "a": 1 }))).await.unwrap();
        let id = DocumentId::of(&stored).unwrap();

        let deleted = conn.delete_by_id("items", id).await.unwrap();
        assert_eq!(deleted, Some(stored));
        assert!(conn.find_by_id("items", id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_connections_share_one_store() {
        let driver = MemoryDriver::new();
        let a = driver.connect(&config("shop")).await.unwrap();
        let b = driver.connect(&config("shop")).await.unwrap();
        let other = driver.connect(&config("hr")).await.unwrap();

        a.insert("items", doc(json!({ "a": 1 }))).await.unwrap();
        assert_eq!(b.find_all("items").await.unwrap().len(), 1);
        assert!(other.find_all("items").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drop_collection() {
        let driver = MemoryDriver::new();
        let conn = driver.connect(&config("shop")).await.unwrap();
        conn.insert("items", doc(json!({ "a": 1 }))).await.unwrap();
        assert!(conn.collection_exists("items").await.unwrap());

        conn.drop_collection("items").await.unwrap();
        assert!(!conn.collection_exists("items").await.unwrap());
        assert!(conn.find_all("items").await.unwrap().is_empty());
        assert!(driver.store().collection_names("shop").is_empty());
    }

    #[test]
    fn test_create_collection_is_idempotent() {
        let store = MemoryStore::new();
        store.create_collection("shop", "items");
        store.create_collection("shop", "items");
        assert_eq!(store.collection_names("shop"), vec!["items".to_string()]);
    }
}
