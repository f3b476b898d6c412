#![cfg(all(feature = "mongodb", feature = "memory"))]

/// Integration tests for driver selection
use std::sync::Arc;

use docroute_drivers::memory::MemoryDriver;
use docroute_drivers::{ConnectionConfig, DocrouteError, DriverRegistry, StoreDriver};
use serde_json::json;

#[test]
fn test_defaults_register_every_enabled_driver() {
    let registry = DriverRegistry::with_defaults();
    assert_eq!(registry.list(), vec!["memory", "mongodb"]);
    assert!(registry.has("mongodb"));
    assert!(registry.has("memory"));
    assert!(!registry.has("postgres"));
}

#[test]
fn test_empty_registry() {
    let registry = DriverRegistry::new();
    assert!(registry.list().is_empty());
    assert!(registry.get("mongodb").is_none());
}

#[test]
fn test_for_uri_selects_by_scheme() {
    let registry = DriverRegistry::with_defaults();
    assert_eq!(
        registry.for_uri("mongodb://localhost:27017").unwrap().id(),
        "mongodb"
    );
    assert_eq!(
        registry
            .for_uri("mongodb+srv://cluster0.example.net")
            .unwrap()
            .id(),
        "mongodb"
    );
    assert_eq!(registry.for_uri("memory://").unwrap().id(), "memory");
}

#[test]
fn test_for_uri_rejects_unknown_or_missing_scheme() {
    let registry = DriverRegistry::with_defaults();

    let err = registry.for_uri("postgres://localhost").err().unwrap();
    assert!(matches!(err, DocrouteError::Configuration(ref msg) if msg.contains("postgres")));

    let err = registry.for_uri("localhost:27017").err().unwrap();
    assert!(matches!(err, DocrouteError::Configuration(_)));
}

#[tokio::test]
async fn test_registered_driver_replaces_default() {
    let shared = Arc::new(MemoryDriver::new());
    let mut registry = DriverRegistry::with_defaults();
    registry.register(shared.clone());

    let driver = registry.for_uri("memory://").unwrap();
    let conn = driver
        .connect(&ConnectionConfig::new("memory://", "shop"))
        .await
        .unwrap();
    conn.insert(
        "GroceryInventory",
        json!({ "item": "milk" }).as_object().cloned().unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(shared.connections_opened(), 1);
    assert_eq!(shared.store().find_all("shop", "GroceryInventory").len(), 1);
}
