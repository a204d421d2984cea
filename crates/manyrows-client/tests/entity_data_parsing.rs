//! Integration tests for parsing ManyRows response data.
//!
//! These tests validate that the manyrows-client models can correctly
//! deserialize recorded ManyRows API responses.

use manyrows_client::{Entity, EntityUuid, ErrorInfo, QueryResponse};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture from disk.
fn load_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_deserialize_query_response() {
    let json_data = load_fixture("query_response.json");

    let response: QueryResponse = serde_json::from_str(&json_data).unwrap_or_else(|e| {
        panic!(
            "Failed to deserialize query response: {}\nJSON: {}",
            e, json_data
        )
    });

    assert_eq!(response.total(), 7);
    assert_eq!(response.page.request.page, 0);
    assert_eq!(response.page.request.size, 3);
    assert_eq!(response.items.len(), 3, "Expected 3 entities on the page");

    for entity in &response.items {
        assert!(!entity.id.is_nil(), "Entity id should never be nil");
        assert!(entity.created_at.is_some(), "Entity should have createdAt");
    }
}

#[test]
fn test_query_response_optional_fields() {
    let json_data = load_fixture("query_response.json");
    let response: QueryResponse = serde_json::from_str(&json_data).unwrap();

    let first = &response.items[0];
    assert_eq!(first.status, 1);
    assert!(first.updated_at.is_some());
    assert!(first.collection_item_id.is_none());
    assert_eq!(first.attribute_str("name"), Some("Harbour Supplies"));
    assert_eq!(first.attribute("employees"), Some(&json!(42)));
    assert_eq!(first.attribute("tags"), Some(&json!(["wholesale", "marine"])));

    let second = &response.items[1];
    assert!(second.updated_at.is_none(), "null updatedAt should be None");
    assert_eq!(second.attribute("employees"), Some(&json!(null)));

    let third = &response.items[2];
    assert!(third.collection_item_id.is_some());
    assert!(third.attributes.is_empty(), "null attributes should be empty");
}

#[test]
fn test_deserialize_entity() {
    let json_data = load_fixture("entity.json");

    let entity: Entity = serde_json::from_str(&json_data).unwrap_or_else(|e| {
        panic!("Failed to deserialize entity: {}\nJSON: {}", e, json_data)
    });

    assert_eq!(
        entity.id,
        EntityUuid::parse_str("3f2504e0-4f89-41d3-9a0c-0305e82c3301").unwrap()
    );
    assert_eq!(entity.attributes.len(), 6);
    assert_eq!(entity.attribute("active"), Some(&json!(true)));
    assert_eq!(
        entity.attribute("address").and_then(|a| a.get("city")),
        Some(&json!("Auckland"))
    );

    let created = entity.created_at.unwrap();
    let updated = entity.updated_at.unwrap();
    assert!(created < updated);
}

#[test]
fn test_entity_round_trips_through_serialization() {
    let json_data = load_fixture("entity.json");
    let entity: Entity = serde_json::from_str(&json_data).unwrap();

    let serialized = serde_json::to_string(&entity).unwrap();
    let reparsed: Entity = serde_json::from_str(&serialized).unwrap();
    assert_eq!(entity, reparsed);
}

#[test]
fn test_deserialize_error_info() {
    let json_data = load_fixture("error_info.json");

    let info: ErrorInfo = serde_json::from_str(&json_data).unwrap_or_else(|e| {
        panic!("Failed to deserialize error info: {}\nJSON: {}", e, json_data)
    });

    assert_eq!(info.field.as_deref(), Some("attributes.email"));
    assert_eq!(info.reason.as_deref(), Some("invalid_format"));
    assert_eq!(
        info.extra.as_ref().and_then(|extra| extra.get("pattern")),
        Some(&json!("email"))
    );
    assert!(info.http_code.is_none(), "httpCode is set by the client, not the API");
}
