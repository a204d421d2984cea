//! ManyRows wire models for entities, collection items and their requests.

use chrono::{DateTime, Utc};
use manyrows_core::page::{PageRequest, PageResource};
use manyrows_core::uuid::{
    CollectionItemUuid, EntityUuid, ProjectUuid, RelationDefUuid,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Open-ended attribute map of an entity.
pub type Attributes = HashMap<String, Value>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A record identified by UUID with arbitrary attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Entity UUID.
    pub id: EntityUuid,
    /// Collection item linking this entity to a parent, when queried
    /// through a collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_item_id: Option<CollectionItemUuid>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Status code.
    #[serde(default)]
    pub status: i64,
    /// Attribute values keyed by attribute name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Attributes,
}

impl Entity {
    /// Look up an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Look up a string attribute value.
    #[must_use]
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }
}

/// Per-call override of the client-level base URL and API key.
///
/// Empty overrides are ignored and the client defaults apply.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Base URL to use instead of the client's.
    pub base_url: Option<String>,
    /// API key to use instead of the client's.
    pub api_key: Option<String>,
}

impl RequestOptions {
    /// Create options without overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Implements the per-call override setters for request types.
macro_rules! request_options {
    ($($name:ident),+ $(,)?) => {
        $(
            impl $name {
                /// Override the client's base URL for this call.
                #[must_use]
                pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
                    self.options.base_url = Some(base_url.into());
                    self
                }

                /// Override the client's API key for this call.
                #[must_use]
                pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
                    self.options.api_key = Some(api_key.into());
                    self
                }

                /// Returns the per-call overrides.
                #[must_use]
                pub const fn options(&self) -> &RequestOptions {
                    &self.options
                }
            }
        )+
    };
}

/// Attribute filter applied to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Attribute to filter on.
    pub attribute_key: String,
    /// Value the attribute must match.
    pub value: Value,
}

impl Filter {
    /// Create a filter.
    #[must_use]
    pub fn new(attribute_key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            attribute_key: attribute_key.into(),
            value: value.into(),
        }
    }
}

/// Restricts a query to entities related to `entity_id` through the given
/// relation definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelFilter {
    /// Relation definition UUID.
    pub rel_def_id: RelationDefUuid,
    /// Related entity UUID.
    pub entity_id: EntityUuid,
}

/// Query for entities of a kind, or for the items of a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Per-call overrides.
    #[serde(skip)]
    pub options: RequestOptions,
    /// Requested page.
    #[serde(flatten)]
    pub page: PageRequest,
    /// Free-text search.
    pub search: String,
    /// Attribute to sort by.
    pub sort: String,
    /// Sort direction.
    pub sort_direction: String,
    /// Status filter.
    pub status: i64,
    /// Attribute filters.
    pub filters: Vec<Filter>,
    /// Whether to expand sub-entities in the results.
    pub expand_sub_entities: bool,
    /// Relation filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_filter: Option<RelFilter>,
    /// Parent entity of the queried collection; nil when unset.
    pub collection_parent_entity_id: EntityUuid,
}

impl QueryRequest {
    /// Create a query with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a specific page.
    #[must_use]
    pub const fn with_page(mut self, page: i64, size: i64) -> Self {
        self.page = PageRequest::new(page, size);
        self
    }

    /// Set the free-text search.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Sort by an attribute in the given direction.
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>, direction: impl Into<String>) -> Self {
        self.sort = sort.into();
        self.sort_direction = direction.into();
        self
    }

    /// Filter by status.
    #[must_use]
    pub const fn with_status(mut self, status: i64) -> Self {
        self.status = status;
        self
    }

    /// Add an attribute filter.
    #[must_use]
    pub fn with_filter(mut self, attribute_key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(attribute_key, value));
        self
    }

    /// Expand sub-entities in the results.
    #[must_use]
    pub const fn expand_sub_entities(mut self, expand: bool) -> Self {
        self.expand_sub_entities = expand;
        self
    }

    /// Restrict to entities related through a relation definition.
    #[must_use]
    pub const fn with_rel_filter(mut self, rel_def_id: RelationDefUuid, entity_id: EntityUuid) -> Self {
        self.rel_filter = Some(RelFilter {
            rel_def_id,
            entity_id,
        });
        self
    }

    /// Set the parent entity of the queried collection.
    #[must_use]
    pub const fn with_collection_parent(mut self, entity_id: EntityUuid) -> Self {
        self.collection_parent_entity_id = entity_id;
        self
    }
}

/// A page of entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Page index, size and total count.
    #[serde(flatten)]
    pub page: PageResource,
    /// Entities on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Entity>,
}

impl QueryResponse {
    /// Total number of matching entities across all pages.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.page.total
    }
}

/// Fetch a single entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOneRequest {
    /// Per-call overrides.
    pub options: RequestOptions,
    /// Entity UUID.
    pub id: EntityUuid,
}

impl GetOneRequest {
    /// Create a request for the given entity.
    #[must_use]
    pub fn new(id: EntityUuid) -> Self {
        Self {
            options: RequestOptions::default(),
            id,
        }
    }
}

/// Delete a single entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOneRequest {
    /// Per-call overrides.
    pub options: RequestOptions,
    /// Entity UUID.
    pub id: EntityUuid,
}

impl DeleteOneRequest {
    /// Create a request for the given entity.
    #[must_use]
    pub fn new(id: EntityUuid) -> Self {
        Self {
            options: RequestOptions::default(),
            id,
        }
    }
}

/// Delete a whole project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteProjectRequest {
    /// Per-call overrides.
    pub options: RequestOptions,
    /// Project UUID.
    pub id: ProjectUuid,
}

impl DeleteProjectRequest {
    /// Create a request for the given project.
    #[must_use]
    pub fn new(id: ProjectUuid) -> Self {
        Self {
            options: RequestOptions::default(),
            id,
        }
    }
}

/// Create an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateEntityRequest {
    /// Per-call overrides.
    #[serde(skip)]
    pub options: RequestOptions,
    /// Attribute values.
    pub attributes: Attributes,
    /// Status code.
    pub status: i64,
}

impl CreateEntityRequest {
    /// Create a request with the given attributes.
    #[must_use]
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    /// Set a single attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the status code.
    #[must_use]
    pub const fn with_status(mut self, status: i64) -> Self {
        self.status = status;
        self
    }
}

/// Identity of a newly created entity, read from the response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEntityResponse {
    /// New entity UUID.
    pub id: EntityUuid,
    /// Location of the new entity; empty when the API sent none.
    pub location: String,
}

/// Replace the attributes and status of an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateRequest {
    /// Per-call overrides.
    #[serde(skip)]
    pub options: RequestOptions,
    /// Attribute values.
    pub attributes: Attributes,
    /// Status code.
    pub status: i64,
}

impl UpdateRequest {
    /// Create a request with the given attributes.
    #[must_use]
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    /// Set a single attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the status code.
    #[must_use]
    pub const fn with_status(mut self, status: i64) -> Self {
        self.status = status;
        self
    }
}

/// Delete several entities of a kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteRequest {
    /// Per-call overrides.
    #[serde(skip)]
    pub options: RequestOptions,
    /// Entities to delete.
    pub ids: Vec<EntityUuid>,
}

impl DeleteRequest {
    /// Create a request for the given entities.
    #[must_use]
    pub fn new(ids: Vec<EntityUuid>) -> Self {
        Self {
            options: RequestOptions::default(),
            ids,
        }
    }
}

/// Link two entities through a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateCollectionItemRequest {
    /// Per-call overrides.
    #[serde(skip)]
    pub options: RequestOptions,
    /// Parent entity.
    #[serde(rename = "entity1Id")]
    pub entity1_id: EntityUuid,
    /// Child entity.
    #[serde(rename = "entity2Id")]
    pub entity2_id: EntityUuid,
}

impl CreateCollectionItemRequest {
    /// Create a request linking `entity1_id` to `entity2_id`.
    #[must_use]
    pub fn new(entity1_id: EntityUuid, entity2_id: EntityUuid) -> Self {
        Self {
            options: RequestOptions::default(),
            entity1_id,
            entity2_id,
        }
    }
}

/// Move a collection item to a new position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCollectionItemRequest {
    /// Per-call overrides.
    #[serde(skip)]
    pub options: RequestOptions,
    /// Item to move.
    pub collection_item_id: CollectionItemUuid,
    /// Target position.
    pub index: i64,
}

impl MoveCollectionItemRequest {
    /// Create a request moving an item to `index`.
    #[must_use]
    pub fn new(collection_item_id: CollectionItemUuid, index: i64) -> Self {
        Self {
            options: RequestOptions::default(),
            collection_item_id,
            index,
        }
    }
}

/// Remove items from a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteCollectionItemsRequest {
    /// Per-call overrides.
    #[serde(skip)]
    pub options: RequestOptions,
    /// Items to remove.
    #[serde(rename = "ids")]
    pub collection_item_ids: Vec<CollectionItemUuid>,
}

impl DeleteCollectionItemsRequest {
    /// Create a request removing the given items.
    #[must_use]
    pub fn new(collection_item_ids: Vec<CollectionItemUuid>) -> Self {
        Self {
            options: RequestOptions::default(),
            collection_item_ids,
        }
    }
}

request_options!(
    QueryRequest,
    GetOneRequest,
    DeleteOneRequest,
    DeleteProjectRequest,
    CreateEntityRequest,
    UpdateRequest,
    DeleteRequest,
    CreateCollectionItemRequest,
    MoveCollectionItemRequest,
    DeleteCollectionItemsRequest,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ENTITY_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    #[test]
    fn query_request_serializes_flat_page_and_camel_case() {
        let request = QueryRequest::new()
            .with_page(2, 25)
            .with_search("acme")
            .with_sort("name", "asc")
            .with_status(1)
            .with_filter("country", "NZ")
            .expand_sub_entities(true)
            .with_api_key("ignored-on-the-wire");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "page": 2,
                "size": 25,
                "search": "acme",
                "sort": "name",
                "sortDirection": "asc",
                "status": 1,
                "filters": [{"attributeKey": "country", "value": "NZ"}],
                "expandSubEntities": true,
                "collectionParentEntityId": "00000000-0000-0000-0000-000000000000"
            })
        );
    }

    #[test]
    fn query_request_includes_rel_filter_when_set() {
        let rel_def = RelationDefUuid::new_v4();
        let entity = EntityUuid::new_v4();
        let request = QueryRequest::new().with_rel_filter(rel_def, entity);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["relFilter"],
            json!({"relDefId": rel_def.to_string(), "entityId": entity.to_string()})
        );
    }

    #[test]
    fn entity_deserializes_null_attributes_as_empty() {
        let entity: Entity = serde_json::from_value(json!({
            "id": ENTITY_ID,
            "status": 2,
            "attributes": null
        }))
        .unwrap();

        assert_eq!(entity.id.to_string(), ENTITY_ID);
        assert_eq!(entity.status, 2);
        assert!(entity.attributes.is_empty());
        assert!(entity.created_at.is_none());
        assert!(entity.collection_item_id.is_none());
    }

    #[test]
    fn entity_serialization_omits_absent_optionals() {
        let entity = Entity {
            id: EntityUuid::parse_str(ENTITY_ID).unwrap(),
            collection_item_id: None,
            created_at: None,
            updated_at: None,
            status: 0,
            attributes: Attributes::new(),
        };

        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            json,
            json!({"id": ENTITY_ID, "status": 0, "attributes": {}})
        );
    }

    #[test]
    fn entity_accepts_status_beyond_32_bits() {
        let status = i64::from(i32::MAX) + 1;
        let entity: Entity = serde_json::from_value(json!({
            "id": ENTITY_ID,
            "status": status,
            "attributes": {}
        }))
        .unwrap();
        assert_eq!(entity.status, status);

        let json = serde_json::to_value(UpdateRequest::default().with_status(status)).unwrap();
        assert_eq!(json["status"], json!(status));
    }

    #[test]
    fn entity_attribute_lookup() {
        let entity: Entity = serde_json::from_value(json!({
            "id": ENTITY_ID,
            "status": 0,
            "attributes": {"name": "Widget", "count": 3}
        }))
        .unwrap();

        assert_eq!(entity.attribute_str("name"), Some("Widget"));
        assert_eq!(entity.attribute("count"), Some(&json!(3)));
        assert!(entity.attribute_str("count").is_none());
        assert!(entity.attribute("missing").is_none());
    }

    #[test]
    fn query_response_defaults_missing_items() {
        let response: QueryResponse =
            serde_json::from_value(json!({"page": 0, "size": 50, "total": 0, "items": null}))
                .unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.total(), 0);
    }

    #[test]
    fn create_request_body_excludes_options() {
        let request = CreateEntityRequest::default()
            .with_attribute("name", "Widget")
            .with_status(1)
            .with_base_url("https://override.example.com");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"attributes": {"name": "Widget"}, "status": 1}));
        assert_eq!(
            request.options().base_url.as_deref(),
            Some("https://override.example.com")
        );
    }

    #[test]
    fn collection_requests_use_api_field_names() {
        let first = EntityUuid::new_v4();
        let second = EntityUuid::new_v4();
        let json =
            serde_json::to_value(CreateCollectionItemRequest::new(first, second)).unwrap();
        assert_eq!(
            json,
            json!({"entity1Id": first.to_string(), "entity2Id": second.to_string()})
        );

        let item = CollectionItemUuid::new_v4();
        let json = serde_json::to_value(MoveCollectionItemRequest::new(item, 4)).unwrap();
        assert_eq!(json, json!({"collectionItemId": item.to_string(), "index": 4}));

        let json =
            serde_json::to_value(DeleteCollectionItemsRequest::new(vec![item])).unwrap();
        assert_eq!(json, json!({"ids": [item.to_string()]}));
    }

    #[test]
    fn request_options_debug_redacts_api_key() {
        let options = RequestOptions::new().with_api_key("super-secret");
        let debug = format!("{options:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
