//! Strongly-typed UUID wrappers for ManyRows resources.
//!
//! Projects, entities, collections, collection items and relation
//! definitions are all identified by UUIDs; wrapping each kind in its own
//! type keeps them from being mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Macro to generate strongly-typed UUID wrapper types.
macro_rules! uuid_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new UUID wrapper from a [`Uuid`].
            #[must_use]
            pub const fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Creates a new random UUID (v4).
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the nil UUID, which the API treats as "unset".
            #[must_use]
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Returns true for the nil UUID.
            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            /// Returns the inner [`Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Converts to the inner [`Uuid`].
            #[must_use]
            pub const fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Parses a UUID from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is not a valid UUID.
            pub fn parse_str(input: &str) -> Result<Self> {
                Uuid::parse_str(input.trim())
                    .map(Self)
                    .map_err(|_| Error::InvalidUuid(input.to_string()))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(wrapper: $name) -> Self {
                wrapper.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

uuid_type!(ProjectUuid, "Project UUID");
uuid_type!(EntityUuid, "Entity UUID");
uuid_type!(CollectionUuid, "Collection UUID");
uuid_type!(CollectionItemUuid, "Collection item UUID");
uuid_type!(RelationDefUuid, "Relation definition UUID");

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";
    const INVALID_UUID: &str = "not-a-uuid";

    #[test]
    fn test_entity_uuid_new_v4() {
        let id = EntityUuid::new_v4();
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_entity_uuid_parse_str_valid() {
        let id = EntityUuid::parse_str(VALID_UUID).unwrap();
        assert_eq!(id.to_string(), VALID_UUID);
    }

    #[test]
    fn test_entity_uuid_parse_str_trims_whitespace() {
        let id = EntityUuid::parse_str(&format!(" {VALID_UUID}\n")).unwrap();
        assert_eq!(id.to_string(), VALID_UUID);
    }

    #[test]
    fn test_entity_uuid_parse_str_invalid() {
        let result = EntityUuid::parse_str(INVALID_UUID);
        assert!(matches!(result.unwrap_err(), Error::InvalidUuid(_)));
    }

    #[test]
    fn test_collection_uuid_from_str() {
        let result: Result<CollectionUuid> = VALID_UUID.parse();
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_is_nil() {
        let id = EntityUuid::default();
        assert!(id.is_nil());
        assert_eq!(id, EntityUuid::nil());
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_uuid_conversions() {
        let uuid = Uuid::parse_str(VALID_UUID).unwrap();
        let project: ProjectUuid = uuid.into();
        assert_eq!(project.as_uuid(), &uuid);
        let back: Uuid = project.into();
        assert_eq!(back, uuid);
        let uuid_ref: &Uuid = project.as_ref();
        assert_eq!(uuid_ref, &uuid);
        assert_eq!(project.into_uuid(), uuid);
    }

    #[test]
    fn test_serialize_transparent() {
        let id = CollectionItemUuid::new(Uuid::parse_str(VALID_UUID).unwrap());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{VALID_UUID}\""));

        let parsed: CollectionItemUuid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_different_uuid_types_share_representation() {
        let uuid = Uuid::parse_str(VALID_UUID).unwrap();
        let entity = EntityUuid::new(uuid);
        let rel_def = RelationDefUuid::new(uuid);
        assert_eq!(entity.to_string(), rel_def.to_string());
    }
}
