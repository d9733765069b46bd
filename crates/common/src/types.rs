use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
///
/// Every identifier in the sales system is a UUID underneath; the newtypes
/// exist so a `ProductId` can never be passed where a `SaleItemId` is expected.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of a sale aggregate.
    SaleId
);

uuid_id!(
    /// Identifier of a single line within a sale.
    ///
    /// Assigned when the line is built and used to correlate removed lines
    /// on update.
    SaleItemId
);

uuid_id!(
    /// Reference to the customer a sale was made to.
    CustomerId
);

uuid_id!(
    /// Reference to the branch where a sale was made.
    BranchId
);

uuid_id!(
    /// Reference to a product in the external catalogue.
    ProductId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_id_new_creates_unique_ids() {
        let id1 = SaleId::new();
        let id2 = SaleId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn sale_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = SaleId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn product_id_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = ProductId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn display_matches_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(SaleItemId::from(uuid).to_string(), uuid.to_string());
    }
}
