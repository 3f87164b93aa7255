//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out opaque string identifiers (Mongo-style `_id`s and
//! human-readable codes). Use the `define_id!` macro to create wrappers that
//! prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Default`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use nikola_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("65a1f0c2");
/// let order_id = OrderId::new("ORD-0001");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the ID is blank.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Backend document IDs (`_id`)
define_id!(ProductId);
define_id!(ReviewId);
define_id!(CategoryId);
define_id!(TicketId);
define_id!(PromoId);
define_id!(UserId);

// Human-readable codes
define_id!(ProductCode);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_is_transparent() {
        let id = ProductId::new("65a1f0c2e4b0a1b2c3d4e5f6");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65a1f0c2e4b0a1b2c3d4e5f6\"");

        let parsed: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_is_empty_ignores_whitespace() {
        assert!(OrderId::new("  ").is_empty());
        assert!(!OrderId::new("ORD-1").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(ProductCode::from("NK-0042").to_string(), "NK-0042");
    }
}
