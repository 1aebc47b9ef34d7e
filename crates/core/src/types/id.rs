//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! IDs are strings because persisted collections carry both generated ids
//! (`ord_8c0f...`) and hand-written fixture ids (`s001`, `buyer1`).

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `generate()`
/// - `From<&str>`, `From<String>` and `Into<String>` implementations
///
/// The second argument is the prefix used by `generate()`.
///
/// # Example
///
/// ```rust
/// # use campus_market_core::define_id;
/// define_id!(UserId, "user");
/// define_id!(OrderId, "ord");
///
/// let user_id = UserId::new("buyer1");
/// let order_id = OrderId::generate();
/// assert!(order_id.as_str().starts_with("ord_"));
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used for generated IDs.
            pub const PREFIX: &'static str = $prefix;

            /// Create an ID from an existing value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh, collision-free ID (`<prefix>_<uuid>`).
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, $crate::__uuid::Uuid::new_v4().simple()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
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

// Define standard entity IDs
define_id!(UserId, "user");
define_id!(ProductId, "prod");
define_id!(ShopId, "shop");
define_id!(OrderId, "ord");
define_id!(MessageId, "msg");
define_id!(ThreadId, "thread");
define_id!(PayoutId, "payout");

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_uses_prefix() {
        assert!(OrderId::generate().as_str().starts_with("ord_"));
        assert!(ThreadId::generate().as_str().starts_with("thread_"));
        assert!(MessageId::generate().as_str().starts_with("msg_"));
    }

    #[test]
    fn test_generate_is_unique_in_tight_loop() {
        let ids: HashSet<OrderId> = (0..1000).map(|_| OrderId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = ShopId::new("s001");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"s001\"");

        let parsed: ShopId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_display_and_conversions() {
        let id = UserId::from("seller1");
        assert_eq!(id.to_string(), "seller1");
        let raw: String = id.into();
        assert_eq!(raw, "seller1");
    }
}
