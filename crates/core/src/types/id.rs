//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` (SQLite rowids are 64-bit) with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use flash_pagamentos_core::define_id;
/// define_id!(UserId);
/// define_id!(WebhookId);
///
/// let user_id = UserId::new(1);
/// let webhook_id = WebhookId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = webhook_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    crate::define_id!(TestId);

    #[test]
    fn new_and_as_i64() {
        let id = TestId::new(42);
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn conversions() {
        let id: TestId = 7.into();
        let raw: i64 = id.into();
        assert_eq!(raw, 7);
    }

    #[test]
    fn display() {
        assert_eq!(TestId::new(3).to_string(), "3");
    }

    #[test]
    fn serde_is_transparent() {
        let id = TestId::new(99);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "99");

        let parsed: TestId = serde_json::from_str("99").unwrap();
        assert_eq!(parsed, id);
    }
}
