//! Newtype IDs for type-safe entity references.
//!
//! The backend issues opaque string identifiers (e.g. `"v3"`, or a document
//! id). Use the `define_id!` macro to wrap them so vendor ids cannot be mixed
//! up with user ids.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use street_bite_core::define_id;
/// define_id!(TruckId);
/// define_id!(OwnerId);
///
/// let truck = TruckId::new("t1");
/// let owner = OwnerId::new("t1");
///
/// // These are different types, so this won't compile:
/// // let _: TruckId = owner;
/// assert_eq!(truck.as_str(), owner.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
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
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(VendorId);
define_id!(UserId);
define_id!(LocationId);
define_id!(MenuItemId);
define_id!(ReviewId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_as_str() {
        let id = VendorId::new("v42");
        assert_eq!(id.as_str(), "v42");
        assert_eq!(id.to_string(), "v42");
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = UserId::from("u1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"u1\"");

        let parsed: UserId = serde_json::from_str("\"u1\"").unwrap();
        assert_eq!(parsed, id);
    }
}
