//! Newtype IDs for type-safe entity references.
//!
//! Backend records carry identifiers that may be opaque strings
//! (`"demo-1"`, Mongo object ids) or plain numbers. Every ID is normalised
//! to its string form on the way in, so comparisons are always string
//! comparisons and `7` and `"7"` name the same entity.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain JSON string
/// - `Deserialize` from a JSON string or number (numbers become their decimal text)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<&str>`, `From<String>`, `From<u64>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use farmers_market_core::define_id;
/// define_id!(SellerId);
///
/// let a: SellerId = serde_json::from_str("42").unwrap();
/// let b = SellerId::new("42");
/// assert_eq!(a, b);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether this ID names the same entity as `other`.
            #[must_use]
            pub fn matches(&self, other: &str) -> bool {
                self.0 == other
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

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
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

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct IdVisitor;

                impl ::serde::de::Visitor<'_> for IdVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        f: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        f.write_str("a string or numeric identifier")
                    }

                    fn visit_str<E: ::serde::de::Error>(
                        self,
                        v: &str,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_owned()))
                    }

                    fn visit_string<E: ::serde::de::Error>(
                        self,
                        v: String,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v))
                    }

                    fn visit_i64<E: ::serde::de::Error>(
                        self,
                        v: i64,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_string()))
                    }

                    fn visit_u64<E: ::serde::de::Error>(
                        self,
                        v: u64,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_string()))
                    }

                    fn visit_f64<E: ::serde::de::Error>(
                        self,
                        v: f64,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_string()))
                    }
                }

                deserializer.deserialize_any(IdVisitor)
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(UserId);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_string_ids_compare_equal() {
        let numeric: ProductId = serde_json::from_str("7").unwrap();
        let text: ProductId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(numeric, text);
        assert!(numeric.matches("7"));
    }

    #[test]
    fn test_opaque_string_id() {
        let id: ProductId = serde_json::from_str("\"demo-1\"").unwrap();
        assert_eq!(id.as_str(), "demo-1");
        assert_eq!(id.to_string(), "demo-1");
    }

    #[test]
    fn test_serializes_as_string() {
        let id = ProductId::from(12_u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"12\"");
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<ProductId>("{\"id\": 1}").is_err());
        assert!(serde_json::from_str::<ProductId>("null").is_err());
    }
}
