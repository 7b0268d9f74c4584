//! Catalog product identifier.
//!
//! Products live in an external catalog that hands out opaque string IDs
//! (for example 24-character hex object IDs). Shopkart never interprets them;
//! it only checks they are short, non-empty and URL-safe.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input is empty (after trimming).
    #[error("product id cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("product id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains something other than ASCII letters, digits, `-` or `_`.
    #[error("product id may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// An opaque catalog product ID.
///
/// ## Examples
///
/// ```
/// use shopkart_core::ProductId;
///
/// let id = ProductId::parse(" 65f1c0ffee0ddba11a5e0042 ").unwrap();
/// assert_eq!(id.as_str(), "65f1c0ffee0ddba11a5e0042");
///
/// assert!(ProductId::parse("").is_err());
/// assert!(ProductId::parse("../etc").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Maximum length of a product ID.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `ProductId`, dropping surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductIdError`] if the input is empty, too long or has a
    /// character outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ProductIdError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(ProductIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ProductIdError::InvalidCharacter);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ProductId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProductId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProductId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids_accepted() {
        let id = ProductId::parse("65f1c0ffee0ddba11a5e0042").unwrap();
        assert_eq!(id.to_string(), "65f1c0ffee0ddba11a5e0042");
        assert_eq!(ProductId::parse("sku_42-blue").unwrap().as_str(), "sku_42-blue");
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(ProductId::parse("  "), Err(ProductIdError::Empty));
        assert_eq!(
            ProductId::parse("a b"),
            Err(ProductIdError::InvalidCharacter)
        );
        assert_eq!(
            ProductId::parse("x/../y"),
            Err(ProductIdError::InvalidCharacter)
        );
        assert!(matches!(
            ProductId::parse(&"a".repeat(65)),
            Err(ProductIdError::TooLong { max: 64 })
        ));
    }

    #[test]
    fn test_wire_form_is_a_json_string() {
        let id: ProductId = serde_json::from_str("\"65f1c0ffee0ddba11a5e0042\"").unwrap();
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"65f1c0ffee0ddba11a5e0042\""
        );

        assert!(serde_json::from_str::<ProductId>("\"\"").is_err());
        assert!(serde_json::from_str::<ProductId>("42").is_err());
    }
}
