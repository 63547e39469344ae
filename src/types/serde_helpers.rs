//! Custom serde helpers for Aster's loosely typed payloads.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserializer, de};

/// Deserialize an optional decimal that may arrive as `""`, `null`, a string or a number.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use rust_decimal::Decimal;
/// use aster_api_client::types::serde_helpers::optional_decimal;
///
/// #[derive(Deserialize, Debug)]
/// struct Update {
///     #[serde(rename = "AP", deserialize_with = "optional_decimal::deserialize", default)]
///     activation_price: Option<Decimal>,
/// }
///
/// let update: Update = serde_json::from_str(r#"{"AP":""}"#).unwrap();
/// assert!(update.activation_price.is_none());
///
/// let update: Update = serde_json::from_str(r#"{"AP":"101.5"}"#).unwrap();
/// assert_eq!(update.activation_price.unwrap().to_string(), "101.5");
/// ```
pub mod optional_decimal {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OptionalDecimalVisitor;

        impl<'de> de::Visitor<'de> for OptionalDecimalVisitor {
            type Value = Option<Decimal>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a decimal string, a number, an empty string or null")
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(self)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v.is_empty() {
                    return Ok(None);
                }
                parse(v).map(Some).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Some(Decimal::from(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Some(Decimal::from(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Decimal::try_from(v).map(Some).map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                // serde_json's arbitrary_precision numbers arrive as a one-entry map.
                let Some((_, raw)) = map.next_entry::<String, String>()? else {
                    return Ok(None);
                };
                parse(&raw).map(Some).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_option(OptionalDecimalVisitor)
    }

    fn parse(v: &str) -> Result<Decimal, rust_decimal::Error> {
        v.parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(v))
    }
}

/// Deserialize a leverage-like integer sent either as a number or a numeric string.
pub mod string_or_u32 {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = u32;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an unsigned integer or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
                u32::try_from(v).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
                u32::try_from(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
                v.trim().parse().map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<u32, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                match map.next_entry::<String, String>()? {
                    Some((_, raw)) => raw.parse().map_err(de::Error::custom),
                    None => Err(de::Error::custom("empty number")),
                }
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}
