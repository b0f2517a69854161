pub mod auth;
pub mod orders;
pub mod products;
pub mod records;

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};

/// Keeps "absent" (`None`) apart from an explicit `null` (`Some(None)`).
/// Pair with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Reads money from a JSON string or number. Numbers are parsed from their
/// shortest decimal form so `19.99` stays `19.99`.
pub(crate) fn decimal<'de, D>(de: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    de.deserialize_any(DecimalVisitor)
}

/// [`decimal`] for optional fields. Pair with `#[serde(default)]`.
pub(crate) fn optional_decimal<'de, D>(de: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    de.deserialize_option(OptionalDecimalVisitor)
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = BigDecimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal number or numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<BigDecimal, E> {
        BigDecimal::from_str(v.trim()).map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigDecimal, E> {
        Ok(BigDecimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigDecimal, E> {
        Ok(BigDecimal::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<BigDecimal, E> {
        if !v.is_finite() {
            return Err(E::invalid_value(Unexpected::Float(v), &self));
        }
        // `Display` for f64 prints the shortest text that reads back to `v`.
        BigDecimal::from_str(&v.to_string())
            .map_err(|_| E::invalid_value(Unexpected::Float(v), &self))
    }
}

struct OptionalDecimalVisitor;

impl<'de> Visitor<'de> for OptionalDecimalVisitor {
    type Value = Option<BigDecimal>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal number, numeric string or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, de: D) -> Result<Self::Value, D::Error> {
        decimal(de).map(Some)
    }
}
