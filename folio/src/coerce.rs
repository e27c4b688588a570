//! Lenient integer coercion for pagination inputs.
//!
//! Pagination parameters usually arrive from query strings, so `limit`,
//! `offset` and `page` accept numbers, numeric strings (`"10"`, `" 10px"`,
//! `"2.5"`) and anything else. Input that carries no leading integer is not an
//! error: it degrades to `0`, exactly as if `0` had been passed.

use crate::fields;
use mongodb::bson::Document;
use serde::{
    Deserialize,
    de::{self, Deserializer, Visitor},
};
use std::fmt;

/// Parses the leading base-10 integer of `input`.
///
/// Leading whitespace and a single sign are accepted, parsing stops at the
/// first non-digit, and `None` is returned when no digit was found. Values
/// beyond the `i64` range saturate.
pub fn parse_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();

    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: Option<i64> = None;

    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        let current = value.unwrap_or(0);

        value = Some(if negative {
            current.saturating_mul(10).saturating_sub(digit)
        } else {
            current.saturating_mul(10).saturating_add(digit)
        });
    }

    value
}

/// Truncates a float toward zero, mapping non-finite values to `None`.
#[allow(clippy::cast_possible_truncation)]
pub fn truncate(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

/// `deserialize_with` helper for optional integer options.
///
/// A present key always yields `Some`, even when its value is not a number,
/// because the presence of `offset` or `page` selects the positioning mode.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientVisitor).map(Some)
}

/// `deserialize_with` helper for projections given as a document or as a
/// string such as `"title -_id"`.
pub fn select<'de, D>(deserializer: D) -> Result<Option<Document>, D::Error>
where
    D: Deserializer<'de>,
{
    field_spec(deserializer, fields::parse_select)
}

/// `deserialize_with` helper for sorts given as a document or as a string
/// such as `"-price title"`.
pub fn sort<'de, D>(deserializer: D) -> Result<Option<Document>, D::Error>
where
    D: Deserializer<'de>,
{
    field_spec(deserializer, fields::parse_sort)
}

fn field_spec<'de, D>(
    deserializer: D,
    parse: fn(&str) -> Document,
) -> Result<Option<Document>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FieldSpec {
        Text(String),
        Document(Document),
    }

    Ok(
        Option::<FieldSpec>::deserialize(deserializer)?.map(|spec| match spec {
            FieldSpec::Text(text) => parse(&text),
            FieldSpec::Document(document) => document,
        }),
    )
}

struct LenientVisitor;

impl<'de> Visitor<'de> for LenientVisitor {
    type Value = i64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or a string starting with one")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
        Ok(i64::try_from(value).unwrap_or(i64::MAX))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
        Ok(truncate(value).unwrap_or(0))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
        Ok(parse_int(value).unwrap_or(0))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<i64, E> {
        Ok(0)
    }

    fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
        Ok(0)
    }

    fn visit_none<E: de::Error>(self) -> Result<i64, E> {
        Ok(0)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<i64, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<i64, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(0)
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<i64, A::Error> {
        while map
            .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
            .is_some()
        {}
        Ok(0)
    }
}
