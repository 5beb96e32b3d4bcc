//! Typed field extraction from loosely-typed JSON objects.
//!
//! # Design
//! Each `decode_*` function pulls one key out of a `JsonObject` and either
//! returns a typed value or a specific `DecodeError`. Model constructors
//! chain them with `?`, so decoding stops at the first bad field.
//!
//! Optional decoders treat a missing key and an explicit `null` the same
//! way: both are `None`. Anything else of the wrong kind is still an error.

use serde_json::Value;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use url::Url;

use crate::error::{DecodeError, JsonKind};

pub type JsonObject = serde_json::Map<String, Value>;

/// A model that can be built from a JSON object.
pub trait JsonDecodable: Sized {
    fn from_json(json: &JsonObject) -> Result<Self, DecodeError>;
}

/// A scalar (or raw container) that can be read straight out of a `Value`.
pub trait FromJsonValue: Sized {
    /// Kind reported as `expected` when the value has the wrong shape.
    const KIND: JsonKind;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromJsonValue for bool {
    const KIND: JsonKind = JsonKind::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromJsonValue for u64 {
    const KIND: JsonKind = JsonKind::UnsignedInteger;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FromJsonValue for i64 {
    const KIND: JsonKind = JsonKind::Integer;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromJsonValue for f64 {
    const KIND: JsonKind = JsonKind::Float;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromJsonValue for String {
    const KIND: JsonKind = JsonKind::String;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromJsonValue for JsonObject {
    const KIND: JsonKind = JsonKind::Object;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl FromJsonValue for Vec<Value> {
    const KIND: JsonKind = JsonKind::Array;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_array().cloned()
    }
}

fn lookup<'a>(json: &'a JsonObject, key: &str) -> Result<&'a Value, DecodeError> {
    json.get(key)
        .ok_or_else(|| DecodeError::MissingRequiredKey(key.to_string()))
}

/// `None` for a missing key or an explicit `null`.
fn lookup_optional<'a>(json: &'a JsonObject, key: &str) -> Option<&'a Value> {
    json.get(key).filter(|value| !value.is_null())
}

fn unexpected(key: &str, expected: JsonKind, value: &Value) -> DecodeError {
    DecodeError::UnexpectedType {
        key: key.to_string(),
        expected,
        actual: JsonKind::of(value),
    }
}

fn typed<T: FromJsonValue>(key: &str, value: &Value) -> Result<T, DecodeError> {
    T::from_value(value).ok_or_else(|| unexpected(key, T::KIND, value))
}

pub fn decode_required<T: FromJsonValue>(json: &JsonObject, key: &str) -> Result<T, DecodeError> {
    typed(key, lookup(json, key)?)
}

pub fn decode_optional<T: FromJsonValue>(
    json: &JsonObject,
    key: &str,
) -> Result<Option<T>, DecodeError> {
    lookup_optional(json, key)
        .map(|value| typed(key, value))
        .transpose()
}

fn parse_url(key: &str, raw: String) -> Result<Url, DecodeError> {
    Url::parse(&raw).map_err(|_| DecodeError::CannotParseUrl {
        key: key.to_string(),
        value: raw,
    })
}

pub fn decode_url(json: &JsonObject, key: &str) -> Result<Url, DecodeError> {
    parse_url(key, decode_required(json, key)?)
}

pub fn decode_optional_url(json: &JsonObject, key: &str) -> Result<Option<Url>, DecodeError> {
    decode_optional(json, key)?
        .map(|raw| parse_url(key, raw))
        .transpose()
}

/// Byte-for-byte shape of `yyyy-MM-ddTHH:mm:ssZ`; `d` stands for any digit.
const TIMESTAMP_SHAPE: &[u8; 20] = b"dddd-dd-ddTdd:dd:ddZ";

fn has_timestamp_shape(raw: &str) -> bool {
    raw.len() == TIMESTAMP_SHAPE.len()
        && raw
            .bytes()
            .zip(TIMESTAMP_SHAPE)
            .all(|(byte, &expected)| match expected {
                b'd' => byte.is_ascii_digit(),
                literal => byte == literal,
            })
}

/// Parse a `yyyy-MM-ddTHH:mm:ssZ` UTC timestamp. Nothing else is accepted.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if !has_timestamp_shape(raw) {
        return None;
    }
    PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
    )
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}

fn parse_date(key: &str, raw: String) -> Result<OffsetDateTime, DecodeError> {
    parse_timestamp(&raw).ok_or_else(|| DecodeError::CannotParseDate {
        key: key.to_string(),
        value: raw,
    })
}

pub fn decode_date(json: &JsonObject, key: &str) -> Result<OffsetDateTime, DecodeError> {
    parse_date(key, decode_required(json, key)?)
}

pub fn decode_optional_date(
    json: &JsonObject,
    key: &str,
) -> Result<Option<OffsetDateTime>, DecodeError> {
    decode_optional(json, key)?
        .map(|raw| parse_date(key, raw))
        .transpose()
}

/// Decode a nested model stored under `key`.
pub fn decode_object<T: JsonDecodable>(json: &JsonObject, key: &str) -> Result<T, DecodeError> {
    let value = lookup(json, key)?;
    let object = value
        .as_object()
        .ok_or_else(|| unexpected(key, JsonKind::Object, value))?;
    T::from_json(object)
}

/// Decode every element of the array under `key`.
///
/// The first element that fails aborts the whole decode and its error is
/// returned as-is; there is no partial result.
pub fn decode_array<T: JsonDecodable>(json: &JsonObject, key: &str) -> Result<Vec<T>, DecodeError> {
    let value = lookup(json, key)?;
    let elements = value
        .as_array()
        .ok_or_else(|| unexpected(key, JsonKind::Array, value))?;
    elements
        .iter()
        .map(|element| {
            let object = element
                .as_object()
                .ok_or_else(|| unexpected(key, JsonKind::Object, element))?;
            T::from_json(object)
        })
        .collect()
}
