//! Inbound raising of typed values.
//!
//! The decoders hand every node of the tree to [`TypedSeed`] as it is read, so floats become
//! decimals and ISO-8601 text becomes temporal values in the same pass that builds the tree. There
//! is no second walk.
//!
//! On the JSON path the decoder runs with arbitrary-precision numbers. Integers that fit `i64` or
//! `u64` still arrive as native integers. Every other numeral arrives as its source text and
//! is turned into a decimal from that text, so `0.1` is exactly one tenth rather than the nearest
//! double. Msgpack only has native floats, so those go through the float's shortest round-trip
//! text instead.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Unexpected, Visitor};
use tracing::{debug, trace};

use crate::error::Result;
use crate::format::WireFormat;
use crate::integer::Integer;
use crate::temporal::{self, Detected};
use crate::value::{Map, Value};

/// The single map key serde_json uses to hand over a numeral as text when arbitrary precision
/// is enabled.
const JSON_NUMBER_TOKEN: &str = "$serde_json::private::Number";

// Serde's own cap on preallocating from an untrusted size hint.
const MAX_PREALLOC: usize = 4096;

/// Deserialization seed that builds a typed [`Value`] tree.
///
/// The seed remembers which wire format it is reading, because only the JSON decoder smuggles
/// numerals through as single-entry maps. A msgpack map is never mistaken for a number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypedSeed {
    format: WireFormat,
}

impl TypedSeed {
    pub fn new(format: WireFormat) -> Self {
        TypedSeed { format }
    }

    pub fn json() -> Self {
        TypedSeed::new(WireFormat::Json)
    }

    pub fn msgpack() -> Self {
        TypedSeed::new(WireFormat::Msgpack)
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }
}

impl<'de> DeserializeSeed<'de> for TypedSeed {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for TypedSeed {
    type Value = Value;

    fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("any JSON or msgpack value without binary data")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(Integer::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Int(Integer::from(v)))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Value, E> {
        if let Ok(v) = i64::try_from(v) {
            return Ok(Value::Int(Integer::from(v)));
        }
        match u64::try_from(v) {
            Ok(v) => Ok(Value::Int(Integer::from(v))),
            Err(_) => Ok(Value::Decimal(BigDecimal::from(v))),
        }
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Value, E> {
        match u64::try_from(v) {
            Ok(v) => Ok(Value::Int(Integer::from(v))),
            Err(_) => Ok(Value::Decimal(BigDecimal::from(v))),
        }
    }

    fn visit_f32<E: de::Error>(self, v: f32) -> Result<Value, E> {
        // The f32 text, not the widened f64 one: 0.1f32 should read back as 0.1
        Ok(float_to_value(v.is_finite(), v as f64, || v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(float_to_value(v.is_finite(), v, || v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(match temporal::detect(v) {
            Some(found) => detected_to_value(found),
            None => Value::Str(v.to_owned()),
        })
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(text_to_value(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Err(E::invalid_type(Unexpected::Bytes(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut seq = match access.size_hint() {
            Some(size) => Vec::with_capacity(size.min(MAX_PREALLOC)),
            None => Vec::new(),
        };
        while let Some(elem) = access.next_element_seed(self)? {
            seq.push(elem);
        }
        Ok(Value::Array(seq))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let first = match access.next_key::<String>()? {
            Some(key) => key,
            None => return Ok(Value::Map(Map::new())),
        };

        if self.format == WireFormat::Json && first == JSON_NUMBER_TOKEN {
            let numeral: String = access.next_value()?;
            return numeral_to_value::<A::Error>(&numeral);
        }

        let mut map = match access.size_hint() {
            Some(size) => Map::with_capacity(size.saturating_add(1).min(MAX_PREALLOC)),
            None => Map::new(),
        };
        let value = access.next_value_seed(self)?;
        map.insert(first, value);
        while let Some(key) = access.next_key::<String>()? {
            let value = access.next_value_seed(self)?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

/// Deserializing a [`Value`] directly behaves like the JSON path: numerals handed over as text by
/// an arbitrary-precision `serde_json` become exact decimals.
impl<'de> de::Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TypedSeed::json().deserialize(deserializer)
    }
}

fn float_to_value(finite: bool, v: f64, text: impl FnOnce() -> String) -> Value {
    if !finite {
        return Value::F64(v);
    }
    match BigDecimal::from_str(&text()) {
        Ok(d) => Value::Decimal(d),
        Err(_) => Value::F64(v),
    }
}

fn numeral_to_value<E: de::Error>(numeral: &str) -> Result<Value, E> {
    if let Some(int) = Integer::from_numeral(numeral) {
        return Ok(Value::Int(int));
    }
    trace!(numeral, "decimal from numeral text");
    if let Ok(d) = BigDecimal::from_str(numeral) {
        return Ok(Value::Decimal(d));
    }
    // An exponent too wide for the decimal still names a float: zero or an infinity.
    match numeral.parse::<f64>() {
        Ok(v) => {
            trace!(numeral, "numeral exponent out of decimal range");
            Ok(float_to_value(v.is_finite(), v, || v.to_string()))
        }
        Err(_) => Err(E::invalid_value(Unexpected::Str(numeral), &"a JSON number")),
    }
}

fn text_to_value(text: String) -> Value {
    match temporal::detect(&text) {
        Some(found) => detected_to_value(found),
        None => Value::Str(text),
    }
}

fn detected_to_value(found: Detected) -> Value {
    match found {
        Detected::DateTime(v) => Value::DateTime(v),
        Detected::Date(v) => Value::Date(v),
        Detected::Time(v) => Value::Time(v),
    }
}

/// Raise typed values in a tree that was decoded some other way: floats become decimals (through
/// their shortest text) and ISO-8601 text becomes temporal values. Map key order is kept.
pub fn unmarshal(value: Value) -> Value {
    match value {
        Value::F64(v) => float_to_value(v.is_finite(), v, || v.to_string()),
        Value::Str(s) => text_to_value(s),
        Value::Array(items) => Value::Array(items.into_iter().map(unmarshal).collect()),
        Value::Map(map) => Value::Map(map.into_iter().map(|(k, v)| (k, unmarshal(v))).collect()),
        other => other,
    }
}

/// Decode a JSON document into a typed tree. Trailing non-whitespace is an error.
///
/// Numerals are read with serde_json's arbitrary-precision support, which hands them over as
/// single-entry objects keyed `$serde_json::private::Number`. An object in the document whose
/// first key is literally that string is therefore read as a numeral, and fails unless its value
/// is numeral text.
pub fn from_json_slice(bytes: &[u8]) -> Result<Value> {
    debug!(bytes = bytes.len(), "decoding JSON payload");
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = TypedSeed::json().deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Decode a single msgpack object into a typed tree. Binary payloads, extension types, and
/// non-text map keys are rejected.
pub fn from_msgpack_slice(bytes: &[u8]) -> Result<Value> {
    debug!(bytes = bytes.len(), "decoding msgpack payload");
    let mut de = rmp_serde::Deserializer::new(bytes);
    Ok(TypedSeed::msgpack().deserialize(&mut de)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::{marshal, to_json_vec, to_msgpack_vec};
    use crate::temporal::{DateTime, Time};
    use chrono::{FixedOffset, NaiveDate, NaiveTime};
    use proptest::prelude::*;

    fn dec(s: &str) -> Value {
        Value::Decimal(BigDecimal::from_str(s).unwrap())
    }

    #[test]
    fn json_numbers() {
        let v = from_json_slice(
            br#"[1, -1, 0.1, 1e3, 18446744073709551615, 18446744073709551616,
                -9223372036854775809, 1e-99999999999999999999, 1e-9223372036854775808]"#,
        )
        .unwrap();
        assert_eq!(v[0], Value::from(1));
        assert_eq!(v[1], Value::from(-1));
        assert_eq!(v[2], dec("0.1"));
        assert_eq!(v[3], dec("1000"));
        assert_eq!(v[4], Value::from(u64::MAX));
        assert_eq!(v[5], dec("18446744073709551616"));
        assert_eq!(v[6], dec("-9223372036854775809"));
        assert_eq!(v[7], dec("0"));
        assert_eq!(v[8], dec("0"));
    }

    #[test]
    fn json_exponent_out_of_decimal_range() {
        crate::tests::init_tracing();
        let cases = [
            ("1e-99999999999999999999", dec("0")),
            ("1e-9223372036854775808", dec("0")),
            ("-2.5e-99999999999999999999", dec("0")),
            ("1e99999999999999999999", Value::F64(f64::INFINITY)),
            ("-1e99999999999999999999", Value::F64(f64::NEG_INFINITY)),
        ];
        for (index, (text, expected)) in cases.iter().enumerate() {
            let v = from_json_slice(text.as_bytes());
            assert_eq!(v.as_ref().ok(), Some(expected), "Failed test #{}: {}", index, text);
        }
        let v = from_json_slice(br#"{"tiny": 1e-99999999999999999999, "n": 2}"#).unwrap();
        assert_eq!(v["tiny"], dec("0"));
        assert_eq!(v["n"], Value::from(2));
    }

    #[test]
    fn json_number_token_key() {
        let v = from_json_slice(br#"{"$serde_json::private::Number": "1.5"}"#).unwrap();
        assert_eq!(v, dec("1.5"));
        assert!(from_json_slice(br#"{"$serde_json::private::Number": 1}"#).is_err());
        assert!(from_json_slice(br#"{"$serde_json::private::Number": "abc"}"#).is_err());

        // Only the first key is treated specially.
        let v = from_json_slice(br#"{"a": 1, "$serde_json::private::Number": 1}"#).unwrap();
        assert_eq!(v["$serde_json::private::Number"], Value::from(1));
    }

    #[test]
    fn json_decimal_is_exact() {
        let v = from_json_slice(b"0.1000000000000000055511151231257827").unwrap();
        assert_eq!(v, dec("0.1000000000000000055511151231257827"));
        let v = from_json_slice(b"19.99").unwrap();
        assert_eq!(v.as_decimal().unwrap().to_string(), "19.99");
    }

    #[test]
    fn json_text() {
        let v = from_json_slice(
            br#"{"d":"2024-01-01","dt":"2025-06-15T12:30:45.5+05:30","t":"12:30:45","s":"hello-01-01","e":"2025-06"}"#,
        )
        .unwrap();
        assert_eq!(v["d"], Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        let dt = v["dt"].as_datetime().unwrap();
        assert_eq!(dt.offset(), FixedOffset::east_opt(19800));
        assert_eq!(dt.to_string(), "2025-06-15T12:30:45.500000+05:30");
        assert_eq!(
            v["t"],
            Value::Time(Time::naive(NaiveTime::from_hms_opt(12, 30, 45).unwrap()))
        );
        assert_eq!(v["s"], Value::from("hello-01-01"));
        assert_eq!(v["e"], Value::from("2025-06"));
    }

    #[test]
    fn json_key_order() {
        let v = from_json_slice(br#"{"z":1,"a":{"y":2,"b":3},"m":[{"q":1,"c":2}]}"#).unwrap();
        let keys: Vec<&String> = v.as_map().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
        let keys: Vec<&String> = v["a"].as_map().unwrap().keys().collect();
        assert_eq!(keys, ["y", "b"]);
        let keys: Vec<&String> = v["m"][0].as_map().unwrap().keys().collect();
        assert_eq!(keys, ["q", "c"]);
    }

    #[test]
    fn json_rejects_garbage() {
        assert!(from_json_slice(b"").is_err());
        assert!(from_json_slice(b"{\"a\":").is_err());
        assert!(from_json_slice(b"[1] x").is_err());
    }

    #[test]
    fn msgpack_floats() {
        let enc = rmp_serde::to_vec(&0.1f64).unwrap();
        assert_eq!(from_msgpack_slice(&enc).unwrap(), dec("0.1"));
        let enc = rmp_serde::to_vec(&0.1f32).unwrap();
        assert_eq!(from_msgpack_slice(&enc).unwrap(), dec("0.1"));
        let enc = rmp_serde::to_vec(&f64::INFINITY).unwrap();
        assert_eq!(from_msgpack_slice(&enc).unwrap(), Value::F64(f64::INFINITY));
        let enc = rmp_serde::to_vec(&(-7i32)).unwrap();
        assert_eq!(from_msgpack_slice(&enc).unwrap(), Value::from(-7));
    }

    #[test]
    fn msgpack_number_token_is_a_map() {
        let mut map = Map::new();
        map.insert(JSON_NUMBER_TOKEN.into(), Value::from("1.5"));
        let enc = to_msgpack_vec(&Value::Map(map.clone())).unwrap();
        assert_eq!(from_msgpack_slice(&enc).unwrap(), Value::Map(map));
    }

    #[test]
    fn msgpack_rejects_bytes_and_keys() {
        // bin8 of length 2
        assert!(from_msgpack_slice(&[0xc4, 0x02, 0x01, 0x02]).is_err());
        // fixmap {1: 2}
        assert!(from_msgpack_slice(&[0x81, 0x01, 0x02]).is_err());
        assert!(from_msgpack_slice(&[]).is_err());
    }

    #[test]
    fn unmarshal_tree() {
        let tree: Value = vec![
            ("f", Value::F64(2.5)),
            ("s", Value::from("2024-02-29")),
            ("l", vec![Value::from("x"), Value::F64(f64::NAN)].into_iter().collect()),
        ]
        .into_iter()
        .collect();
        let out = unmarshal(tree);
        assert_eq!(out["f"], dec("2.5"));
        assert_eq!(out["s"], Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert_eq!(out["l"][0], Value::from("x"));
        assert!(out["l"][1].as_f64().unwrap().is_nan());
    }

    #[test]
    fn datetime_roundtrip_both_formats() {
        let naive = NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_micro_opt(12, 30, 45, 123456)
            .unwrap();
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let dt = Value::from(DateTime::with_offset(naive, offset));
        assert_eq!(from_json_slice(&to_json_vec(&dt).unwrap()).unwrap(), dt);
        assert_eq!(from_msgpack_slice(&to_msgpack_vec(&dt).unwrap()).unwrap(), dt);
        assert_eq!(unmarshal(marshal(&dt)), dt);
    }

    #[test]
    fn expanded_years_roundtrip() {
        crate::tests::init_tracing();
        for year in [-1, 10000, -262_000, 262_000] {
            let date = Value::from(NaiveDate::from_ymd_opt(year, 1, 1).unwrap());
            let back = from_json_slice(&to_json_vec(&date).unwrap()).unwrap();
            assert_eq!(back, date, "year {}", year);
            assert_eq!(from_msgpack_slice(&to_msgpack_vec(&date).unwrap()).unwrap(), date);
            let naive = NaiveDate::from_ymd_opt(year, 6, 30)
                .unwrap()
                .and_hms_micro_opt(8, 0, 0, 250)
                .unwrap();
            let dt = Value::from(DateTime::naive(naive));
            let back = from_json_slice(&to_json_vec(&dt).unwrap()).unwrap();
            assert_eq!(back, dt, "year {}", year);
            assert_eq!(unmarshal(marshal(&dt)), dt);
        }
        let v = from_json_slice(br#"["-0001-01-01", "+10000-01-01"]"#).unwrap();
        assert_eq!(v[0], Value::from(NaiveDate::from_ymd_opt(-1, 1, 1).unwrap()));
        assert_eq!(v[1], Value::from(NaiveDate::from_ymd_opt(10000, 1, 1).unwrap()));
    }

    #[test]
    fn serde_json_value_path() {
        let v: Value = serde_json::from_str(r#"{"price": 19.99, "n": 3}"#).unwrap();
        assert_eq!(v["price"], dec("19.99"));
        assert_eq!(v["n"], Value::from(3));
    }

    proptest! {
        #[test]
        fn decimal_roundtrip_within_rounding(x in -1.0e12f64..1.0e12f64) {
            let d = BigDecimal::from_str(&x.to_string()).unwrap();
            let v = Value::Decimal(d.clone());
            let back = from_json_slice(&to_json_vec(&v).unwrap()).unwrap();
            let parsed = back.as_decimal().map(|b| b.to_string().parse::<f64>().unwrap());
            prop_assert_eq!(parsed, Some(x));
            let back = from_msgpack_slice(&to_msgpack_vec(&v).unwrap()).unwrap();
            prop_assert_eq!(back, Value::Decimal(d));
        }

        #[test]
        fn plain_text_survives(s in "[a-z0-9 :\\-]{0,24}") {
            let v = Value::Str(s.clone());
            let back = from_json_slice(&to_json_vec(&v).unwrap()).unwrap();
            match temporal::detect(&s) {
                Some(_) => prop_assert!(!back.is_str()),
                None => prop_assert_eq!(back, Value::Str(s)),
            }
        }
    }
}
