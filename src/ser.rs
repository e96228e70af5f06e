//! Outbound lowering of typed values.
//!
//! Decimals become the nearest `f64` and temporal values become ISO-8601 text; everything else is
//! passed through as-is. The lowering is the same no matter which encoder ends up writing the
//! bytes. It happens inline in [`Value`]'s `Serialize` impl, so no intermediate tree is built on
//! the encode path. [`marshal`] produces the lowered tree explicitly for callers that want to hand
//! it to some other encoder.

use bigdecimal::BigDecimal;
use serde::ser::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::temporal::date_to_iso;
use crate::value::Value;

/// Lower a value tree to the kinds both wire formats can carry. The input is left untouched and
/// map key order is kept.
pub fn marshal(value: &Value) -> Value {
    match value {
        Value::Decimal(d) => Value::F64(decimal_to_f64(d)),
        Value::DateTime(dt) => Value::Str(dt.to_string()),
        Value::Date(d) => Value::Str(date_to_iso(d)),
        Value::Time(t) => Value::Str(t.to_string()),
        Value::Array(items) => Value::Array(items.iter().map(marshal).collect()),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), marshal(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Nearest `f64` to a decimal. Magnitudes beyond the `f64` range saturate to infinity.
pub(crate) fn decimal_to_f64(d: &BigDecimal) -> f64 {
    // Float parsing is correctly rounded, so go through the decimal text
    d.to_string().parse().unwrap_or(f64::NAN)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => v.serialize(serializer),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Decimal(v) => serializer.serialize_f64(decimal_to_f64(v)),
            Value::Str(v) => serializer.serialize_str(v),
            Value::DateTime(v) => serializer.collect_str(v),
            Value::Date(v) => serializer.serialize_str(&date_to_iso(v)),
            Value::Time(v) => serializer.collect_str(v),
            Value::Array(v) => serializer.collect_seq(v),
            Value::Map(v) => serializer.collect_map(v),
        }
    }
}

/// Serialize anything to JSON, lowering typed values on the way.
///
/// Non-finite floats have no JSON form and are written as `null`.
pub fn to_json_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::BadEncode(e.to_string()))
}

/// Serialize anything to msgpack, lowering typed values on the way. Structs are written as maps
/// keyed by field name.
pub fn to_msgpack_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(value)?)
}
