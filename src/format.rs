use std::fmt;

use crate::de::{from_json_slice, from_msgpack_slice};
use crate::error::Result;
use crate::ser::{to_json_vec, to_msgpack_vec};
use crate::value::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const MSGPACK_CONTENT_TYPE: &str = "application/x-msgpack";

/// The two payload encodings Xapiand speaks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WireFormat {
    Json,
    Msgpack,
}

impl WireFormat {
    /// Pick a format from a `Content-Type` header. Matching is by substring, since the server may
    /// tack parameters on (`application/json; charset=utf-8`). Returns `None` for anything else,
    /// which callers should treat as an opaque body.
    pub fn from_content_type(content_type: &str) -> Option<WireFormat> {
        if content_type.contains(MSGPACK_CONTENT_TYPE) {
            Some(WireFormat::Msgpack)
        } else if content_type.contains(JSON_CONTENT_TYPE) {
            Some(WireFormat::Json)
        } else {
            None
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            WireFormat::Json => JSON_CONTENT_TYPE,
            WireFormat::Msgpack => MSGPACK_CONTENT_TYPE,
        }
    }

    /// Marshal and encode a value tree.
    pub fn encode(self, value: &Value) -> Result<Vec<u8>> {
        match self {
            WireFormat::Json => to_json_vec(value),
            WireFormat::Msgpack => to_msgpack_vec(value),
        }
    }

    /// Decode and unmarshal a payload.
    pub fn decode(self, bytes: &[u8]) -> Result<Value> {
        match self {
            WireFormat::Json => from_json_slice(bytes),
            WireFormat::Msgpack => from_msgpack_slice(bytes),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn content_types() {
        let test_cases = [
            ("application/json", Some(WireFormat::Json)),
            ("application/json; charset=utf-8", Some(WireFormat::Json)),
            ("application/x-msgpack", Some(WireFormat::Msgpack)),
            ("application/x-msgpack; charset=utf-8", Some(WireFormat::Msgpack)),
            ("application/octet-stream", None),
            ("text/plain", None),
            ("", None),
        ];
        for (index, (header, expected)) in test_cases.iter().enumerate() {
            assert_eq!(
                WireFormat::from_content_type(header),
                *expected,
                "Failed test #{}",
                index
            );
        }
        assert_eq!(WireFormat::Msgpack.to_string(), MSGPACK_CONTENT_TYPE);
    }

    #[test]
    fn same_tree_either_way() {
        let doc: Value = vec![
            ("title", Value::from("a")),
            ("born", Value::from(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap())),
            ("score", Value::from(BigDecimal::from_str("2.25").unwrap())),
            ("tags", vec!["x", "y"].into_iter().collect()),
        ]
        .into_iter()
        .collect();
        for format in [WireFormat::Json, WireFormat::Msgpack] {
            let enc = format.encode(&doc).unwrap();
            assert_eq!(format.decode(&enc).unwrap(), doc, "{}", format);
        }
    }
}
