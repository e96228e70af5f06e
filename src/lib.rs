//! xapiand-pack is the wire layer of a Xapiand client. It covers everything between a caller's
//! value tree and the bytes on the wire, and leaves the HTTP transport to whoever holds the
//! connection.
//!
//! It provides:
//!
//! - Xapian's native length prefix and length-prefixed strings, bit-for-bit compatible with the
//! 	server, for building term and accuracy values.
//! - A [`Value`] tree with decimals, date-times, dates, and times as first-class kinds.
//! - Marshaling of that tree into JSON or msgpack. Decimals are sent as floats and temporal
//! 	values as ISO-8601 text.
//! - Unmarshaling back into typed values in a single decoding pass. JSON numerals become exact
//! 	decimals, and strict ISO-8601 text becomes temporal values again.
//! - Normalization of search and count envelopes (`#query`, `#hits`, ...) into
//! 	[`SearchResults`].
//! - A [`ClientConfig`] value in place of a process-wide client.
//!
//! Everything here is a pure, synchronous transform over caller-owned data, and is safe to call
//! from any number of threads at once.
//!
//! # Example
//!
//! ```
//! use xapiand_pack::{decode_response, encode_string, Action, Value};
//!
//! let body = br##"{"#query": {"#hits": [{"title": "a"}], "#total_count": 1, "#matches_estimated": 1}}"##;
//! let res = decode_response(Action::Search, "application/json", body).unwrap();
//! let results = res.as_results().unwrap();
//! assert_eq!(results.count, 1);
//! assert_eq!(results.hits[0]["title"], Value::from("a"));
//!
//! let bytes = encode_string(b"hello");
//! assert_eq!(bytes[0], 5);
//! ```

mod de;
mod envelope;
mod error;
mod format;
mod integer;
mod length;
mod response;
mod ser;
mod string;
mod temporal;
mod value;

pub mod config;
pub mod constants;

pub use self::config::{ClientConfig, ClientConfigBuilder};
pub use self::de::{from_json_slice, from_msgpack_slice, unmarshal, TypedSeed};
pub use self::envelope::{
    is_search_envelope, SearchResults, AGGREGATIONS_KEY, HITS_KEY, MATCHES_ESTIMATED_KEY,
    QUERY_KEY, TOOK_KEY, TOTAL_COUNT_KEY,
};
pub use self::error::{Error, Result};
pub use self::format::{WireFormat, JSON_CONTENT_TYPE, MSGPACK_CONTENT_TYPE};
pub use self::integer::Integer;
pub use self::length::{
    decode_length, decode_length_checked, encode_length, encode_length_into, encoded_length_size,
    LENGTH_THRESHOLD,
};
pub use self::response::{decode_response, Action, Response};
pub use self::ser::{marshal, to_json_vec, to_msgpack_vec};
pub use self::string::{
    decode_char, decode_string, encode_char_into, encode_string, encode_string_into,
};
pub use self::temporal::{date_to_iso, parse_iso_date, DateTime, Time};
pub use self::value::{Map, Value};

pub use bigdecimal::BigDecimal;
pub use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
