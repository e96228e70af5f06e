use std::fmt;

use serde::{de, ser};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A length, string, or char was decoded from an empty buffer.
    NoData,
    /// A multi-byte length ran out of input before its terminal group.
    Unterminated,
    /// A multi-byte length encodes a value that does not fit in a `u64`.
    Overflow,
    /// A decoded length asked for more bytes than the buffer holds.
    LengthTooShort {
        step: &'static str,
        actual: usize,
        expected: u64,
    },
    /// A required key of a search/count envelope was missing.
    MissingKey(&'static str),
    /// A reserved envelope key was present but had the wrong shape.
    BadEnvelope {
        key: &'static str,
        expected: &'static str,
    },
    /// Occurs when serde serialization or deserialization fails
    SerdeFail(String),
    /// JSON or msgpack encoding of an outbound payload failed.
    BadEncode(String),
    /// A configuration value could not be parsed.
    BadConfig(String),
}

impl Error {
    /// True for failures of the native length/string encoding.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Error::NoData | Error::Unterminated | Error::Overflow | Error::LengthTooShort { .. }
        )
    }

    /// True when a response envelope did not have the expected structure.
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::MissingKey(_) | Error::BadEnvelope { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::NoData => f.write_str("Bad encoded length: no data"),
            Error::Unterminated => f.write_str("Bad encoded length: insufficient data"),
            Error::Overflow => f.write_str("Bad encoded length: value overflows 64 bits"),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Bad encoded length: length greater than data ({} wanted {} bytes, {} left)",
                step, expected, actual
            ),
            Error::MissingKey(key) => write!(f, "Response envelope is missing {}", key),
            Error::BadEnvelope { key, expected } => {
                write!(f, "Response envelope key {} is not {}", key, expected)
            }
            Error::SerdeFail(ref msg) => f.write_str(msg),
            Error::BadEncode(ref err) => write!(f, "Payload encoding failure: {}", err),
            Error::BadConfig(ref err) => write!(f, "Bad configuration: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::SerdeFail(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::SerdeFail(msg.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerdeFail(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::SerdeFail(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::BadEncode(e.to_string())
    }
}
