use std::convert::TryFrom;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::ser::{Serialize, Serializer};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum IntPriv {
    /// Always non-less than zero.
    PosInt(u64),
    /// Always less than zero.
    NegInt(i64),
}

/// An integer as it arrives from either wire format: anything from `i64::MIN` up to `u64::MAX`.
///
/// Integers never go through the decimal bridge. They are carried exactly in both directions.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Integer {
    n: IntPriv,
}

impl Integer {
    /// Returns `true` if the integer can be represented as `i64`.
    #[inline]
    pub fn is_i64(&self) -> bool {
        match self.n {
            IntPriv::PosInt(n) => n <= i64::MAX as u64,
            IntPriv::NegInt(..) => true,
        }
    }

    /// Returns `true` if the integer can be represented as `u64`.
    #[inline]
    pub fn is_u64(&self) -> bool {
        matches!(self.n, IntPriv::PosInt(..))
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self.n {
            IntPriv::PosInt(n) => i64::try_from(n).ok(),
            IntPriv::NegInt(n) => Some(n),
        }
    }

    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        match self.n {
            IntPriv::PosInt(n) => Some(n),
            IntPriv::NegInt(_) => None,
        }
    }

    /// The nearest `f64`. Large magnitudes lose precision.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self.n {
            IntPriv::PosInt(n) => n as f64,
            IntPriv::NegInt(n) => n as f64,
        }
    }

    /// The same value as an exact decimal.
    pub fn to_decimal(&self) -> BigDecimal {
        match self.n {
            IntPriv::PosInt(n) => BigDecimal::from(n),
            IntPriv::NegInt(n) => BigDecimal::from(n),
        }
    }

    /// Parse a plain integer numeral (optional `-`, then ASCII digits). Returns `None` for
    /// anything with a fraction or exponent, and for values outside `i64::MIN..=u64::MAX`.
    pub fn from_numeral(text: &str) -> Option<Integer> {
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if text.starts_with('-') {
            i64::from_str(text).ok().map(Integer::from)
        } else {
            u64::from_str(text).ok().map(Integer::from)
        }
    }
}

impl Default for Integer {
    fn default() -> Self {
        Self {
            n: IntPriv::PosInt(0),
        }
    }
}

impl Debug for Integer {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        Display::fmt(self, fmt)
    }
}

impl Display for Integer {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self.n {
            IntPriv::PosInt(v) => Display::fmt(&v, fmt),
            IntPriv::NegInt(v) => Display::fmt(&v, fmt),
        }
    }
}

macro_rules! impl_from_unsigned {
    ($t: ty) => {
        impl From<$t> for Integer {
            fn from(n: $t) -> Self {
                Integer {
                    n: IntPriv::PosInt(n as u64),
                }
            }
        }
    };
}

macro_rules! impl_from_signed {
    ($t: ty) => {
        impl From<$t> for Integer {
            fn from(n: $t) -> Self {
                if n < 0 {
                    Integer {
                        n: IntPriv::NegInt(n as i64),
                    }
                } else {
                    Integer {
                        n: IntPriv::PosInt(n as u64),
                    }
                }
            }
        }
    };
}

impl_from_unsigned!(u8);
impl_from_unsigned!(u16);
impl_from_unsigned!(u32);
impl_from_unsigned!(u64);
impl_from_unsigned!(usize);
impl_from_signed!(i8);
impl_from_signed!(i16);
impl_from_signed!(i32);
impl_from_signed!(i64);
impl_from_signed!(isize);

macro_rules! impl_try_from {
    ($t: ty) => {
        impl TryFrom<Integer> for $t {
            type Error = Integer;
            fn try_from(v: Integer) -> Result<Self, Self::Error> {
                match v.n {
                    IntPriv::PosInt(n) => TryFrom::try_from(n).map_err(|_| v),
                    IntPriv::NegInt(n) => TryFrom::try_from(n).map_err(|_| v),
                }
            }
        }
    };
}

impl_try_from!(u8);
impl_try_from!(u16);
impl_try_from!(u32);
impl_try_from!(u64);
impl_try_from!(usize);
impl_try_from!(i8);
impl_try_from!(i16);
impl_try_from!(i32);
impl_try_from!(i64);
impl_try_from!(isize);

impl Serialize for Integer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.n {
            IntPriv::PosInt(v) => serializer.serialize_u64(v),
            IntPriv::NegInt(v) => serializer.serialize_i64(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numerals() {
        assert_eq!(Integer::from_numeral("42"), Some(Integer::from(42)));
        assert_eq!(Integer::from_numeral("-42"), Some(Integer::from(-42)));
        assert_eq!(
            Integer::from_numeral("18446744073709551615"),
            Some(Integer::from(u64::MAX))
        );
        assert_eq!(Integer::from_numeral("18446744073709551616"), None);
        assert_eq!(Integer::from_numeral("-9223372036854775809"), None);
        assert_eq!(Integer::from_numeral("1.0"), None);
        assert_eq!(Integer::from_numeral("1e3"), None);
        assert_eq!(Integer::from_numeral("-"), None);
        assert_eq!(Integer::from_numeral("+1"), None);
    }

    #[test]
    fn conversions() {
        let big = Integer::from(u64::MAX);
        assert!(!big.is_i64());
        assert_eq!(big.as_i64(), None);
        assert_eq!(u8::try_from(big), Err(big));
        assert_eq!(big.to_decimal(), BigDecimal::from(u64::MAX));

        let neg = Integer::from(-7i8);
        assert!(!neg.is_u64());
        assert_eq!(neg.as_u64(), None);
        assert_eq!(i32::try_from(neg), Ok(-7));
        assert_eq!(neg.as_f64(), -7.0);
        assert_eq!(neg.to_string(), "-7");
    }
}
