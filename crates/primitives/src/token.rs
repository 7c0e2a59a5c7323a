//! Arbitrary-precision token amounts.
//!
//! [`TokenAmount`] wraps a signed big integer in atto units (10^-18 of a
//! whole token) and carries a distinguished *nil* state, distinct from zero,
//! matching the unset value peers may legally put on the wire.
//!
//! # Encoding
//!
//! The byte form is sign-prefixed big-endian: `0x00` + magnitude for
//! non-negative values, `0x01` + magnitude for negative values, and the empty
//! sequence for nil. Zero is `[0x00]`, so every non-nil value round-trips
//! exactly and the empty sentinel is exclusively nil. Arbitrary bytes from
//! untrusted peers decode as a raw big-endian magnitude rather than failing.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::str::FromStr;
use std::sync::OnceLock;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of decimal places in the fixed-point string form.
///
/// One whole token is `10^DECIMALS` atto.
pub const DECIMALS: u32 = 18;

fn atto_scale() -> &'static BigUint {
    static SCALE: OnceLock<BigUint> = OnceLock::new();
    SCALE.get_or_init(|| BigUint::from(10u32).pow(DECIMALS))
}

fn zero_int() -> &'static BigInt {
    static ZERO: OnceLock<BigInt> = OnceLock::new();
    ZERO.get_or_init(BigInt::zero)
}

/// An amount of tokens in atto units, or the distinguished nil value.
///
/// Arithmetic and comparison treat nil as zero, keeping all operations total;
/// [`TokenAmount::is_nil`] distinguishes the states where it matters.
/// Negative amounts are representable so callers can detect shortfalls by
/// sign instead of by panicking on underflow. Division and remainder panic on
/// a zero divisor, like the native integer types.
#[derive(Debug, Clone, Default)]
pub struct TokenAmount(Option<BigInt>);

impl TokenAmount {
    /// The nil (unset) amount. Same as `Default`.
    pub fn nil() -> Self {
        Self(None)
    }

    /// The zero amount (non-nil).
    pub fn zero() -> Self {
        Self(Some(BigInt::zero()))
    }

    /// Amount from atto units.
    pub fn from_atto(atto: u64) -> Self {
        Self(Some(BigInt::from(atto)))
    }

    /// Amount from whole tokens (scaled by `10^DECIMALS`).
    pub fn from_whole(whole: u64) -> Self {
        Self(Some(
            BigInt::from(whole) * BigInt::from_biguint(Sign::Plus, atto_scale().clone()),
        ))
    }

    /// Amount from an arbitrary big integer of atto units.
    pub fn from_bigint(atto: BigInt) -> Self {
        Self(Some(atto))
    }

    /// True if this is the nil (unset) amount.
    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    /// True if this is a non-nil zero.
    pub fn is_zero(&self) -> bool {
        self.0.as_ref().is_some_and(|v| v.is_zero())
    }

    /// True if this amount is nil or zero.
    ///
    /// The payment schedule treats both identically (free deal).
    pub fn nil_or_zero(&self) -> bool {
        self.0.as_ref().is_none_or(|v| v.is_zero())
    }

    /// True if this amount is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.0.as_ref().is_some_and(|v| v.is_negative())
    }

    fn as_int(&self) -> &BigInt {
        self.0.as_ref().unwrap_or_else(|| zero_int())
    }

    /// The atto value as a big integer, nil read as zero.
    pub fn atto(&self) -> BigInt {
        self.as_int().clone()
    }

    /// The atto value as `u64`, truncating negatives to zero and saturating
    /// on overflow. Nil reads as zero.
    pub fn atto_u64_saturating(&self) -> u64 {
        let int = self.as_int();
        if int.is_negative() {
            return 0;
        }
        u64::try_from(int.clone()).unwrap_or(u64::MAX)
    }

    /// Sign-prefixed big-endian byte form. Nil encodes to the empty sequence.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.0 {
            None => Vec::new(),
            Some(v) if v.is_zero() => vec![0x00],
            Some(v) => {
                let (sign, magnitude) = v.to_bytes_be();
                let mut out = Vec::with_capacity(magnitude.len() + 1);
                out.push(if sign == Sign::Minus { 0x01 } else { 0x00 });
                out.extend_from_slice(&magnitude);
                out
            }
        }
    }

    /// Decode the byte form. Total: any input produces an amount.
    ///
    /// Empty input is nil. Inputs that do not start with a valid sign byte
    /// are read as a raw big-endian magnitude, so garbage from a remote peer
    /// decodes instead of crashing the decoder.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match bytes.split_first() {
            None => Self::nil(),
            Some((0x00, magnitude)) => Self(Some(BigInt::from_bytes_be(Sign::Plus, magnitude))),
            Some((0x01, magnitude)) => Self(Some(-BigInt::from_bytes_be(Sign::Plus, magnitude))),
            Some(_) => Self(Some(BigInt::from_bytes_be(Sign::Plus, bytes))),
        }
    }

    /// Parse a plain base-10 atto string, sign allowed.
    pub fn from_atto_string(s: &str) -> Result<Self, ParseAmountError> {
        let int = BigInt::from_str(s.trim())
            .map_err(|_| ParseAmountError::InvalidInteger(s.to_string()))?;
        Ok(Self(Some(int)))
    }

    /// The plain base-10 atto string. Nil renders as `"0"`.
    pub fn to_atto_string(&self) -> String {
        self.as_int().to_string()
    }
}

impl PartialEq for TokenAmount {
    fn eq(&self, other: &Self) -> bool {
        self.as_int() == other.as_int()
    }
}

impl Eq for TokenAmount {}

impl PartialOrd for TokenAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TokenAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_int().cmp(other.as_int())
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident) => {
        impl $trait for &TokenAmount {
            type Output = TokenAmount;

            fn $method(self, rhs: Self) -> TokenAmount {
                TokenAmount(Some(self.as_int().$method(rhs.as_int())))
            }
        }

        impl $trait for TokenAmount {
            type Output = TokenAmount;

            fn $method(self, rhs: Self) -> TokenAmount {
                (&self).$method(&rhs)
            }
        }
    };
}

impl_binop!(Add, add);
impl_binop!(Sub, sub);
impl_binop!(Mul, mul);
impl_binop!(Div, div);
impl_binop!(Rem, rem);

impl Neg for &TokenAmount {
    type Output = TokenAmount;

    fn neg(self) -> TokenAmount {
        TokenAmount(Some(-self.as_int()))
    }
}

impl Neg for TokenAmount {
    type Output = TokenAmount;

    fn neg(self) -> TokenAmount {
        -&self
    }
}

impl fmt::Display for TokenAmount {
    /// Fixed-point whole-token form, trailing fractional zeros trimmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.as_int();
        if int.is_negative() {
            write!(f, "-")?;
        }
        let magnitude = int.magnitude();
        let whole = magnitude / atto_scale();
        let frac = magnitude % atto_scale();
        if frac.is_zero() {
            return write!(f, "{whole}");
        }
        let frac = format!("{frac:0>width$}", width = DECIMALS as usize);
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl FromStr for TokenAmount {
    type Err = ParseAmountError;

    /// Parse the fixed-point whole-token form.
    ///
    /// More than [`DECIMALS`] fractional digits is an error, never a silent
    /// truncation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(ParseAmountError::InvalidDecimal(s.to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseAmountError::InvalidDecimal(s.to_string()));
        }
        if frac.len() > DECIMALS as usize {
            return Err(ParseAmountError::TooPrecise(s.to_string()));
        }

        let whole = if whole.is_empty() {
            BigUint::zero()
        } else {
            BigUint::from_str(whole).map_err(|_| ParseAmountError::InvalidDecimal(s.to_string()))?
        };
        let frac = if frac.is_empty() {
            BigUint::zero()
        } else {
            let padding = DECIMALS as usize - frac.len();
            BigUint::from_str(frac).map_err(|_| ParseAmountError::InvalidDecimal(s.to_string()))?
                * BigUint::from(10u32).pow(padding as u32)
        };

        let atto = whole * atto_scale() + frac;
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(Self(Some(BigInt::from_biguint(sign, atto))))
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            struct BytesVisitor;

            impl serde::de::Visitor<'_> for BytesVisitor {
                type Value = TokenAmount;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a token amount byte string")
                }

                fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                    Ok(TokenAmount::from_bytes(v))
                }

                fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                    Ok(TokenAmount::from_bytes(&v))
                }
            }

            deserializer.deserialize_bytes(BytesVisitor)
        }
    }
}

/// Errors from parsing token amount strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAmountError {
    /// Input is not a decimal number.
    #[error("failed to parse {0:?} as a decimal number")]
    InvalidDecimal(String),

    /// Input is not a base-10 integer.
    #[error("failed to parse {0:?} as a big integer")]
    InvalidInteger(String),

    /// More fractional digits than the fixed scale allows.
    #[error("invalid token value {0:?}: more than {DECIMALS} decimal places")]
    TooPrecise(String),
}
