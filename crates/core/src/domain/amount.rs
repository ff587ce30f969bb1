// Decimal amounts parsed from strings (no binary floating point)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An exact decimal amount: `(-1)^negative * mantissa * 10^exponent`.
///
/// Normalized so that the mantissa carries no trailing zeros; zero is always
/// `mantissa == 0, exponent == 0, negative == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Amount {
    mantissa: u64,
    exponent: i32,
    negative: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal amount: {0}")]
pub struct AmountParseError(pub String);

impl Amount {
    pub const ZERO: Amount = Amount {
        mantissa: 0,
        exponent: 0,
        negative: false,
    };

    pub fn new(mantissa: u64, exponent: i32, negative: bool) -> Self {
        let mut amount = Self {
            mantissa,
            exponent,
            negative,
        };
        amount.normalize();
        amount
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn negate(self) -> Self {
        if self.is_zero() {
            return self;
        }
        Self {
            negative: !self.negative,
            ..self
        }
    }

    /// Exact sum, `None` when the aligned mantissas overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        if self.is_zero() {
            return Some(other);
        }
        if other.is_zero() {
            return Some(self);
        }
        let exponent = self.exponent.min(other.exponent);
        let signed = |a: Amount| -> Option<i128> {
            let shift = u32::try_from(a.exponent - exponent).ok()?;
            let scaled = (a.mantissa as i128).checked_mul(10i128.checked_pow(shift)?)?;
            Some(if a.negative { -scaled } else { scaled })
        };
        let sum = signed(self)?.checked_add(signed(other)?)?;
        let mantissa = u64::try_from(sum.unsigned_abs()).ok()?;
        Some(Amount::new(mantissa, exponent, sum < 0))
    }

    fn normalize(&mut self) {
        if self.mantissa == 0 {
            *self = Self::ZERO;
            return;
        }
        while self.mantissa % 10 == 0 {
            self.mantissa /= 10;
            self.exponent += 1;
        }
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Accepts `[-+]digits[.digits][(e|E)[-+]digits]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AmountParseError(s.to_string());

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (number, exp_part) = match body.find(['e', 'E']) {
            Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
            None => (body, None),
        };

        let (int_part, frac_part) = match number.find('.') {
            Some(pos) => (&number[..pos], &number[pos + 1..]),
            None => (number, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let mut exponent: i64 = match exp_part {
            Some(e) => e.parse::<i32>().map_err(|_| err())? as i64,
            None => 0,
        };

        let mut mantissa: u64 = 0;
        // Digits beyond u64 precision are only accepted when they are zeros
        let mut dropped_int_digits: i64 = 0;
        for b in int_part.bytes() {
            let digit = (b - b'0') as u64;
            match mantissa.checked_mul(10).and_then(|m| m.checked_add(digit)) {
                Some(m) if dropped_int_digits == 0 => mantissa = m,
                _ if digit == 0 => dropped_int_digits += 1,
                _ => return Err(err()),
            }
        }
        exponent += dropped_int_digits;

        let significant_frac = frac_part.trim_end_matches('0');
        for b in significant_frac.bytes() {
            let digit = (b - b'0') as u64;
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(digit))
                .ok_or_else(err)?;
            exponent -= 1;
        }

        let exponent = i32::try_from(exponent).map_err(|_| err())?;
        Ok(Amount::new(mantissa, exponent, negative))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        let digits = self.mantissa.to_string();
        if self.exponent >= 0 {
            write!(f, "{}", digits)?;
            for _ in 0..self.exponent {
                write!(f, "0")?;
            }
            return Ok(());
        }
        let shift = self.exponent.unsigned_abs() as usize;
        if digits.len() > shift {
            let (int, frac) = digits.split_at(digits.len() - shift);
            write!(f, "{}.{}", int, frac)
        } else {
            write!(f, "0.{}{}", "0".repeat(shift - digits.len()), digits)
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn test_parses_decimal_forms() {
        assert_eq!(parse("1000"), Amount::new(1, 3, false));
        assert_eq!(parse("-12.50"), Amount::new(125, -1, true));
        assert_eq!(parse("1.5e3"), Amount::new(15, 2, false));
        assert_eq!(parse(".25"), Amount::new(25, -2, false));
        assert_eq!(parse("-0"), Amount::ZERO);
    }

    #[test]
    fn test_keeps_precision_beyond_f64() {
        let amount = parse("12345678901234567.89");
        assert_eq!(amount.to_string(), "12345678901234567.89");
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "-", "1.2.3", "abc", "1e", "12a", "99999999999999999999999"] {
            assert!(bad.parse::<Amount>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(parse("1.5").checked_add(parse("2.25")), Some(parse("3.75")));
        assert_eq!(parse("10").checked_add(parse("-10")), Some(Amount::ZERO));
        assert_eq!(parse("-3").checked_add(parse("1")), Some(parse("-2")));
        assert_eq!(parse("1e30").checked_add(parse("1e-30")), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(parse("0.001").to_string(), "0.001");
        assert_eq!(parse("100").to_string(), "100");
        assert_eq!(parse("-3.14").to_string(), "-3.14");
    }
}
