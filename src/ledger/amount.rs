//! Amount Module
//!
//! Fixed-point money type with two fractional digits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Returned when a cell or argument cannot be read as an amount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid amount")]
pub struct ParseAmountError(pub String);

// == Amount ==
/// A signed amount stored as hundredths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Builds an amount from hundredths (`12050` is `120.50`).
    pub const fn from_minor(minor: i64) -> Self {
        Amount(minor)
    }

    /// Builds a whole-unit amount.
    pub const fn from_units(units: i64) -> Self {
        Amount(units * 100)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `self - other`, or `None` on overflow.
    pub const fn checked_sub(self, other: Amount) -> Option<Amount> {
        match self.0.checked_sub(other.0) {
            Some(minor) => Some(Amount(minor)),
            None => None,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let (whole, cents) = (abs / 100, abs % 100);
        if cents == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            write!(f, "{}{}.{:02}", sign, whole, cents)
        }
    }
}

// == Parsing ==
/// Accepts the formats a spreadsheet export produces for numbers:
/// `120`, `120.5`, `-3,75`, `1 200,50` (space or NBSP grouping),
/// `1,200.50`, and a currency sign around the number. More than two
/// fractional digits are rounded half away from zero.
impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseAmountError(raw.to_string());

        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\'')
            .collect();
        let trimmed = compact.trim_matches(|c: char| {
            !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | ','))
        });

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if body.is_empty() {
            return Err(invalid());
        }

        let (whole, fraction) = split_decimal(body);
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let digits: Vec<i64> = fraction
            .bytes()
            .map(|b| i64::from(b - b'0'))
            .collect();
        let mut cents = digits.first().copied().unwrap_or(0) * 10 + digits.get(1).copied().unwrap_or(0);
        if digits.get(2).copied().unwrap_or(0) >= 5 {
            cents += 1;
        }

        let minor = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Amount(if negative { -minor } else { minor }))
    }
}

/// Splits into (whole digits, fraction digits) with grouping separators removed.
///
/// The right-most `.` or `,` is the decimal separator unless that same
/// character occurs more than once and the other one never does, in which
/// case it is grouping (`1,200,000`).
fn split_decimal(body: &str) -> (String, String) {
    let is_sep = |c: char| c == '.' || c == ',';
    let Some(index) = body.rfind(is_sep) else {
        return (body.to_string(), String::new());
    };

    let sep = body[index..].chars().next().unwrap_or('.');
    let other = if sep == '.' { ',' } else { '.' };
    if body.matches(sep).count() > 1 && !body.contains(other) {
        return (body.replace(sep, ""), String::new());
    }

    let whole: String = body[..index].chars().filter(|c| !is_sep(*c)).collect();
    (whole, body[index + 1..].to_string())
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
