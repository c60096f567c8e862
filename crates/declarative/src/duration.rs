//! Timeout codec between manifest strings and wire milliseconds.
//!
//! Manifests write timeouts the way operators think about them (`30s`,
//! `1m30s`, `500ms`) while the Data Plane API stores integer milliseconds.
//!
//! Parsing rules:
//! - input is trimmed; an empty string means "unset" (0)
//! - a bare integer is already milliseconds
//! - anything else follows the usual duration grammar: one or more
//!   `<decimal><unit>` components with units `ns`, `us`, `µs`, `μs`, `ms`,
//!   `s`, `m`, `h`, an optional leading sign, and a bare `0`
//! - the result is truncated to whole milliseconds; negative values are
//!   rejected

use crate::error::{Error, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

const NANOS_PER_MILLI: u128 = 1_000_000;
const MAX_NANOS: u128 = i64::MAX as u128;

const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

fn invalid(input: &str, reason: &str) -> Error {
    Error::Duration {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Convert a timeout string to whole milliseconds.
///
/// # Example
///
/// ```
/// use declarative::duration::parse_millis;
///
/// assert_eq!(parse_millis("1500ms").unwrap(), 1500);
/// assert_eq!(parse_millis("30s").unwrap(), 30_000);
/// assert_eq!(parse_millis("5000").unwrap(), 5000);
/// assert_eq!(parse_millis("").unwrap(), 0);
/// assert!(parse_millis("not-a-duration").is_err());
/// ```
pub fn parse_millis(input: &str) -> Result<u64> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(0);
    }

    if let Ok(n) = s.parse::<i64>() {
        return u64::try_from(n).map_err(|_| invalid(s, "negative durations are not allowed"));
    }

    let (negative, nanos) = parse_nanos(s)?;
    if negative && nanos > 0 {
        return Err(invalid(s, "negative durations are not allowed"));
    }

    u64::try_from(nanos / NANOS_PER_MILLI).map_err(|_| invalid(s, "duration out of range"))
}

/// Parse a sign-prefixed sequence of `<decimal><unit>` components.
fn parse_nanos(s: &str) -> Result<(bool, u128)> {
    let (negative, mut rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    if rest == "0" {
        return Ok((negative, 0));
    }
    if rest.is_empty() {
        return Err(invalid(s, "empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let whole: u128 = if int_len > 0 {
            rest[..int_len]
                .parse()
                .map_err(|_| invalid(s, "duration out of range"))?
        } else {
            0
        };
        rest = &rest[int_len..];

        let mut fraction = 0u128;
        let mut scale = 1f64;
        let mut frac_len = 0;
        if let Some(after_dot) = rest.strip_prefix('.') {
            frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            for digit in after_dot[..frac_len].bytes() {
                // Digits beyond u128 precision cannot change the result.
                if scale < 1e30 {
                    fraction = fraction * 10 + u128::from(digit - b'0');
                    scale *= 10.0;
                }
            }
            rest = &after_dot[frac_len..];
        }
        if int_len == 0 && frac_len == 0 {
            return Err(invalid(s, "expected a number"));
        }

        let unit_len = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() || *c == '.')
            .map_or(rest.len(), |(i, _)| i);
        let unit = &rest[..unit_len];
        if unit.is_empty() {
            return Err(invalid(s, "missing unit"));
        }
        let factor = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, factor)| *factor)
            .ok_or_else(|| invalid(s, &format!("unknown unit {unit:?}")))?;
        rest = &rest[unit_len..];

        let mut component = whole
            .checked_mul(factor)
            .filter(|v| *v <= MAX_NANOS)
            .ok_or_else(|| invalid(s, "duration out of range"))?;
        if fraction > 0 {
            component += (fraction as f64 * (factor as f64 / scale)) as u128;
        }

        total = total
            .checked_add(component)
            .filter(|v| *v <= MAX_NANOS)
            .ok_or_else(|| invalid(s, "duration out of range"))?;
    }

    Ok((negative, total))
}

/// Render milliseconds as the shortest standard duration string.
///
/// Zero renders as an empty string so unset timeouts stay unset.
///
/// # Example
///
/// ```
/// use declarative::duration::format_millis;
///
/// assert_eq!(format_millis(0), "");
/// assert_eq!(format_millis(500), "500ms");
/// assert_eq!(format_millis(1500), "1.5s");
/// assert_eq!(format_millis(90_000), "1m30s");
/// assert_eq!(format_millis(3_600_000), "1h0m0s");
/// ```
#[must_use]
pub fn format_millis(ms: u64) -> String {
    if ms == 0 {
        return String::new();
    }
    if ms < 1000 {
        return format!("{ms}ms");
    }

    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let secs = (ms / 1000) % 60;
    let millis = ms % 1000;

    let mut seconds = secs.to_string();
    if millis > 0 {
        let frac = format!("{millis:03}");
        seconds.push('.');
        seconds.push_str(frac.trim_end_matches('0'));
    }

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

// =============================================================================
// Timeout field
// =============================================================================

/// A timeout as written in a manifest.
///
/// Keeps the operator's spelling for rendering but compares by value, so
/// `30000` and `30s` are the same timeout. Strings that do not parse only
/// equal an identical string.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Timeout(String);

impl Timeout {
    /// Wrap a raw timeout string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Render wire milliseconds for a manifest.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self(format_millis(ms))
    }

    /// The raw string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the timeout is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Value in milliseconds; 0 when unset.
    pub fn millis(&self) -> Result<u64> {
        parse_millis(&self.0)
    }
}

impl PartialEq for Timeout {
    fn eq(&self, other: &Self) -> bool {
        match (self.millis(), other.millis()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.0 == other.0,
        }
    }
}

impl From<&str> for Timeout {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Timeout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TimeoutVisitor;

        impl Visitor<'_> for TimeoutVisitor {
            type Value = Timeout;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a duration string or integer milliseconds")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Timeout, E> {
                Ok(Timeout::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Timeout, E> {
                Ok(Timeout::new(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Timeout, E> {
                Ok(Timeout::new(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Timeout, E> {
                Ok(Timeout::default())
            }
        }

        deserializer.deserialize_any(TimeoutVisitor)
    }
}
