//! Byte-size parsing and display.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

const KIB: u64 = 1024;

/// Parses a human-readable size such as `"100MiB"`, `"1.5 GB"` or `"4096"`.
///
/// Suffixes are case-insensitive and always binary: `K`, `KB` and `KiB`
/// all mean 1024 bytes. A bare number is a byte count.
///
/// # Errors
///
/// Returns [`CoreError::InvalidSize`] for an empty string, an unknown suffix,
/// or a negative / non-numeric value.
pub fn parse_size(input: &str) -> CoreResult<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidSize(input.to_string()));
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(split);

    let multiplier = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KIB,
        "m" | "mb" | "mib" => KIB.pow(2),
        "g" | "gb" | "gib" => KIB.pow(3),
        "t" | "tb" | "tib" => KIB.pow(4),
        _ => return Err(CoreError::InvalidSize(input.to_string())),
    };

    if let Ok(whole) = number.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| CoreError::InvalidSize(input.to_string()));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| CoreError::InvalidSize(input.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::InvalidSize(input.to_string()));
    }
    Ok((value * multiplier as f64) as u64)
}

/// Formats a byte count with decimal units and two decimals, e.g. `"1.50 KB"`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1000.0 && unit < UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}

/// A byte count that (de)serializes as a human-readable size string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn bytes(self) -> u64 {
        self.0
    }
}

impl TryFrom<String> for ByteSize {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_size(&value).map(ByteSize)
    }
}

impl From<ByteSize> for String {
    fn from(size: ByteSize) -> Self {
        size.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_uses_decimal_units() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1000), "1.00 KB");
        assert_eq!(format_size(1500), "1.50 KB");
        assert_eq!(format_size(1000 * 1000), "1.00 MB");
        assert_eq!(format_size(123_456_789), "123.46 MB");
        assert_eq!(format_size(1000u64.pow(3)), "1.00 GB");
        assert_eq!(format_size(1000u64.pow(4)), "1.00 TB");
    }

    #[test]
    fn parse_size_plain_bytes() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("12 B").unwrap(), 12);
    }

    #[test]
    fn parse_size_binary_suffixes() {
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("100MiB").unwrap(), 100 * 1024 * 1024);
        assert_eq!(parse_size("100mb").unwrap(), 100 * 1024 * 1024);
        assert_eq!(parse_size("2 GiB").unwrap(), 2 * 1024 * 1024 * 1024);
    }

    #[test]
    fn parse_size_fractional() {
        assert_eq!(parse_size("1.5KiB").unwrap(), 1536);
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(matches!(parse_size(""), Err(CoreError::InvalidSize(_))));
        assert!(matches!(parse_size("ten MB"), Err(CoreError::InvalidSize(_))));
        assert!(matches!(parse_size("10 parsecs"), Err(CoreError::InvalidSize(_))));
        assert!(matches!(parse_size("-5MB"), Err(CoreError::InvalidSize(_))));
    }

    #[test]
    fn byte_size_deserializes_from_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            limit: ByteSize,
        }

        let parsed: Wrapper = toml::from_str(r#"limit = "2KiB""#).unwrap();
        assert_eq!(parsed.limit, ByteSize(2048));

        let bad: Result<Wrapper, _> = toml::from_str(r#"limit = "lots""#);
        assert!(bad.is_err());
    }
}
