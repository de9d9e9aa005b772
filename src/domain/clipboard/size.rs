//! Byte size value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::ByteSizeParseError;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// A size in bytes, parsed from strings such as "512KB" or "5MB".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const fn bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn kib(kib: u64) -> Self {
        Self(kib * KIB)
    }

    pub const fn mib(mib: u64) -> Self {
        Self(mib * MIB)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Size as `usize`, saturating on 32-bit targets
    pub fn as_usize(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl FromStr for ByteSize {
    type Err = ByteSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_uppercase();
        let err = || ByteSizeParseError {
            input: s.to_string(),
        };

        let split = input
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(input.len());
        let (digits, unit) = input.split_at(split);
        if digits.is_empty() {
            return Err(err());
        }

        let value: u64 = digits.parse().map_err(|_| err())?;
        let factor = match unit.trim() {
            "" | "B" => 1,
            "K" | "KB" | "KIB" => KIB,
            "M" | "MB" | "MIB" => MIB,
            "G" | "GB" | "GIB" => GIB,
            _ => return Err(err()),
        };

        value.checked_mul(factor).map(Self).ok_or_else(err)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes != 0 && bytes % GIB == 0 {
            write!(f, "{}GB", bytes / GIB)
        } else if bytes != 0 && bytes % MIB == 0 {
            write!(f, "{}MB", bytes / MIB)
        } else if bytes != 0 && bytes % KIB == 0 {
            write!(f, "{}KB", bytes / KIB)
        } else {
            write!(f, "{}B", bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units() {
        assert_eq!("512".parse::<ByteSize>().unwrap().as_u64(), 512);
        assert_eq!("512B".parse::<ByteSize>().unwrap().as_u64(), 512);
        assert_eq!("4KB".parse::<ByteSize>().unwrap().as_u64(), 4096);
        assert_eq!("5MB".parse::<ByteSize>().unwrap(), ByteSize::mib(5));
        assert_eq!("1 gb".parse::<ByteSize>().unwrap().as_u64(), GIB);
    }

    #[test]
    fn parse_rejects_invalid() {
        assert!("".parse::<ByteSize>().is_err());
        assert!("MB".parse::<ByteSize>().is_err());
        assert!("5TB".parse::<ByteSize>().is_err());
        assert!("-1".parse::<ByteSize>().is_err());
    }

    #[test]
    fn display_picks_largest_exact_unit() {
        assert_eq!(ByteSize::mib(10).to_string(), "10MB");
        assert_eq!(ByteSize::kib(1536).to_string(), "1536KB");
        assert_eq!(ByteSize::bytes(1000).to_string(), "1000B");
        assert_eq!(ByteSize::bytes(0).to_string(), "0B");
    }
}
