use lazy_static::lazy_static;
use regex::Regex;
use std::{fmt, str::FromStr, time::Duration};

lazy_static! {
    static ref BYTE_SIZE: Regex = Regex::new(r"^(\d+)([KMG]?)B?$").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum ParseLimitError {
    #[error("\"{0}\" is not a valid byte size")]
    InvalidByteSize(String),
    #[error("\"{0}\" is not a valid time limit")]
    InvalidTime(String),
    #[error("\"{0}\" is not a positive limit")]
    NotPositive(String),
}

/// A memory size such as `512M`: digits with an optional binary `K`, `M` or
/// `G` unit, in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(pub u64);

impl FromStr for ByteSize {
    type Err = ParseLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let caps = BYTE_SIZE
            .captures(&upper)
            .ok_or_else(|| ParseLimitError::InvalidByteSize(s.to_owned()))?;
        let count: u64 = caps[1]
            .parse()
            .map_err(|_| ParseLimitError::InvalidByteSize(s.to_owned()))?;
        let unit: u64 = match &caps[2] {
            "K" => 1024,
            "M" => 1024 * 1024,
            "G" => 1024 * 1024 * 1024,
            _ => 1,
        };
        let bytes = count
            .checked_mul(unit)
            .ok_or_else(|| ParseLimitError::InvalidByteSize(s.to_owned()))?;
        if bytes == 0 {
            return Err(ParseLimitError::NotPositive(s.to_owned()));
        }
        Ok(ByteSize(bytes))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

/// A wall-clock limit, either fractional seconds (`2`, `0.5`) or a
/// humantime duration (`1500ms`, `1s 500ms`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLimit(pub Duration);

impl FromStr for TimeLimit {
    type Err = ParseLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let duration = match trimmed.parse::<f64>() {
            Ok(secs) => Duration::try_from_secs_f64(secs)
                .map_err(|_| ParseLimitError::InvalidTime(s.to_owned()))?,
            Err(_) => humantime::parse_duration(trimmed)
                .map_err(|_| ParseLimitError::InvalidTime(s.to_owned()))?,
        };
        if duration.is_zero() {
            return Err(ParseLimitError::NotPositive(s.to_owned()));
        }
        Ok(TimeLimit(duration))
    }
}
