//! Scan modes and their menu codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which eligible files a run re-examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Re-examine every file.
    #[default]
    Full,
    /// Only files the store has never seen. Tracked files are not
    /// re-verified in this mode.
    Incremental,
    /// Admit each file independently with probability `1/p`.
    Sampled(u32),
}

impl ScanMode {
    /// Resolve a numeric menu code.
    ///
    /// | code | mode           |
    /// |------|----------------|
    /// | 1    | `Full`         |
    /// | 2    | `Incremental`  |
    /// | 3    | `Sampled(20)`  |
    /// | 4    | `Sampled(10)`  |
    /// | 5    | `Sampled(2)`   |
    pub fn from_code(code: u8) -> Result<Self, ConfigError> {
        match code {
            1 => Ok(Self::Full),
            2 => Ok(Self::Incremental),
            3 => Ok(Self::Sampled(20)),
            4 => Ok(Self::Sampled(10)),
            5 => Ok(Self::Sampled(2)),
            other => Err(ConfigError::InvalidMode {
                code: other.to_string(),
            }),
        }
    }

    /// Menu entries shown by interactive front ends.
    pub fn menu() -> [(u8, &'static str); 5] {
        [
            (1, "Full scan and verify"),
            (2, "Incremental (new files only)"),
            (3, "Random sample (1/20)"),
            (4, "Random sample (1/10)"),
            (5, "Random sample (1/2)"),
        ]
    }

    /// Sampling divisor, if this is a sampled mode.
    pub fn sample_divisor(&self) -> Option<u32> {
        match self {
            Self::Sampled(p) => Some(*p),
            _ => None,
        }
    }

    /// Reject modes that cannot be executed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Sampled(0) => Err(ConfigError::ZeroSampleDivisor),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Incremental => write!(f, "incremental"),
            Self::Sampled(p) => write!(f, "sampled(1/{p})"),
        }
    }
}

impl FromStr for ScanMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidMode {
                code: trimmed.to_string(),
            })
            .and_then(Self::from_code)
    }
}
