// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::parts::ParseError;

/// A binary size suffix as used by the `blkdevparts=` grammar.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    K,
    M,
    G,
    T,
    P,
    E,
}

impl Unit {
    /// The power of 1024 this suffix stands for.
    pub fn exponent(self) -> u32 {
        match self {
            Self::K => 1,
            Self::M => 2,
            Self::G => 3,
            Self::T => 4,
            Self::P => 5,
            Self::E => 6,
        }
    }

    pub fn multiplier(self) -> u64 {
        1024u64.pow(self.exponent())
    }
}

impl TryFrom<u8> for Unit {
    type Error = ParseError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            b'K' => Self::K,
            b'M' => Self::M,
            b'G' => Self::G,
            b'T' => Self::T,
            b'P' => Self::P,
            b'E' => Self::E,
            _ => return Err(ParseError::UnknownUnit(byte as char)),
        })
    }
}

/// Parses a run of decimal digits into a byte count.
pub fn number(digits: &[u8]) -> Result<u64, ParseError> {
    digits.iter().try_fold(0u64, |acc, d| {
        let digit = (*d as char)
            .to_digit(10)
            .ok_or(ParseError::InvalidDigit(*d as char))?;

        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(digit)))
            .ok_or(ParseError::Overflow)
    })
}

/// Expands a literal and an optional suffix into bytes.
///
/// No literal means no size at all (the `-` token), so `None` comes back
/// regardless of the suffix.
pub fn expand(value: Option<u64>, unit: Option<Unit>) -> Result<Option<u64>, ParseError> {
    let value = match value {
        Some(value) => value,
        None => return Ok(None),
    };

    let multiplier = unit.map(Unit::multiplier).unwrap_or(1);
    value
        .checked_mul(multiplier)
        .map(Some)
        .ok_or(ParseError::Overflow)
}
