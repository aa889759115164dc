// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::env::EnvImage;
use crate::size::{self, Unit};

use std::fmt;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

static ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([0-9]+)([KMGTPE])?(?:@([0-9]+)([KMGTPE])?)?|(-))\((.*)\)")
        .expect("partition entry pattern")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no blkdevparts= variable in the environment")]
    MissingKey,
    #[error("blkdevparts value has no <device>:<partlist> separator")]
    MissingSeparator,
    #[error("blkdevparts value has more than one ':' separator")]
    ExtraSeparator,
    #[error("malformed partition entry #{index}: {entry:?}")]
    Malformed { index: usize, entry: String },
    #[error("environment region has no NUL terminator")]
    Unterminated,
    #[error("invalid digit {0:?} in size or offset")]
    InvalidDigit(char),
    #[error("unknown size unit {0:?}")]
    UnknownUnit(char),
    #[error("partition size or offset overflows 64 bits")]
    Overflow,
    #[error("blkdevparts value is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// One comma-separated unit of a partlist, as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<'a> {
    /// `None` for the `-` (rest of device) token.
    pub size: Option<u64>,
    /// The `@offset` override, if one was given.
    pub offset: Option<u64>,
    pub name: &'a str,
}

impl<'a> Entry<'a> {
    pub fn parse(index: usize, text: &'a str) -> Result<Self, ParseError> {
        let caps = ENTRY.captures(text).ok_or_else(|| ParseError::Malformed {
            index,
            entry: text.to_string(),
        })?;

        fn sized(caps: &Captures, value: usize, unit: usize) -> Result<Option<u64>, ParseError> {
            let value = caps
                .get(value)
                .map(|m| size::number(m.as_str().as_bytes()))
                .transpose()?;
            let unit = caps
                .get(unit)
                .map(|m| Unit::try_from(m.as_str().as_bytes()[0]))
                .transpose()?;

            size::expand(value, unit)
        }

        let name = caps.get(6).map(|m| m.as_str()).unwrap_or_default();

        Ok(Self {
            size: sized(&caps, 1, 2)?,
            offset: sized(&caps, 3, 4)?,
            name,
        })
    }
}

/// A region of the device and the image file that backs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub name: String,
    pub offset: u64,
    /// `None` means the partition runs to the end of the device.
    pub size: Option<u64>,
}

impl Partition {
    pub fn image(&self) -> String {
        format!("{}.img", self.name)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size {
            Some(size) => write!(f, "{}: {:02x}/{:02x}", self.name, self.offset, size),
            None => write!(f, "{}: {:02x}/-", self.name, self.offset),
        }
    }
}

/// The parsed `blkdevparts=<device>:<partlist>` value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    /// The device name as the boot loader knows it.
    pub device: String,
    pub partitions: Vec<Partition>,
    /// Sum of every known partition size.
    pub end: u64,
}

impl Table {
    pub fn from_env(env: &EnvImage) -> Result<Self, ParseError> {
        Self::parse(env.blkdevparts()?)
    }

    pub fn parse(value: &str) -> Result<Self, ParseError> {
        info!("{}", value);

        let mut fields = value.split(':');
        let device = fields.next().unwrap_or_default();
        let partlist = fields.next().ok_or(ParseError::MissingSeparator)?;
        if fields.next().is_some() {
            return Err(ParseError::ExtraSeparator);
        }

        let (partitions, end) = partlist.split(',').enumerate().try_fold(
            (Vec::new(), 0u64),
            |(mut partitions, end), (index, text)| {
                let entry = Entry::parse(index, text)?;

                // Explicit offsets produce broken layouts on real boards, so
                // placement always follows the running total.
                if let Some(offset) = entry.offset {
                    debug!("{}: ignoring offset override {:#x}", entry.name, offset);
                }

                let partition = Partition {
                    name: entry.name.to_string(),
                    offset: end,
                    size: entry.size,
                };
                info!("{}", partition);

                let end = match entry.size {
                    Some(size) => end.checked_add(size).ok_or(ParseError::Overflow)?,
                    None => end,
                };

                partitions.push(partition);
                Ok::<_, ParseError>((partitions, end))
            },
        )?;

        Ok(Self {
            device: device.to_string(),
            partitions,
            end,
        })
    }
}
