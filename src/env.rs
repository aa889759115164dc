// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::parts::ParseError;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::from_utf8;

/// The head of a boot-loader environment image.
///
/// The variable region is NUL-terminated: only the bytes before the first
/// NUL are searched, and an image without one in the window is rejected
/// rather than parsed short.
pub struct EnvImage(Vec<u8>);

impl EnvImage {
    /// How much of the image is ever read.
    pub const SIZE: u64 = 1024;

    const KEY: &'static [u8] = b"blkdevparts=";

    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Reads the head of an image file or block device.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut head = Vec::with_capacity(Self::SIZE as usize);
        File::open(path)?.take(Self::SIZE).read_to_end(&mut head)?;
        Ok(Self::new(head))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The bytes before the first NUL.
    pub fn region(&self) -> Result<&[u8], ParseError> {
        let end = self
            .0
            .iter()
            .position(|b| *b == 0)
            .ok_or(ParseError::Unterminated)?;

        Ok(&self.0[..end])
    }

    /// Every NUL-separated variable up to the empty one that ends the list.
    pub fn vars(&self) -> Vars {
        Vars(&self.0)
    }

    /// Returns everything after the first `blkdevparts=`.
    ///
    /// The key is searched for anywhere in the region so a binary header in
    /// front of it (such as a checksum) does not get in the way.
    pub fn blkdevparts(&self) -> Result<&str, ParseError> {
        let region = self.region()?;
        let start = region
            .windows(Self::KEY.len())
            .position(|w| w == Self::KEY)
            .ok_or(ParseError::MissingKey)?;

        Ok(from_utf8(&region[start + Self::KEY.len()..])?)
    }
}

/// Iterates over `key=value` pairs separated by NULs.
pub struct Vars<'a>(&'a [u8]);

impl<'a> Iterator for Vars<'a> {
    type Item = (Option<&'a [u8]>, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        // An empty variable (double NUL) ends the list.
        if self.0.first().map_or(true, |b| *b == 0) {
            self.0 = &[];
            return None;
        }

        let end = self.0.iter().position(|b| *b == 0).unwrap_or(self.0.len());
        let var = &self.0[..end];
        self.0 = &self.0[(end + 1).min(self.0.len())..];

        match var.iter().position(|b| *b == b'=') {
            Some(equals) => Some((Some(&var[..equals]), &var[equals + 1..])),
            None => Some((None, var)),
        }
    }
}
