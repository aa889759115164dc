// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::Command;
use crate::dd::Direction;

use std::path::Path;

use clap::Parser;

/// Print the commands that back up every partition of a device
#[derive(Parser, Debug)]
pub struct Unpack {
    /// The device path to unpack data from (also holds the environment)
    pub device: String,
}

impl Command for Unpack {
    fn execute(self) -> anyhow::Result<()> {
        let table = super::table(Path::new(&self.device))?;
        super::emit(&table.partitions, &self.device, Direction::Read)
    }
}
