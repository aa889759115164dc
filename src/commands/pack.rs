// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::Command;
use crate::dd::Direction;

use std::path::PathBuf;

use clap::Parser;

/// Print the commands that restore every partition image to a device
#[derive(Parser, Debug)]
pub struct Pack {
    /// The environment image holding the partition table
    #[clap(short, long, default_value = "./env.img")]
    pub env: PathBuf,

    /// The device path to pack data to
    pub device: String,
}

impl Command for Pack {
    fn execute(self) -> anyhow::Result<()> {
        let table = super::table(&self.env)?;
        super::emit(&table.partitions, &self.device, Direction::Write)
    }
}
