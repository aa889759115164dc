// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

mod pack;
mod unpack;

use crate::dd::{self, Direction};
use crate::env::EnvImage;
use crate::parts::{Partition, Table};

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

pub trait Command {
    fn execute(self) -> anyhow::Result<()>;
}

#[derive(Parser, Debug)]
#[clap(version, about = "Packs and unpacks blkdevparts partitions to/from devices")]
pub struct Main {
    /// Only report warnings and errors on stderr
    #[clap(short, long, global = true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub command: Option<Sub>,
}

#[derive(Subcommand, Debug)]
pub enum Sub {
    Pack(pack::Pack),
    Unpack(unpack::Unpack),
}

impl Command for Sub {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Pack(cmd) => cmd.execute(),
            Self::Unpack(cmd) => cmd.execute(),
        }
    }
}

/// Reads the partition table out of an environment image.
fn table(path: &Path) -> Result<Table> {
    let env = EnvImage::load(path)
        .with_context(|| format!("failed to read environment image {}", path.display()))?;

    debug!("{}: {} bytes of environment", path.display(), env.as_bytes().len());
    for (key, value) in env.vars() {
        match key {
            Some(key) => debug!(
                "{}={}",
                String::from_utf8_lossy(key),
                String::from_utf8_lossy(value)
            ),
            None => debug!("{}", String::from_utf8_lossy(value)),
        }
    }

    let table = Table::from_env(&env)
        .with_context(|| format!("bad partition table in {}", path.display()))?;

    debug!(
        "{}: {} partitions, {:#x} bytes before the last",
        table.device,
        table.partitions.len(),
        table.end
    );

    Ok(table)
}

fn emit(partitions: &[Partition], device: &str, direction: Direction) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(dd::script(partitions, device, direction).as_bytes())?;
    Ok(out.flush()?)
}
