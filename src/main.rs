// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

#![warn(clippy::all)]

mod commands;
mod dd;
mod env;
mod parts;
mod size;

use std::io::Write;

use clap::{CommandFactory, Parser};
use commands::Command;

fn main() -> anyhow::Result<()> {
    let main = match commands::Main::try_parse() {
        Ok(main) => main,
        Err(e) if e.use_stderr() => {
            e.print()?;
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    let level = if main.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "● {}", record.args()))
        .init();

    match main.command {
        Some(command) => command.execute(),
        None => {
            commands::Main::command().write_help(&mut std::io::stderr())?;
            std::process::exit(1);
        }
    }
}
