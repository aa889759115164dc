// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::parts::Partition;

use std::fmt;

/// Which way the bytes flow between the device and the image files.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Back up: device to `<name>.img`.
    Read,
    /// Restore: `<name>.img` to device.
    Write,
}

/// A `dd` invocation for a single partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DdCommand(Vec<String>);

impl DdCommand {
    const PROGRAM: &'static str = "dd";

    pub fn new(partition: &Partition, device: &str, direction: Direction) -> Self {
        let image = partition.image();

        let mut argv = vec![Self::PROGRAM.to_string()];
        match direction {
            Direction::Read => argv.extend([
                format!("if={}", device),
                format!("of={}", image),
                format!("iseek={}", partition.offset),
                "iflag=skip_bytes".into(),
                "status=progress".into(),
            ]),

            Direction::Write => argv.extend([
                format!("if={}", image),
                format!("of={}", device),
                format!("oseek={}", partition.offset),
                "oflag=seek_bytes".into(),
                "status=progress".into(),
                "conv=fsync".into(),
            ]),
        }

        if let Some(size) = partition.size {
            argv.push(format!("count={}", size));
            argv.push("iflag=count_bytes".into());
        }

        Self(argv)
    }

    pub fn args(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for DdCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }

            f.write_str(&quote(arg))?;
        }

        Ok(())
    }
}

/// Quotes a word for a POSIX shell.
pub fn quote(word: &str) -> String {
    fn safe(c: char) -> bool {
        c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c)
    }

    if word.is_empty() {
        return "''".into();
    }

    if word.chars().all(safe) {
        return word.into();
    }

    format!("'{}'", word.replace('\'', r#"'"'"'"#))
}

/// Renders one command line per partition, newline terminated.
pub fn script(partitions: &[Partition], device: &str, direction: Direction) -> String {
    partitions
        .iter()
        .map(|p| format!("{}\n", DdCommand::new(p, device, direction)))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn kernel() -> Partition {
        Partition {
            name: "kernel".into(),
            offset: 1048576,
            size: Some(4194304),
        }
    }

    fn rootfs() -> Partition {
        Partition {
            name: "rootfs".into(),
            offset: 5242880,
            size: None,
        }
    }

    #[test]
    fn write() {
        let cmd = DdCommand::new(&kernel(), "/dev/mmcblk0", Direction::Write);
        assert_eq!(
            cmd.args(),
            [
                "dd",
                "if=kernel.img",
                "of=/dev/mmcblk0",
                "oseek=1048576",
                "oflag=seek_bytes",
                "status=progress",
                "conv=fsync",
                "count=4194304",
                "iflag=count_bytes",
            ]
        );
    }

    #[test]
    fn read() {
        let cmd = DdCommand::new(&kernel(), "/dev/mmcblk0", Direction::Read);
        assert_eq!(
            cmd.to_string(),
            "dd if=/dev/mmcblk0 of=kernel.img iseek=1048576 iflag=skip_bytes \
             status=progress count=4194304 iflag=count_bytes"
        );
    }

    #[test]
    fn unbounded() {
        for direction in [Direction::Read, Direction::Write] {
            let cmd = DdCommand::new(&rootfs(), "/dev/sdb", direction);
            assert!(!cmd.args().iter().any(|a| a.starts_with("count=")));
            assert!(!cmd.args().iter().any(|a| a == "iflag=count_bytes"));
        }

        let cmd = DdCommand::new(&rootfs(), "/dev/sdb", Direction::Write);
        assert_eq!(
            cmd.to_string(),
            "dd if=rootfs.img of=/dev/sdb oseek=5242880 oflag=seek_bytes status=progress conv=fsync"
        );
    }

    #[test]
    fn quoting() {
        assert_eq!(quote(""), "''");
        assert_eq!(quote("of=/dev/disk/by-id/usb-1:0,2@x%+"), "of=/dev/disk/by-id/usb-1:0,2@x%+");
        assert_eq!(quote("if=my disk.img"), "'if=my disk.img'");
        assert_eq!(quote("of=it's"), r#"'of=it'"'"'s'"#);
        assert_eq!(quote("of=$HOME"), "'of=$HOME'");
        assert_eq!(quote("of=é"), "'of=é'");
    }

    #[test]
    fn quoted_name() {
        let part = Partition {
            name: "my data".into(),
            offset: 0,
            size: Some(512),
        };

        let cmd = DdCommand::new(&part, "/dev/sdb", Direction::Read);
        assert!(cmd.to_string().contains(" 'of=my data.img' "));
    }

    #[test]
    fn lines() {
        let text = script(&[kernel(), rootfs()], "/dev/mmcblk0", Direction::Write);
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("dd if=kernel.img "));
        assert!(lines[1].starts_with("dd if=rootfs.img "));
        assert!(text.ends_with('\n'));
    }
}
