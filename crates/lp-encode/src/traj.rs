//! Plain hex dump of the wire bytes: one 16-digit line per command.

use std::io::{self, Write};

use crate::command::Command;
use crate::error::CodecError;
use crate::hex;

pub fn write_traj<W: Write>(mut w: W, commands: &[Command]) -> io::Result<()> {
    for c in commands {
        for b in c.to_bytes() {
            write!(w, "{b:02x}")?;
        }
        writeln!(w)?;
    }
    w.flush()
}

pub fn traj_string(commands: &[Command]) -> String {
    let mut buf = Vec::with_capacity(commands.len() * 17);
    write_traj(&mut buf, commands).expect("writing to Vec cannot fail");
    String::from_utf8(buf).expect("hex output is ASCII")
}

/// Blank lines are skipped; line numbers in errors are 1-based.
pub fn parse_traj(text: &str) -> Result<Vec<Command>, CodecError> {
    let mut commands = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let bytes = hex::decode::<{ Command::LEN }>(line)
            .ok_or_else(|| CodecError::parse(i + 1, "expected 16 hex digits", line))?;
        let c = Command::from_bytes(&bytes).map_err(|e| match e {
            CodecError::InvalidControl(_) => CodecError::parse(i + 1, "invalid control byte", line),
            other => other,
        })?;
        commands.push(c);
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use lp_core::{Point, Rgb};

    use super::{parse_traj, traj_string};
    use crate::colorize::ColoredPoint;
    use crate::command::encode_commands;
    use crate::error::CodecError;

    #[test]
    fn one_line_per_command() {
        let cmds = encode_commands(&[
            ColoredPoint::new(Point::new(0, 0), Rgb::BLACK),
            ColoredPoint::new(Point::new(5, 5), Rgb::new(0x12, 0x34, 0x56)),
        ]);
        let text = traj_string(&cmds);
        assert_eq!(text, "01ffffffff000000\n02fd7ffd7f123456\n");
        assert_eq!(parse_traj(&text).expect("valid traj"), cmds);
    }

    #[test]
    fn rejects_unknown_control() {
        let err = parse_traj("01ffffffff000000\n\n09ffffffff000000\n").unwrap_err();
        assert!(matches!(err, CodecError::Parse { line: 3, .. }), "{err}");
    }
}
