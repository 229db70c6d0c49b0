//! Xilinx memory-initialization text: one 14-hex-digit entry per command
//! (`xxxxyyyyrrggbb`, lowercase), comma-separated, the last ended by `;`.
//! The control byte is not stored; it is implied by position.

use std::io::{self, Write};

use lp_core::Rgb;

use crate::command::{Command, Control};
use crate::error::CodecError;
use crate::hex;

pub const COE_RADIX_HEADER: &str = "memory_initialization_radix=16;";
pub const COE_VECTOR_HEADER: &str = "memory_initialization_vector=";

/// Writes the two header lines and one entry per command. There is no
/// newline after the final `;`.
pub fn write_coe<W: Write>(mut w: W, commands: &[Command]) -> io::Result<()> {
    writeln!(w, "{COE_RADIX_HEADER}")?;
    write!(w, "{COE_VECTOR_HEADER}")?;
    for (i, c) in commands.iter().enumerate() {
        let sep = if i + 1 == commands.len() { ';' } else { ',' };
        write!(
            w,
            "\n{:04x}{:04x}{:02x}{:02x}{:02x}{sep}",
            c.x, c.y, c.color.r, c.color.g, c.color.b
        )?;
    }
    w.flush()
}

pub fn coe_string(commands: &[Command]) -> String {
    let mut buf = Vec::with_capacity(64 + commands.len() * 16);
    write_coe(&mut buf, commands).expect("writing to Vec cannot fail");
    String::from_utf8(buf).expect("hex output is ASCII")
}

/// Parses COE text back to commands. Every entry gets [`Control::Continue`]
/// except the one terminated by `;`, which gets [`Control::EndFrame`].
/// Line numbers in errors are 1-based.
pub fn parse_coe(text: &str) -> Result<Vec<Command>, CodecError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    for expected in [COE_RADIX_HEADER, COE_VECTOR_HEADER] {
        match lines.next() {
            Some((_, l)) if l.eq_ignore_ascii_case(expected) => {}
            _ => return Err(CodecError::MissingHeader { expected }),
        }
    }

    let mut commands = Vec::new();
    let mut terminated = false;
    for (line, text) in lines {
        if terminated {
            return Err(CodecError::TrailingEntry { line });
        }
        let (entry, control) = if let Some(e) = text.strip_suffix(',') {
            (e, Control::Continue)
        } else if let Some(e) = text.strip_suffix(';') {
            terminated = true;
            (e, Control::EndFrame)
        } else {
            return Err(CodecError::parse(line, "entry must end with ',' or ';'", text));
        };
        let [x_hi, x_lo, y_hi, y_lo, r, g, b] = hex::decode::<7>(entry.trim())
            .ok_or_else(|| CodecError::parse(line, "expected 14 hex digits", text))?;
        commands.push(Command {
            control,
            x: u16::from_be_bytes([x_hi, x_lo]),
            y: u16::from_be_bytes([y_hi, y_lo]),
            color: Rgb::new(r, g, b),
        });
    }

    if !commands.is_empty() && !terminated {
        return Err(CodecError::Unterminated);
    }
    Ok(commands)
}
