use lp_core::Rgb;

use crate::colorize::ColoredPoint;
use crate::error::CodecError;

/// Galvo DAC counts per pixel.
pub const DAC_SCALE: u32 = 128;

/// Largest pixel coordinate that maps without clamping (`511 * 128 = 65408`).
pub const MAX_UNCLAMPED_COORD: u32 = u16::MAX as u32 / DAC_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Control {
    Continue = 0x01,
    EndFrame = 0x02,
}

impl Control {
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(b: u8) -> Result<Self, CodecError> {
        match b {
            0x01 => Ok(Self::Continue),
            0x02 => Ok(Self::EndFrame),
            other => Err(CodecError::InvalidControl(other)),
        }
    }
}

/// Maps a pixel coordinate to a mirrored 16-bit DAC value:
/// `65535 - coord * 128`, saturating at zero for coordinates past
/// [`MAX_UNCLAMPED_COORD`].
pub fn dac_transform(coord: u32) -> u16 {
    let scaled = coord.saturating_mul(DAC_SCALE).min(u32::from(u16::MAX));
    u16::MAX - scaled as u16
}

/// One 8-byte hardware record:
/// `control(1) x(2) y(2) r(1) g(1) b(1)`, big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub control: Control,
    pub x: u16,
    pub y: u16,
    pub color: Rgb,
}

impl Command {
    pub const LEN: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let [x_hi, x_lo] = self.x.to_be_bytes();
        let [y_hi, y_lo] = self.y.to_be_bytes();
        [
            self.control.to_byte(),
            x_hi,
            x_lo,
            y_hi,
            y_lo,
            self.color.r,
            self.color.g,
            self.color.b,
        ]
    }

    pub fn from_bytes(b: &[u8; Self::LEN]) -> Result<Self, CodecError> {
        Ok(Self {
            control: Control::from_byte(b[0])?,
            x: u16::from_be_bytes([b[1], b[2]]),
            y: u16::from_be_bytes([b[3], b[4]]),
            color: Rgb::new(b[5], b[6], b[7]),
        })
    }

    pub fn from_slice(b: &[u8]) -> Result<Self, CodecError> {
        let record: &[u8; Self::LEN] = b.try_into().map_err(|_| CodecError::RecordLength {
            expected: Self::LEN,
            actual: b.len(),
        })?;
        Self::from_bytes(record)
    }

    pub fn is_end_frame(&self) -> bool {
        self.control == Control::EndFrame
    }
}

/// Encodes a colored trajectory; only the last command carries
/// [`Control::EndFrame`].
pub fn encode_commands(colored: &[ColoredPoint]) -> Vec<Command> {
    let last = colored.len().saturating_sub(1);
    colored
        .iter()
        .enumerate()
        .map(|(i, cp)| Command {
            control: if i == last {
                Control::EndFrame
            } else {
                Control::Continue
            },
            x: dac_transform(cp.point.x),
            y: dac_transform(cp.point.y),
            color: cp.color,
        })
        .collect()
}

/// Concatenated wire bytes of a command sequence.
pub fn to_wire_bytes(commands: &[Command]) -> Vec<u8> {
    let mut out = Vec::with_capacity(commands.len() * Command::LEN);
    for c in commands {
        out.extend_from_slice(&c.to_bytes());
    }
    out
}

/// Splits a concatenated byte stream back into commands.
pub fn from_wire_bytes(bytes: &[u8]) -> Result<Vec<Command>, CodecError> {
    if bytes.len() % Command::LEN != 0 {
        return Err(CodecError::RecordLength {
            expected: Command::LEN,
            actual: bytes.len() % Command::LEN,
        });
    }
    bytes.chunks_exact(Command::LEN).map(Command::from_slice).collect()
}

#[cfg(test)]
mod tests {
    use lp_core::{Point, Rgb};

    use super::{
        Command, Control, MAX_UNCLAMPED_COORD, dac_transform, encode_commands, from_wire_bytes,
        to_wire_bytes,
    };
    use crate::colorize::ColoredPoint;
    use crate::error::CodecError;

    #[test]
    fn dac_transform_mirrors_and_clamps() {
        assert_eq!(dac_transform(0), 65535);
        assert_eq!(dac_transform(5), 64895);
        assert_eq!(dac_transform(MAX_UNCLAMPED_COORD), 65535 - 511 * 128);
        assert_eq!(dac_transform(512), 0);
        assert_eq!(dac_transform(u32::MAX), 0);
    }

    #[test]
    fn single_point_is_end_frame() {
        let cmds = encode_commands(&[ColoredPoint::new(Point::new(5, 5), Rgb::new(9, 8, 7))]);
        assert_eq!(
            cmds,
            vec![Command {
                control: Control::EndFrame,
                x: 64895,
                y: 64895,
                color: Rgb::new(9, 8, 7),
            }]
        );
        assert_eq!(
            cmds[0].to_bytes(),
            [0x02, 0xfd, 0x7f, 0xfd, 0x7f, 9, 8, 7]
        );
    }

    #[test]
    fn only_last_command_ends_the_frame() {
        let colored: Vec<ColoredPoint> = (0..4)
            .map(|i| ColoredPoint::new(Point::new(i, 0), Rgb::WHITE))
            .collect();
        let cmds = encode_commands(&colored);
        assert_eq!(cmds.len(), 4);
        assert!(cmds[..3].iter().all(|c| c.control == Control::Continue));
        assert!(cmds[3].is_end_frame());
        assert!(encode_commands(&[]).is_empty());
    }

    #[test]
    fn byte_layout_is_big_endian() {
        let c = Command {
            control: Control::Continue,
            x: 0x1234,
            y: 0xabcd,
            color: Rgb::new(1, 2, 3),
        };
        assert_eq!(c.to_bytes(), [0x01, 0x12, 0x34, 0xab, 0xcd, 1, 2, 3]);
        assert_eq!(Command::from_bytes(&c.to_bytes()).expect("valid record"), c);
    }

    #[test]
    fn rejects_bad_records() {
        let err = Command::from_bytes(&[0x07, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidControl(0x07)));

        let err = Command::from_slice(&[0x01, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::RecordLength {
                expected: 8,
                actual: 3
            }
        ));
    }

    #[test]
    fn wire_stream_splits_per_record() {
        let colored = [
            ColoredPoint::new(Point::new(1, 2), Rgb::BLACK),
            ColoredPoint::new(Point::new(3, 4), Rgb::new(10, 20, 30)),
        ];
        let cmds = encode_commands(&colored);
        let bytes = to_wire_bytes(&cmds);
        assert_eq!(bytes.len(), 16);
        assert_eq!(from_wire_bytes(&bytes).expect("whole records"), cmds);
        assert!(from_wire_bytes(&bytes[..15]).is_err());
    }
}
