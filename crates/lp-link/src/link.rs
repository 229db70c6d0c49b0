//! Raw Ethernet II delivery: `dst(6) src(6) ethertype(2) command(8)`.
//!
//! Frames are written whole, one `write` per frame, to any packet-oriented
//! handle: a network interface through [`crate::InterfaceWriter`], or an
//! in-memory buffer.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use lp_encode::Command;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TransportError;
use crate::sink::CommandSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const fn octets(self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Accepts `:` or `-` separated hex octets.
impl FromStr for MacAddr {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransportError::InvalidMac(s.to_owned());
        let mut out = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for slot in &mut out {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(out))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

pub const DEFAULT_SRC: MacAddr = MacAddr([0x00, 0xe0, 0x4c, 0x71, 0x2a, 0xbc]);
pub const DEFAULT_DST: MacAddr = MacAddr([0xb8, 0x27, 0xeb, 0xa4, 0x30, 0x73]);
pub const DEFAULT_ETHERTYPE: u16 = 0x2345;

/// Ethernet II header used for every command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkFrame {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub ethertype: u16,
}

impl Default for LinkFrame {
    fn default() -> Self {
        Self {
            dst: DEFAULT_DST,
            src: DEFAULT_SRC,
            ethertype: DEFAULT_ETHERTYPE,
        }
    }
}

impl LinkFrame {
    pub const HEADER_LEN: usize = 14;
    pub const LEN: usize = Self::HEADER_LEN + Command::LEN;

    pub fn encode(&self, command: &Command) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..6].copy_from_slice(&self.dst.0);
        out[6..12].copy_from_slice(&self.src.0);
        out[12..14].copy_from_slice(&self.ethertype.to_be_bytes());
        out[14..].copy_from_slice(&command.to_bytes());
        out
    }

    /// Decodes a frame carrying this header's ethertype. Trailing bytes
    /// (link-layer padding) are ignored.
    pub fn decode(&self, bytes: &[u8]) -> Result<(MacAddr, MacAddr, Command), TransportError> {
        if bytes.len() < Self::LEN {
            return Err(TransportError::FrameTooShort(bytes.len()));
        }
        let mac = |r: std::ops::Range<usize>| {
            let mut m = [0u8; 6];
            m.copy_from_slice(&bytes[r]);
            MacAddr(m)
        };
        let ethertype = u16::from_be_bytes([bytes[12], bytes[13]]);
        if ethertype != self.ethertype {
            return Err(TransportError::EtherType {
                expected: self.ethertype,
                actual: ethertype,
            });
        }
        let command = Command::from_slice(&bytes[Self::HEADER_LEN..Self::LEN])?;
        Ok((mac(0..6), mac(6..12), command))
    }
}

/// Writes each command as one Ethernet II frame to `device`.
#[derive(Debug)]
pub struct LinkSink<W> {
    device: W,
    frame: LinkFrame,
}

impl<W: Write> LinkSink<W> {
    pub fn new(device: W, frame: LinkFrame) -> Self {
        Self { device, frame }
    }

    pub fn frame(&self) -> &LinkFrame {
        &self.frame
    }

    pub fn get_ref(&self) -> &W {
        &self.device
    }

    pub fn into_inner(self) -> W {
        self.device
    }
}

impl<W: Write> CommandSink for LinkSink<W> {
    fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        let bytes = self.frame.encode(command);
        // Packet devices take a frame per write; a partial write is a loss.
        let written = self.device.write(&bytes)?;
        if written != bytes.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }
        self.device.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use lp_core::{Point, Rgb};
    use lp_encode::{ColoredPoint, encode_commands};

    use super::{DEFAULT_DST, LinkFrame, LinkSink, MacAddr};
    use crate::error::TransportError;
    use crate::sink::{Pacer, send_frame};

    #[test]
    fn mac_parses_and_prints() {
        let mac: MacAddr = "B8-27-eb-a4-30-73".parse().expect("valid mac");
        assert_eq!(mac, DEFAULT_DST);
        assert_eq!(mac.to_string(), "b8:27:eb:a4:30:73");
        assert!("b8:27:eb:a4:30".parse::<MacAddr>().is_err());
        assert!("b8:27:eb:a4:30:73:00".parse::<MacAddr>().is_err());
        assert!("b8:27:eb:a4:30:+7".parse::<MacAddr>().is_err());
    }

    #[test]
    fn link_frame_serde_uses_defaults_and_strings() {
        let f: LinkFrame =
            serde_json::from_str(r#"{"dst":"01:02:03:04:05:06"}"#).expect("valid json");
        assert_eq!(f.dst, MacAddr([1, 2, 3, 4, 5, 6]));
        assert_eq!(f.src, LinkFrame::default().src);
        assert_eq!(f.ethertype, 0x2345);

        let json = serde_json::to_string(&LinkFrame::default()).expect("serialize");
        assert!(json.contains("\"b8:27:eb:a4:30:73\""), "{json}");
    }

    #[test]
    fn frame_layout() {
        let cmds = encode_commands(&[ColoredPoint::new(Point::new(5, 5), Rgb::new(7, 8, 9))]);
        let frame = LinkFrame::default();
        let bytes = frame.encode(&cmds[0]);
        assert_eq!(
            bytes,
            [
                0xb8, 0x27, 0xeb, 0xa4, 0x30, 0x73, // dst
                0x00, 0xe0, 0x4c, 0x71, 0x2a, 0xbc, // src
                0x23, 0x45, // ethertype
                0x02, 0xfd, 0x7f, 0xfd, 0x7f, 7, 8, 9,
            ]
        );

        let mut padded = bytes.to_vec();
        padded.resize(60, 0);
        let (dst, src, c) = frame.decode(&padded).expect("valid frame");
        assert_eq!((dst, src, c), (frame.dst, frame.src, cmds[0]));

        let other = LinkFrame {
            ethertype: 0x0800,
            ..frame
        };
        assert!(matches!(
            other.decode(&bytes),
            Err(TransportError::EtherType { .. })
        ));
        assert!(matches!(
            frame.decode(&bytes[..10]),
            Err(TransportError::FrameTooShort(10))
        ));
    }

    #[test]
    fn sink_writes_one_frame_per_command() {
        let cmds = encode_commands(&[
            ColoredPoint::new(Point::new(0, 0), Rgb::BLACK),
            ColoredPoint::new(Point::new(9, 0), Rgb::WHITE),
        ]);
        let mut sink = LinkSink::new(Vec::new(), LinkFrame::default());
        send_frame(&mut sink, &cmds, &mut Pacer::unlimited()).expect("in-memory device");
        let out = sink.into_inner();
        assert_eq!(out.len(), 2 * LinkFrame::LEN);
        assert_eq!(&out[14..22], &cmds[0].to_bytes());
        assert_eq!(&out[LinkFrame::LEN + 14..], &cmds[1].to_bytes());
    }

    struct Truncating;

    impl Write for Truncating {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len() / 2)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn partial_write_is_an_error() {
        let cmds = encode_commands(&[ColoredPoint::new(Point::new(1, 1), Rgb::WHITE)]);
        let mut sink = LinkSink::new(Truncating, LinkFrame::default());
        let err = send_frame(&mut sink, &cmds, &mut Pacer::unlimited()).unwrap_err();
        assert!(matches!(
            err,
            TransportError::ShortWrite {
                written: 11,
                expected: 22
            }
        ));
    }
}
