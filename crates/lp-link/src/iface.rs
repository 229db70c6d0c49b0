//! Ethernet frames sent through a named network interface (`AF_PACKET` on
//! Linux). Opening the channel needs raw-socket privileges.

use std::fmt;
use std::io::{self, Write};

use pnet_datalink::{Channel, DataLinkSender};
use tracing::debug;

use crate::error::TransportError;
use crate::link::{LinkFrame, LinkSink};

/// Transmit half of a datalink channel, one frame per `write`.
pub struct InterfaceWriter {
    name: String,
    tx: Box<dyn DataLinkSender>,
}

impl InterfaceWriter {
    pub fn open(name: &str) -> Result<Self, TransportError> {
        let iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| TransportError::InterfaceNotFound(name.to_owned()))?;

        let tx = match pnet_datalink::channel(&iface, Default::default()) {
            Ok(Channel::Ethernet(tx, _rx)) => tx,
            Ok(_) => return Err(TransportError::UnsupportedChannel(name.to_owned())),
            Err(e) => return Err(e.into()),
        };
        debug!(interface = name, mac = ?iface.mac, "datalink channel open");

        Ok(Self {
            name: name.to_owned(),
            tx,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for InterfaceWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceWriter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Write for InterfaceWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.tx.send_to(buf, None) {
            Some(Ok(())) => Ok(buf.len()),
            Some(Err(e)) => Err(e),
            None => Err(io::Error::other("datalink send buffer unavailable")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub type InterfaceSink = LinkSink<InterfaceWriter>;

impl LinkSink<InterfaceWriter> {
    /// Opens `interface` and sends every command as one Ethernet II frame
    /// with the `frame` header.
    pub fn open_interface(interface: &str, frame: LinkFrame) -> Result<Self, TransportError> {
        Ok(Self::new(InterfaceWriter::open(interface)?, frame))
    }
}

#[cfg(test)]
mod tests {
    use super::InterfaceWriter;
    use crate::error::TransportError;
    use crate::link::{LinkFrame, LinkSink};

    #[test]
    fn unknown_interface_is_reported_by_name() {
        let err = InterfaceWriter::open("lp-no-such-if0").unwrap_err();
        assert!(
            matches!(&err, TransportError::InterfaceNotFound(name) if name == "lp-no-such-if0"),
            "{err}"
        );
        assert!(LinkSink::open_interface("lp-no-such-if0", LinkFrame::default()).is_err());
    }
}
