use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use lp_encode::Command;
use tracing::debug;

use crate::error::TransportError;
use crate::sink::CommandSink;

/// One datagram per command, payload = the 8 command bytes.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpSink {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let peer = addr.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "no address resolved")
        })?;
        let bind: SocketAddr = if peer.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind)?;
        socket.connect(peer)?;
        debug!(%peer, local = ?socket.local_addr().ok(), "udp sink connected");
        Ok(Self { socket, peer })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl CommandSink for UdpSink {
    fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        let bytes = command.to_bytes();
        let written = self.socket.send(&bytes)?;
        if written != bytes.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }
        Ok(())
    }
}
