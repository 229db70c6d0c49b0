//! Delivery of encoded frames to the galvo controller.
//!
//! Every [`Command`](lp_encode::Command) travels as its own packet, in
//! trajectory order. Delivery is fire-and-forget: no acknowledgements and no
//! retransmission. [`send_frame`] paces packets with a [`Pacer`] and stops a
//! frame at the first failure; callers move on to the next frame.
//!
//! Sinks: [`UdpSink`] (datagram payload = the 8 command bytes) and
//! [`LinkSink`] (Ethernet II frames). A [`LinkSink`] writes to any
//! packet-oriented handle; [`InterfaceSink`] is the one bound to a network
//! interface.

mod error;
mod iface;
mod link;
mod sink;
mod udp;

pub use error::TransportError;
pub use iface::{InterfaceSink, InterfaceWriter};
pub use link::{DEFAULT_DST, DEFAULT_ETHERTYPE, DEFAULT_SRC, LinkFrame, LinkSink, MacAddr};
pub use sink::{CommandSink, Pacer, RecordingSink, send_frame};
pub use udp::UdpSink;
