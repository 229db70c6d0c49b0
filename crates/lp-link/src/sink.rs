use std::thread;
use std::time::{Duration, Instant};

use lp_encode::Command;
use tracing::{debug, warn};

use crate::error::TransportError;

/// Destination for individual galvo commands. One call sends one packet.
pub trait CommandSink {
    fn send(&mut self, command: &Command) -> Result<(), TransportError>;
}

impl<S: CommandSink + ?Sized> CommandSink for &mut S {
    fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        (**self).send(command)
    }
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        (**self).send(command)
    }
}

/// Collects commands in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub sent: Vec<Command>,
}

impl CommandSink for RecordingSink {
    fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        self.sent.push(*command);
        Ok(())
    }
}

/// Spaces packets to at most `rate` per second. `None` sends back to back.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Option<Duration>,
    next: Option<Instant>,
}

impl Pacer {
    pub fn new(rate: Option<u32>) -> Self {
        let interval = rate
            .filter(|&r| r > 0)
            .map(|r| Duration::from_nanos(1_000_000_000 / u64::from(r)));
        Self {
            interval,
            next: None,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Blocks until the next packet slot is open.
    pub fn wait(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        let now = Instant::now();
        if let Some(next) = self.next
            && next > now
        {
            thread::sleep(next - now);
        }
        // Slots are scheduled from the later of "now" and the previous slot,
        // so a stall does not cause a burst afterwards.
        let base = self.next.map_or(now, |n| n.max(now));
        self.next = Some(base + interval);
    }
}

/// Sends one frame in order, pacing every packet. Stops at the first failed
/// packet and returns its error; the rest of the frame is dropped.
/// Returns the number of packets sent.
pub fn send_frame<S: CommandSink + ?Sized>(
    sink: &mut S,
    commands: &[Command],
    pacer: &mut Pacer,
) -> Result<usize, TransportError> {
    for (i, c) in commands.iter().enumerate() {
        pacer.wait();
        if let Err(e) = sink.send(c) {
            warn!(sent = i, total = commands.len(), error = %e, "frame aborted");
            return Err(e);
        }
    }
    debug!(packets = commands.len(), "frame sent");
    Ok(commands.len())
}
