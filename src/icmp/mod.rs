use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub mod checksum;
pub mod icmpv4;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PingIdentifier(pub u16);

impl PingIdentifier {
    /// The running process id truncated to 16 bits.
    pub fn from_pid() -> Self {
        Self(std::process::id() as u16)
    }

    pub fn into_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PingIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u16> for PingIdentifier {
    fn from(ident: u16) -> Self {
        Self(ident)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PingSequence(pub u16);

impl PingSequence {
    pub fn into_u16(self) -> u16 {
        self.0
    }

    /// The sequence following this one, wrapping at the 16-bit field width.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for PingSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u16> for PingSequence {
    fn from(seq_cnt: u16) -> Self {
        Self(seq_cnt)
    }
}

/// Wall-clock seconds since the UNIX epoch, as carried in the echo payload.
pub fn timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Time elapsed since `sent`, a value produced by [`timestamp`].
///
/// A timestamp in the future (clock step, forged payload) yields zero.
pub fn elapsed_since(sent: f64) -> Duration {
    Duration::try_from_secs_f64(timestamp() - sent).unwrap_or(Duration::ZERO)
}
