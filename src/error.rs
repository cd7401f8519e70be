use std::io;

use thiserror::Error;

use crate::icmp::PingSequence;

pub type Result<T> = std::result::Result<T, ProbeError>;

/// An error resulting from a socket setup or send/receive operation.
///
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("socket setup error: {0}")]
    Setup(#[source] io::Error),
    #[error("send icmp_seq={seq} failed: {source}")]
    Send {
        seq: PingSequence,
        #[source]
        source: io::Error,
    },
    #[error("receive failed: {0}")]
    Recv(#[source] io::Error),
    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] MalformedPacketError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedPacketError {
    #[error("expected an Ipv4Packet")]
    NotIpv4Packet,
    #[error("ipv4 header length {0} is below the 20 byte minimum")]
    BadHeaderLength(usize),
    #[error("got {len} bytes, need at least {need}")]
    Truncated { len: usize, need: usize },
}
