//! ICMPv4 echo wire format.
//!
//! Requests are 24 bytes on the wire:
//!
//! | offset | field      | size | encoding                          |
//! |--------|------------|------|-----------------------------------|
//! | 0      | type       | 1    | 8 for a request, 0 for a reply    |
//! | 1      | code       | 1    | 0                                 |
//! | 2      | checksum   | 2    | big-endian, RFC 1071              |
//! | 4      | identifier | 2    | big-endian                        |
//! | 6      | sequence   | 2    | big-endian                        |
//! | 8      | timestamp  | 8    | `f64` seconds, native byte order  |
//! | 16     | filler     | 6    | `"12345"` followed by NUL          |
//! | 22     | padding    | 2    | zero                              |
//!
//! The timestamp is not a standard ICMP field. It lives in the echo payload,
//! which the peer returns verbatim, so the round-trip time can be computed
//! from the reply alone. Peers in another language must write the same
//! native-order `f64` at offset 8 to interoperate.
use std::net::Ipv4Addr;

use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmp::{IcmpCode, IcmpType, IcmpTypes};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;

use super::checksum::checksum;
use super::{PingIdentifier, PingSequence};
use crate::error::MalformedPacketError;

pub const ICMP_HEADER_SIZE: usize = 8;
pub const TIMESTAMP_SIZE: usize = 8;
pub const FILLER: &[u8] = b"12345";
pub const FILLER_SIZE: usize = 6;
pub const ECHO_REQUEST_SIZE: usize = 24;
pub const MIN_IPV4_HEADER_SIZE: usize = 20;
/// Header plus timestamp; anything shorter cannot be timed.
pub const MIN_ECHO_REPLY_SIZE: usize = ICMP_HEADER_SIZE + TIMESTAMP_SIZE;

pub fn make_icmpv4_echo_packet(
    ident: PingIdentifier,
    seq_cnt: PingSequence,
    timestamp: f64,
) -> Vec<u8> {
    let mut buf = vec![0u8; ECHO_REQUEST_SIZE];
    buf[0] = IcmpTypes::EchoRequest.0;
    buf[4..6].copy_from_slice(&ident.into_u16().to_be_bytes());
    buf[6..8].copy_from_slice(&seq_cnt.into_u16().to_be_bytes());
    let payload = &mut buf[ICMP_HEADER_SIZE..];
    payload[..TIMESTAMP_SIZE].copy_from_slice(&timestamp.to_ne_bytes());
    payload[TIMESTAMP_SIZE..TIMESTAMP_SIZE + FILLER.len()].copy_from_slice(FILLER);

    // The checksum field is still zero here.
    let sum = checksum(&buf);
    buf[2..4].copy_from_slice(&sum.to_be_bytes());
    buf
}

/// An ICMP echo message read off a raw IPv4 socket.
#[derive(Debug, Clone)]
pub struct EchoReply {
    pub source: Ipv4Addr,
    pub icmp_type: IcmpType,
    pub icmp_code: IcmpCode,
    pub checksum: u16,
    pub identifier: PingIdentifier,
    pub sequence: PingSequence,
    pub timestamp: f64,
    pub size: usize,
}

impl EchoReply {
    /// Parses `buf`, which starts with the IPv4 header.
    ///
    /// The header length is taken from the IHL field, so headers carrying
    /// options are skipped correctly.
    pub fn decode(source: Ipv4Addr, buf: &[u8]) -> std::result::Result<Self, MalformedPacketError> {
        let ipv4_packet = Ipv4Packet::new(buf).ok_or(MalformedPacketError::Truncated {
            len: buf.len(),
            need: MIN_IPV4_HEADER_SIZE + MIN_ECHO_REPLY_SIZE,
        })?;
        // A raw AF_INET socket only delivers IPv4; this guards hand-built buffers.
        if ipv4_packet.get_version() != 4 {
            return Err(MalformedPacketError::NotIpv4Packet);
        }
        let header_len = usize::from(ipv4_packet.get_header_length()) * 4;
        if header_len < MIN_IPV4_HEADER_SIZE {
            return Err(MalformedPacketError::BadHeaderLength(header_len));
        }
        let need = header_len + MIN_ECHO_REPLY_SIZE;
        if buf.len() < need {
            return Err(MalformedPacketError::Truncated {
                len: buf.len(),
                need,
            });
        }

        // Slice by IHL rather than `payload()`: some kernels rewrite the total
        // length field of packets handed to raw sockets.
        let icmp = &buf[header_len..];
        let echo = EchoReplyPacket::new(icmp).ok_or(MalformedPacketError::Truncated {
            len: buf.len(),
            need,
        })?;
        let timestamp = echo
            .payload()
            .get(..TIMESTAMP_SIZE)
            .and_then(|bytes| bytes.try_into().ok())
            .map(f64::from_ne_bytes)
            .ok_or(MalformedPacketError::Truncated {
                len: buf.len(),
                need,
            })?;

        Ok(EchoReply {
            source,
            icmp_type: echo.get_icmp_type(),
            icmp_code: echo.get_icmp_code(),
            checksum: echo.get_checksum(),
            identifier: PingIdentifier(echo.get_identifier()),
            sequence: PingSequence(echo.get_sequence_number()),
            timestamp,
            size: icmp.len(),
        })
    }

    /// Type 0, code 0.
    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == IcmpTypes::EchoReply && self.icmp_code == IcmpCode::new(0)
    }
}

/// How an inbound datagram relates to a session.
#[derive(Debug)]
pub enum Classified {
    /// An echo reply carrying the session's identifier.
    Matched(EchoReply),
    /// Well-formed, but another message type or another sender's identifier.
    NotMatched(EchoReply),
    Malformed(MalformedPacketError),
}

pub fn classify(source: Ipv4Addr, buf: &[u8], ident: PingIdentifier) -> Classified {
    match EchoReply::decode(source, buf) {
        Ok(reply) if reply.is_echo_reply() && reply.identifier == ident => {
            Classified::Matched(reply)
        }
        Ok(reply) => Classified::NotMatched(reply),
        Err(err) => Classified::Malformed(err),
    }
}

#[cfg(test)]
pub(crate) fn ipv4_wrap(header_len: usize, source: Ipv4Addr, icmp: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; header_len];
    buf[0] = 0x40 | (header_len / 4) as u8;
    buf[2..4].copy_from_slice(&((header_len + icmp.len()) as u16).to_be_bytes());
    buf[8] = 64;
    buf[9] = 1;
    buf[12..16].copy_from_slice(&source.octets());
    buf[16..20].copy_from_slice(&Ipv4Addr::LOCALHOST.octets());
    buf.extend_from_slice(icmp);
    buf
}
