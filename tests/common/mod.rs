#![allow(dead_code)]
use std::collections::VecDeque;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use icmp_probe::icmp::checksum::checksum;
use icmp_probe::icmp::icmpv4::make_icmpv4_echo_packet;
use icmp_probe::{PingIdentifier, PingSequence, Transport};
use parking_lot::Mutex;

/// In-memory transport. Received datagrams come from a queue; an empty
/// queue never yields, like a raw socket with nothing to read.
#[derive(Default)]
pub struct Scripted {
    inbox: Mutex<VecDeque<(Vec<u8>, SocketAddr)>>,
    pub sent: Mutex<Vec<Vec<u8>>>,
    /// Queue our own request and then the peer's reply on every send, which
    /// is what a raw socket sees when probing loopback.
    echo: bool,
    fail_send: bool,
    fail_recv: bool,
}

impl Scripted {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn loopback() -> Self {
        Self {
            echo: true,
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_send: true,
            ..Default::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            fail_recv: true,
            ..Default::default()
        }
    }

    pub fn push(&self, from: Ipv4Addr, datagram: Vec<u8>) {
        self.inbox
            .lock()
            .push_back((datagram, SocketAddr::new(IpAddr::V4(from), 0)));
    }
}

impl Transport for Scripted {
    async fn send_to(&self, buf: &[u8], target: &SocketAddr) -> io::Result<usize> {
        if self.fail_send {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "Network is unreachable",
            ));
        }
        self.sent.lock().push(buf.to_vec());
        if self.echo {
            if let IpAddr::V4(peer) = target.ip() {
                self.push(peer, ipv4_wrap(peer, buf));
                self.push(peer, ipv4_wrap(peer, &into_reply(buf.to_vec())));
            }
        }
        Ok(buf.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        if self.fail_recv {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "Connection refused",
            ));
        }
        let next = self.inbox.lock().pop_front();
        match next {
            Some((datagram, from)) => {
                buf[..datagram.len()].copy_from_slice(&datagram);
                Ok((datagram.len(), from))
            }
            None => std::future::pending().await,
        }
    }
}

/// Prepends a 20 byte IPv4 header.
pub fn ipv4_wrap(source: Ipv4Addr, icmp: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 20];
    buf[0] = 0x45;
    buf[2..4].copy_from_slice(&((20 + icmp.len()) as u16).to_be_bytes());
    buf[8] = 64;
    buf[9] = 1;
    buf[12..16].copy_from_slice(&source.octets());
    buf[16..20].copy_from_slice(&Ipv4Addr::LOCALHOST.octets());
    buf.extend_from_slice(icmp);
    buf
}

/// Turns an echo request into the reply a peer would send back.
pub fn into_reply(mut icmp: Vec<u8>) -> Vec<u8> {
    icmp[0] = 0;
    icmp[2..4].copy_from_slice(&[0, 0]);
    let sum = checksum(&icmp);
    icmp[2..4].copy_from_slice(&sum.to_be_bytes());
    icmp
}

/// A full datagram carrying an echo reply.
pub fn echo_reply(source: Ipv4Addr, ident: u16, seq: u16, timestamp: f64) -> Vec<u8> {
    let request =
        make_icmpv4_echo_packet(PingIdentifier(ident), PingSequence(seq), timestamp);
    ipv4_wrap(source, &into_reply(request))
}
