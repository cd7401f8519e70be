use std::{
    fmt, io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use tokio::time::timeout;
use tracing::{debug, trace};

use crate::{
    config::{Config, MatchPolicy},
    error::{MalformedPacketError, ProbeError, Result},
    icmp::{
        elapsed_since,
        icmpv4::{classify, make_icmpv4_echo_packet, Classified, EchoReply},
        timestamp, PingIdentifier, PingSequence,
    },
    socket::{AsyncSocket, Transport},
};

const RECV_BUFFER_SIZE: usize = 2048;

/// Result of one receive attempt.
#[derive(Debug)]
pub enum Outcome {
    /// An echo reply belonging to this session.
    Reply { reply: EchoReply, rtt: Duration },
    /// The wait window elapsed without any datagram.
    NoReply,
    /// A datagram that is not an echo reply for this session.
    Ignored,
    Malformed(MalformedPacketError),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Reply { reply, rtt } => write!(
                f,
                "{} seq={} {:5.2}ms",
                reply.source,
                reply.sequence,
                rtt.as_secs_f64() * 1000f64
            ),
            Outcome::NoReply => f.write_str("no reply"),
            Outcome::Ignored => f.write_str("ignored"),
            Outcome::Malformed(err) => write!(f, "malformed: {}", err),
        }
    }
}

/// A ProbeSession represents the state of probing one particular host.
pub struct ProbeSession<T = AsyncSocket> {
    pub host: Ipv4Addr,
    pub ident: PingIdentifier,
    timeout: Duration,
    match_policy: MatchPolicy,
    socket: T,
    next_sequence: PingSequence,
    last_sequence: Option<PingSequence>,
}

impl ProbeSession<AsyncSocket> {
    /// Opens a raw ICMPv4 socket for `host`.
    pub fn new(host: Ipv4Addr, config: &Config) -> Result<Self> {
        let socket = AsyncSocket::new(config).map_err(ProbeError::Setup)?;
        Ok(Self::with_transport(host, config, socket))
    }
}

impl<T: Transport> ProbeSession<T> {
    pub fn with_transport(host: Ipv4Addr, config: &Config, socket: T) -> Self {
        ProbeSession {
            host,
            ident: config.ident.unwrap_or_else(PingIdentifier::from_pid),
            timeout: config.timeout,
            match_policy: config.match_policy,
            socket,
            next_sequence: PingSequence(1),
            last_sequence: None,
        }
    }

    /// The wait window of each receive. (default: 3.1s)
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    /// The sequence number the next [`send`](Self::send) will use.
    pub fn next_sequence(&self) -> PingSequence {
        self.next_sequence
    }

    /// The sequence number of the last request handed to the transport.
    pub fn last_sequence(&self) -> Option<PingSequence> {
        self.last_sequence
    }

    pub fn get_ref(&self) -> &T {
        &self.socket
    }

    /// Sends one echo request and returns its sequence number.
    ///
    /// The sequence counter advances even when the transport fails.
    pub async fn send(&mut self) -> Result<PingSequence> {
        let seq = self.next_sequence;
        self.next_sequence = seq.next();

        let packet = make_icmpv4_echo_packet(self.ident, seq, timestamp());
        let target = SocketAddr::new(IpAddr::V4(self.host), 0);
        debug!("send icmp_seq={} ident={} to {}", seq, self.ident, self.host);
        self.socket
            .send_to(&packet, &target)
            .await
            .map_err(|source| ProbeError::Send { seq, source })?;
        self.last_sequence = Some(seq);
        Ok(seq)
    }

    /// Reads one datagram, waiting at most the configured timeout.
    pub async fn receive(&mut self) -> Result<Outcome> {
        self.receive_within(self.timeout).await
    }

    /// Reads one datagram, waiting at most `window`.
    pub async fn receive_within(&mut self, window: Duration) -> Result<Outcome> {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let (size, addr) = match timeout(window, self.socket.recv_from(&mut buf)).await {
            Ok(Ok(received)) => received,
            Ok(Err(err)) if is_timeout(&err) => return Ok(Outcome::NoReply),
            Ok(Err(err)) => return Err(ProbeError::Recv(err)),
            Err(_) => {
                debug!("no reply within {:?}", window);
                return Ok(Outcome::NoReply);
            }
        };
        let datagram = &buf[..size];
        let source = match addr.ip() {
            IpAddr::V4(source) => source,
            IpAddr::V6(_) => return Ok(Outcome::Ignored),
        };

        let outcome = match classify(source, datagram, self.ident) {
            Classified::Matched(reply) if self.accepts(&reply) => {
                let rtt = elapsed_since(reply.timestamp);
                Outcome::Reply { reply, rtt }
            }
            Classified::Matched(reply) | Classified::NotMatched(reply) => {
                trace!(
                    "ignore type={:?},code={:?},ident={},src={}: {}",
                    reply.icmp_type,
                    reply.icmp_code,
                    reply.identifier,
                    reply.source,
                    hex::encode(datagram)
                );
                Outcome::Ignored
            }
            Classified::Malformed(err) => {
                trace!("{} from {}: {}", err, source, hex::encode(datagram));
                Outcome::Malformed(err)
            }
        };
        Ok(outcome)
    }

    fn accepts(&self, reply: &EchoReply) -> bool {
        let current = self.last_sequence == Some(reply.sequence);
        match self.match_policy {
            MatchPolicy::IdentifierAndSequence => current,
            MatchPolicy::Identifier => {
                if !current {
                    debug!(
                        "late reply icmp_seq={} accepted, last sent {:?}",
                        reply.sequence, self.last_sequence
                    );
                }
                true
            }
        }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
