use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use icmp_probe::{Config, Outcome, PingIdentifier, PingSequence, ProbeError, ProbeSession};

// Raw sockets need CAP_NET_RAW. Without it session creation fails and the
// tests below have nothing to exercise.
fn open(config: &Config) -> Option<ProbeSession> {
    match ProbeSession::new(Ipv4Addr::LOCALHOST, config) {
        Ok(session) => Some(session),
        Err(ProbeError::Setup(e)) => {
            if e.kind() != io::ErrorKind::PermissionDenied {
                println!("raw socket setup failed (acceptable on some systems): {:?}", e);
            }
            None
        }
        Err(e) => panic!("Unexpected error: {:?}", e),
    }
}

#[tokio::test]
async fn test_session_creation() {
    let config = Config::builder().ident(PingIdentifier(42)).build();
    if let Some(session) = open(&config) {
        assert_eq!(session.host, Ipv4Addr::LOCALHOST);
        assert_eq!(session.ident, PingIdentifier(42));
        assert_eq!(session.next_sequence(), PingSequence(1));
        assert!(session.get_ref().local_addr().is_ok());
    }
}

#[tokio::test]
async fn test_session_with_ttl() {
    let config = Config::builder().ttl(64).build();
    if let Some(session) = open(&config) {
        assert_eq!(session.get_ref().ttl().unwrap(), 64);
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_session_bound_to_interface() {
    let config = Config::builder().interface("lo").build();
    if let Some(session) = open(&config) {
        assert_eq!(session.get_ref().device().unwrap(), Some(b"lo".to_vec()));
    }
}

#[tokio::test]
async fn test_probe_localhost() {
    let config = Config::builder()
        .ident(PingIdentifier(1234))
        .timeout(Duration::from_secs(1))
        .build();
    let mut session = match open(&config) {
        Some(session) => session,
        None => return,
    };

    let seq = session.send().await.unwrap();
    assert_eq!(seq, PingSequence(1));

    // Our own request shows up on loopback before the kernel's reply.
    for _ in 0..8 {
        match session.receive().await {
            Ok(Outcome::Reply { reply, rtt }) => {
                assert_eq!(reply.identifier, PingIdentifier(1234));
                assert_eq!(reply.sequence, seq);
                assert!(rtt < Duration::from_secs(1));
                return;
            }
            Ok(Outcome::Ignored) | Ok(Outcome::Malformed(_)) => continue,
            // Acceptable on hosts that drop ICMP echo.
            Ok(Outcome::NoReply) => return,
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }
}
