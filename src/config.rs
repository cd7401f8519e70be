use std::{net::SocketAddr, time::Duration};

use socket2::SockAddr;

use crate::icmp::PingIdentifier;

/// Which inbound echo replies a session accepts as its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Any echo reply carrying the session identifier, including late replies
    /// to earlier sequences.
    #[default]
    Identifier,
    /// The identifier and the most recently sent sequence must both match.
    IdentifierAndSequence,
}

/// Config is the packaging of the probe schedule and the `socket` options. If you
/// want to make some `set_socket_opt` and other modifications, please define and
/// implement them in `Config`.
#[derive(Debug)]
pub struct Config {
    pub interval: Duration,
    pub timeout: Duration,
    pub ident: Option<PingIdentifier>,
    pub match_policy: MatchPolicy,
    pub bind: Option<SockAddr>,
    pub interface: Option<String>,
    pub ttl: Option<u32>,
}

/// One probe per second.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Three seconds plus 100 milliseconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3100);

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            ident: None,
            match_policy: MatchPolicy::default(),
            bind: None,
            interface: None,
            ttl: None,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Time between two probes. (default: 1s, raised to 1ms if shorter)
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// How long to wait for a reply after each probe. (default: 3.1s)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// The ICMP identifier stamped on every request. (default: process id)
    pub fn ident(mut self, ident: PingIdentifier) -> Self {
        self.config.ident = Some(ident);
        self
    }

    pub fn match_policy(mut self, policy: MatchPolicy) -> Self {
        self.config.match_policy = policy;
        self
    }

    /// Binds this socket to the specified address.
    ///
    /// This function directly corresponds to the `bind(2)` function on Windows
    /// and Unix.
    pub fn bind(mut self, bind: SocketAddr) -> Self {
        self.config.bind = Some(SockAddr::from(bind));
        self
    }

    /// Sets the value for the `SO_BINDTODEVICE` option on this socket.
    ///
    /// Only honoured on Linux, Android and Fuchsia.
    pub fn interface(mut self, interface: &str) -> Self {
        self.config.interface = Some(interface.to_string());
        self
    }

    /// Set the value of the `IP_TTL` option for this socket.
    pub fn ttl(mut self, ttl: u32) -> Self {
        self.config.ttl = Some(ttl);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_millis(3100));
        assert_eq!(config.ident, None);
        assert_eq!(config.match_policy, MatchPolicy::Identifier);
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .ident(PingIdentifier(1234))
            .timeout(Duration::from_millis(250))
            .match_policy(MatchPolicy::IdentifierAndSequence)
            .ttl(64)
            .bind("0.0.0.0:0".parse().unwrap())
            .interface("lo")
            .build();
        assert_eq!(config.ident, Some(PingIdentifier(1234)));
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.match_policy, MatchPolicy::IdentifierAndSequence);
        assert_eq!(config.ttl, Some(64));
        assert!(config.bind.is_some());
        assert_eq!(config.interface.as_deref(), Some("lo"));
        assert_eq!(config.interval, DEFAULT_INTERVAL);
    }
}
