mod config;
mod error;
pub mod icmp;
pub mod scheduler;
mod session;
mod socket;
mod stats;

pub use config::{Config, ConfigBuilder, MatchPolicy, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
pub use error::{MalformedPacketError, ProbeError, Result};
pub use icmp::icmpv4::{Classified, EchoReply};
pub use icmp::{PingIdentifier, PingSequence};
pub use session::{Outcome, ProbeSession};
pub use socket::{AsyncSocket, Transport};
pub use stats::Statistics;
