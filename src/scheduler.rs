use std::time::Duration;

use tokio::{
    sync::broadcast,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    session::{Outcome, ProbeSession},
    socket::Transport,
    stats::Statistics,
};

/// Shortest accepted send interval. Smaller values, zero included, are raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Probes `session` once per `interval` until `shutdown` fires or its sender
/// is dropped.
///
/// Ticks are scheduled relative to the previous tick, not to the end of the
/// previous probe, so processing time does not accumulate as drift. A probe
/// that overruns the interval is followed immediately by the missed ones.
///
/// `report` sees the final outcome of every probe: a matched reply or
/// [`Outcome::NoReply`]. Send and receive errors are logged and the loop
/// carries on.
pub async fn run<T, F>(
    session: &mut ProbeSession<T>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
    mut report: F,
) -> Statistics
where
    T: Transport,
    F: FnMut(&Outcome),
{
    let mut stats = Statistics::new(session.host);
    let mut ticker = time::interval(interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            outcome = probe(session, &mut stats) => {
                if let Some(outcome) = outcome {
                    report(&outcome);
                }
            }
        }
    }
    debug!("probing {} stopped", session.host);
    stats
}

/// One send followed by receives until a reply arrives or the wait window
/// closes. Datagrams that are not ours do not end the window.
async fn probe<T: Transport>(
    session: &mut ProbeSession<T>,
    stats: &mut Statistics,
) -> Option<Outcome> {
    match session.send().await {
        Ok(_) => stats.on_transmit(),
        Err(err) => warn!("{}", err),
    }

    let deadline = Instant::now() + session.get_timeout();
    loop {
        let window = deadline.saturating_duration_since(Instant::now());
        match session.receive_within(window).await {
            Ok(Outcome::Reply { reply, rtt }) => {
                stats.on_reply(rtt);
                return Some(Outcome::Reply { reply, rtt });
            }
            Ok(Outcome::NoReply) => return Some(Outcome::NoReply),
            Ok(Outcome::Ignored) | Ok(Outcome::Malformed(_)) => {
                if Instant::now() >= deadline {
                    return Some(Outcome::NoReply);
                }
            }
            Err(err) => {
                warn!("{}", err);
                return None;
            }
        }
    }
}
