use std::{fmt, net::Ipv4Addr, time::Duration};

/// Running totals for one probed host.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub host: Ipv4Addr,
    pub transmitted: usize,
    pub received: usize,
    durations: Vec<Duration>,
}

impl Statistics {
    pub fn new(host: Ipv4Addr) -> Statistics {
        Statistics {
            host,
            transmitted: 0,
            received: 0,
            durations: Vec::new(),
        }
    }

    pub fn on_transmit(&mut self) {
        self.transmitted += 1;
    }

    pub fn on_reply(&mut self, rtt: Duration) {
        self.received += 1;
        self.durations.push(rtt);
    }

    /// Percentage of transmitted probes without a reply.
    ///
    /// Late replies to failed sends can push `received` past `transmitted`;
    /// the result never drops below zero.
    pub fn loss(&self) -> f64 {
        if self.transmitted == 0 {
            return 0.0;
        }
        let lost = self.transmitted.saturating_sub(self.received);
        lost as f64 / self.transmitted as f64 * 100_f64
    }

    pub fn min(&self) -> Option<f64> {
        self.durations.iter().min().map(as_millis)
    }

    pub fn max(&self) -> Option<f64> {
        self.durations.iter().max().map(as_millis)
    }

    pub fn avg(&self) -> Option<f64> {
        let sum: Duration = self.durations.iter().sum();
        sum.checked_div(self.durations.len() as u32)
            .map(|dur| as_millis(&dur))
    }

    pub fn mdev(&self) -> Option<f64> {
        let avg = self.avg()?;
        let squares = self
            .durations
            .iter()
            .fold(0_f64, |acc, x| acc + as_millis(x) * as_millis(x));
        let variance = squares / self.durations.len() as f64 - avg * avg;
        Some(variance.max(0.0).sqrt())
    }
}

fn as_millis(dur: &Duration) -> f64 {
    dur.as_secs_f64() * 1000f64
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ping statistics ---", self.host)?;
        write!(
            f,
            "{} packets transmitted, {} packets received, {:.2}% packet loss",
            self.transmitted,
            self.received,
            self.loss()
        )?;
        if let (Some(min), Some(avg), Some(max), Some(mdev)) =
            (self.min(), self.avg(), self.max(), self.mdev())
        {
            write!(
                f,
                "\nround-trip min/avg/max/stddev = {:.3}/{:.3}/{:.3}/{:.3} ms",
                min, avg, max, mdev
            )?;
        }
        Ok(())
    }
}
