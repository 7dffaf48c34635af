//! Trailing-edge debounce for stroke events.
//!
//! The state machine does not own a timer. Hosts with real timers (the
//! browser's `setTimeout`) schedule a callback for the returned
//! [`DebounceTicket`] and call [`Debouncer::fire`] with its generation; hosts
//! that run a loop call [`Debouncer::poll`] instead. Both paths fire at most
//! once per quiet period.

use tracing::debug;

use crate::time::{Duration, Instant};

/// Handed back by [`Debouncer::trigger`]; the host's timer should call
/// [`Debouncer::fire`] with `generation` after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket {
    pub generation: u64,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    generation: u64,
    due: Instant,
}

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: u64,
    pending: Option<Pending>,
    torn_down: bool,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: 0,
            pending: None,
            torn_down: false,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Restarts the quiet period at `now`, superseding any pending action.
    ///
    /// Returns `None` after [`teardown`](Debouncer::teardown).
    pub fn trigger(&mut self, now: Instant) -> Option<DebounceTicket> {
        if self.torn_down {
            return None;
        }
        self.generation += 1;
        self.pending = Some(Pending {
            generation: self.generation,
            due: now + self.quiet,
        });
        Some(DebounceTicket {
            generation: self.generation,
            delay: self.quiet,
        })
    }

    /// Timer-host path. True only for the latest pending generation.
    pub fn fire(&mut self, generation: u64) -> bool {
        match self.pending {
            Some(p) if p.generation == generation => {
                self.pending = None;
                debug!(generation, "debounce fired");
                true
            }
            _ => false,
        }
    }

    /// Polling-host path. True once the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if now >= p.due => self.fire(p.generation),
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Cancels the pending action and ignores every later trigger.
    pub fn teardown(&mut self) {
        self.cancel();
        self.torn_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_within_quiet_interval_fires_once_after_last_trigger() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(500));

        for i in 0..5u64 {
            d.trigger(t0 + ms(i * 100));
        }
        let last = t0 + ms(400);
        assert_eq!(d.deadline(), Some(last + ms(500)));

        assert!(!d.poll(t0 + ms(500)));
        assert!(!d.poll(last + ms(499)));
        assert!(d.poll(last + ms(500)));
        assert!(!d.poll(last + ms(5_000)));
    }

    #[test]
    fn superseded_timer_callbacks_do_nothing() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(500));
        let a = d.trigger(t0).unwrap();
        let b = d.trigger(t0 + ms(100)).unwrap();
        let c = d.trigger(t0 + ms(200)).unwrap();
        assert!(a.generation < b.generation && b.generation < c.generation);
        assert_eq!(c.delay, ms(500));

        assert!(!d.fire(a.generation));
        assert!(!d.fire(b.generation));
        assert!(d.fire(c.generation));
        assert!(!d.fire(c.generation));
    }

    #[test]
    fn separate_quiet_periods_fire_separately() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(500));
        d.trigger(t0);
        assert!(d.poll(t0 + ms(600)));
        d.trigger(t0 + ms(700));
        assert!(d.poll(t0 + ms(1_200)));
    }

    #[test]
    fn teardown_prevents_pending_and_future_fires() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(500));
        let ticket = d.trigger(t0).unwrap();
        d.teardown();

        assert!(!d.fire(ticket.generation));
        assert!(!d.poll(t0 + ms(10_000)));
        assert!(d.trigger(t0 + ms(1)).is_none());
        assert!(!d.is_pending());
    }
}
