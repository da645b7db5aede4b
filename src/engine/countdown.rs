/// What a single countdown tick produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownSignal {
    Running,
    NearExpiry,
    Expired,
}

/// Repeating round timer. Each cycle counts `duration` seconds down to zero,
/// warns once at `warn_at` seconds left, then starts over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    warn_at: u32,
    remaining: u32,
    total_elapsed: u32,
    warning_sent: bool,
}

impl Countdown {
    pub fn new(duration: u32, warn_at: u32) -> Self {
        let duration = duration.max(1);
        Countdown {
            duration,
            warn_at: warn_at.min(duration - 1),
            remaining: duration,
            total_elapsed: 0,
            warning_sent: false,
        }
    }

    /// Advances one second.
    pub fn tick(&mut self) -> CountdownSignal {
        self.remaining = self.remaining.saturating_sub(1);
        self.total_elapsed = self.total_elapsed.saturating_add(1);

        if self.remaining == 0 {
            self.reset_cycle();
            return CountdownSignal::Expired;
        }
        if self.remaining == self.warn_at && !self.warning_sent {
            self.warning_sent = true;
            return CountdownSignal::NearExpiry;
        }
        CountdownSignal::Running
    }

    fn reset_cycle(&mut self) {
        self.remaining = self.duration;
        self.warning_sent = false;
    }

    /// Back to a full cycle. Total elapsed time is kept.
    pub fn stop(&mut self) {
        self.reset_cycle();
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn total_elapsed(&self) -> u32 {
        self.total_elapsed
    }

    pub fn is_warning(&self) -> bool {
        self.warning_sent
    }

    /// Share of the current cycle already used, in `0.0..=1.0`.
    pub fn fraction_elapsed(&self) -> f64 {
        f64::from(self.duration - self.remaining) / f64::from(self.duration)
    }
}
