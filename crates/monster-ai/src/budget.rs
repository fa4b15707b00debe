//! Explicit latency budgets passed into every search.
//!
//! Searches never read a global clock policy: callers derive a [`Deadline`]
//! from the tick budget and hand it down. On expiry a search returns its best
//! result so far and reports that it was cut short.
use std::time::{Duration, Instant};

/// Point in time after which a search must stop expanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub const fn none() -> Self {
        Self { at: None }
    }

    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    pub fn after(budget: Duration) -> Self {
        Self::at(Instant::now() + budget)
    }

    /// A deadline that has already passed.
    pub fn expired() -> Self {
        Self::at(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Time left, or `None` for an unbounded deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// The earlier of this deadline and `budget` from now.
    pub fn min_budget(self, budget: Duration) -> Self {
        let candidate = Instant::now() + budget;
        match self.at {
            Some(at) if at <= candidate => self,
            _ => Self::at(candidate),
        }
    }

    /// A sub-deadline covering `share` (0..=1) of the remaining time.
    pub fn share(self, share: f64) -> Self {
        match self.remaining() {
            Some(left) => Self::after(left.mul_f64(share.clamp(0.0, 1.0))),
            None => self,
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_deadline_never_expires() {
        let deadline = Deadline::none();
        assert!(!deadline.is_expired());
        assert_eq!(deadline.remaining(), None);
        assert_eq!(deadline.share(0.5), deadline);
    }

    #[test]
    fn expired_deadline_reports_zero_remaining() {
        let deadline = Deadline::expired();
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn min_budget_keeps_earlier_instant() {
        let tight = Deadline::expired();
        assert_eq!(tight.min_budget(Duration::from_secs(60)), tight);
        let loose = Deadline::none().min_budget(Duration::from_secs(60));
        assert!(!loose.is_expired());
    }
}
