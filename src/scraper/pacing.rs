//! Request pacing
//!
//! The pacer bounds the request rate against the source site with a fixed
//! inter-request delay. It is a politeness measure, not a performance knob;
//! traversal must not bypass it.

use std::time::{Duration, Instant};

/// Enforces a minimum delay between consecutive requests
///
/// One pacer covers one request stream. The baseline design runs a single
/// sequential stream; a parallel implementation would own one pacer per
/// category stream.
#[derive(Debug)]
pub struct Pacer {
    min_delay: Duration,
    last_request: Option<Instant>,
}

impl Pacer {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: None,
        }
    }

    /// Time still to wait before the next request, if any
    fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.duration_since(last);
        if elapsed < self.min_delay {
            Some(self.min_delay - elapsed)
        } else {
            None
        }
    }

    /// Waits until the delay has passed, then records the request slot
    ///
    /// The first call never waits.
    pub async fn wait_turn(&mut self) {
        if let Some(remaining) = self.time_until_ready(Instant::now()) {
            tokio::time::sleep(remaining).await;
        }
        self.last_request = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_is_not_delayed() {
        let pacer = Pacer::new(Duration::from_millis(100));
        assert_eq!(pacer.time_until_ready(Instant::now()), None);
    }

    #[test]
    fn test_delay_enforced_after_request() {
        let mut pacer = Pacer::new(Duration::from_millis(100));
        let now = Instant::now();
        pacer.last_request = Some(now);

        let remaining = pacer.time_until_ready(now).unwrap();
        assert!(remaining <= Duration::from_millis(100));
        assert!(remaining > Duration::from_millis(50));
    }

    #[test]
    fn test_no_delay_once_elapsed() {
        let mut pacer = Pacer::new(Duration::from_millis(10));
        let now = Instant::now();
        pacer.last_request = Some(now - Duration::from_millis(20));
        assert_eq!(pacer.time_until_ready(now), None);
    }

    #[tokio::test]
    async fn test_wait_turn_spaces_requests() {
        let mut pacer = Pacer::new(Duration::from_millis(20));
        let start = Instant::now();
        pacer.wait_turn().await;
        pacer.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
