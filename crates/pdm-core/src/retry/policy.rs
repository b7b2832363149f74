use rand::Rng;
use std::time::Duration;

/// High-level classification of an error for retry purposes.
///
/// Transports map curl errors, server statuses or local failures into these
/// kinds; only the transient ones are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect, read, session or channel timeout.
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Could not reach or set up a session with the peer.
    Connection,
    /// Stream broke or arrived malformed mid-transfer.
    Stream,
    /// Server status that is retryable but not strictly throttling (5xx).
    Status5xx(u16),
    /// Anything else (not retried).
    Other,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// How the computed backoff is randomized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    None,
    /// Wait a uniformly random duration in `[0, delay]`.
    Uniform,
}

/// Exponential backoff with a delay cap and a retry ceiling.
///
/// Shared read-only by every task of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Base delay; retry `n` waits up to `base_delay * multiplier^n`.
    pub base_delay: Duration,
    pub multiplier: f64,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
    /// Retries after the first attempt; a task gets at most `max_retries + 1` attempts.
    pub max_retries: u32,
    pub jitter: Jitter,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(250),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            max_retries: 3,
            jitter: Jitter::Uniform,
        }
    }
}

impl RetryPolicy {
    /// Un-jittered delay before retry `retry` (1 = first retry):
    /// `min(max_delay, base_delay * multiplier^retry)`. A multiplier below 1
    /// counts as 1, so delays never shrink.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = i32::try_from(retry).unwrap_or(i32::MAX);
        let raw = self.base_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exp);
        if !raw.is_finite() || raw >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(raw.max(0.0))
        }
    }

    /// Apply the jitter strategy to a computed delay.
    pub fn jittered(&self, delay: Duration) -> Duration {
        match self.jitter {
            Jitter::None => delay,
            Jitter::Uniform => delay.mul_f64(rand::thread_rng().gen_range(0.0..=1.0)),
        }
    }

    /// Decide what to do after attempt number `failed_attempt` (1-based) failed
    /// with an error of `kind`.
    pub fn decide(&self, failed_attempt: u32, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() || failed_attempt > self.max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.jittered(self.backoff(failed_attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(1),
            max_retries: 20,
            jitter: Jitter::None,
        }
    }

    #[test]
    fn no_retry_for_other() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Other), RetryDecision::NoRetry);
    }

    #[test]
    fn first_retry_uses_multiplier_once() {
        let p = fixed();
        assert_eq!(p.backoff(1), Duration::from_millis(200));
        assert_eq!(p.backoff(2), Duration::from_millis(400));
        assert_eq!(
            p.decide(1, ErrorKind::Timeout),
            RetryDecision::RetryAfter(Duration::from_millis(200))
        );
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let p = fixed();
        let mut prev = Duration::ZERO;
        for n in 1..=20 {
            let d = p.backoff(n);
            assert!(d >= prev, "retry {n}: {d:?} < {prev:?}");
            assert!(d <= p.max_delay);
            prev = d;
        }
        assert_eq!(p.backoff(10), p.max_delay);
        assert_eq!(p.backoff(u32::MAX), p.max_delay);
    }

    #[test]
    fn uniform_jitter_stays_within_delay() {
        let p = RetryPolicy {
            jitter: Jitter::Uniform,
            ..fixed()
        };
        for n in 1..=8 {
            let ceiling = p.backoff(n);
            for _ in 0..50 {
                match p.decide(n, ErrorKind::Connection) {
                    RetryDecision::RetryAfter(d) => assert!(d <= ceiling),
                    RetryDecision::NoRetry => panic!("expected retry"),
                }
            }
        }
    }

    #[test]
    fn respects_max_retries() {
        let p = RetryPolicy {
            max_retries: 2,
            ..fixed()
        };
        assert!(matches!(
            p.decide(1, ErrorKind::Throttled),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, ErrorKind::Stream),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Throttled), RetryDecision::NoRetry);
    }

    #[test]
    fn multiplier_below_one_never_shrinks_delays() {
        let p = RetryPolicy {
            base_delay: Duration::from_millis(1000),
            multiplier: 0.5,
            max_delay: Duration::from_secs(10),
            ..fixed()
        };
        assert_eq!(p.backoff(1), Duration::from_secs(1));
        assert_eq!(p.backoff(3), Duration::from_secs(1));
    }

    #[test]
    fn zero_retries_never_retries() {
        let p = RetryPolicy {
            max_retries: 0,
            ..fixed()
        };
        assert_eq!(p.decide(1, ErrorKind::Timeout), RetryDecision::NoRetry);
    }
}
