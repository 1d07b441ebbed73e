use std::time::Duration;

/// High-level classification of a fetch error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Any other non-2xx status (retried like transport errors).
    Http(u16),
    /// Zero-byte body.
    Empty,
    /// Local or unknown failure (not retried).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff with linear jitter and a cap.
///
/// Delay before attempt `n + 1` is `base * 2^(n-1) + jitter * n`, at most
/// `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Added once per attempt so concurrent workers drift apart.
    pub jitter: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(750),
            jitter: Duration::from_millis(50),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps; useful for tests and local sources.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            jitter: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::Throttled
            | ErrorKind::Http(_)
            | ErrorKind::Empty => {
                let exp = 1u32 << attempt.saturating_sub(1).min(16);
                let raw = self
                    .base_delay
                    .saturating_mul(exp)
                    .saturating_add(self.jitter.saturating_mul(attempt));
                RetryDecision::RetryAfter(raw.min(self.max_delay))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(p: &RetryPolicy, attempt: u32) -> Duration {
        match p.decide(attempt, ErrorKind::Connection) {
            RetryDecision::RetryAfter(d) => d,
            RetryDecision::NoRetry => panic!("expected retry at attempt {attempt}"),
        }
    }

    #[test]
    fn no_retry_for_other() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Other), RetryDecision::NoRetry);
    }

    #[test]
    fn backoff_matches_formula() {
        let p = RetryPolicy::default();
        assert_eq!(delay(&p, 1), Duration::from_millis(800));
        assert_eq!(delay(&p, 2), Duration::from_millis(1600));
        assert_eq!(delay(&p, 3), Duration::from_millis(3150));
        assert_eq!(delay(&p, 4), Duration::from_millis(6200));
    }

    #[test]
    fn backoff_is_capped() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 40;
        assert_eq!(delay(&p, 30), p.max_delay);
    }

    #[test]
    fn empty_body_and_http_errors_are_retried() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(1, ErrorKind::Empty),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(1, ErrorKind::Http(404)),
            RetryDecision::RetryAfter(_)
        ));
    }

    #[test]
    fn respects_max_attempts() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 3;
        assert!(matches!(
            p.decide(1, ErrorKind::Throttled),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, ErrorKind::Throttled),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Throttled), RetryDecision::NoRetry);
    }

    #[test]
    fn immediate_policy_never_sleeps() {
        let p = RetryPolicy::immediate(3);
        assert_eq!(
            p.decide(2, ErrorKind::Timeout),
            RetryDecision::RetryAfter(Duration::ZERO)
        );
    }
}
