//! Retry and backoff policy for source downloads.
//!
//! Fetch errors are classified (timeouts, throttling, connection failures,
//! bad status, empty bodies) and an exponential backoff with linear jitter
//! decides whether and when to try again. Transcoding is never retried.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
