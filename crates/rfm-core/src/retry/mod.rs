//! Retry and backoff policy for hosts.
//!
//! The reconciliation core never retries. Hosts that want retries wrap a
//! whole Create or Read call with [`run_with_retry`], which classifies the
//! `MirrorError` (timeouts, throttling, connection failures, 5xx) and sleeps
//! with exponential backoff between attempts.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
