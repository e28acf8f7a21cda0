#[path = "combinators/policy.rs"]
mod policy;

#[path = "combinators/retry.rs"]
mod retry;

#[path = "combinators/timeout.rs"]
mod timeout;

#[path = "combinators/fallback.rs"]
mod fallback;

#[path = "combinators/jitter.rs"]
mod jitter;

#[path = "combinators/catch.rs"]
mod catch;

pub use catch::{log_and_rethrow, try_catch, try_catch_or};
pub use fallback::{with_compensation, with_fallback};
pub use jitter::with_jitter;
pub use policy::RetryPolicy;
pub use retry::{with_exponential_backoff, with_retry};
pub use timeout::{with_timeout, with_timeout_or};
