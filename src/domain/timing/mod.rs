mod duration;

pub use duration::{
    Duration, DEFAULT_OPEN_RETRY_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_DELAY_MS,
    DEFAULT_TIMEOUT_MS,
};
