//! Selection capture domain

mod attempt;
mod settings;

pub use attempt::{
    classify, CapturePhase, CaptureResult, InvalidStateTransition, Interruption, PollOutcome,
    SelectionCaptureAttempt,
};
pub use settings::{CaptureSettings, OpenRetryPolicy, DEFAULT_OPEN_RETRIES};
