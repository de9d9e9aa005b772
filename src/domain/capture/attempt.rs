//! Selection capture attempt state machine

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::timing::Duration;

/// Phases of one capture attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    #[default]
    Idle,
    BackupInProgress,
    AwaitingChange,
    Extracting,
    Restoring,
    Done,
}

impl CapturePhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BackupInProgress => "backup in progress",
            Self::AwaitingChange => "awaiting change",
            Self::Extracting => "extracting",
            Self::Restoring => "restoring",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_phase} phase")]
pub struct InvalidStateTransition {
    pub current_phase: CapturePhase,
    pub action: String,
}

/// Final classification of a capture attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum CaptureResult {
    CapturedText(String),
    NoChangeDetected,
    TimedOut,
    Failed,
}

impl CaptureResult {
    /// Captured text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::CapturedText(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::CapturedText(text) => Some(text),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CapturedText(_) => "captured text",
            Self::NoChangeDetected => "no change detected",
            Self::TimedOut => "timed out",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CaptureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an attempt stopped before extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interruption {
    /// The caller cancelled the attempt
    Cancelled,
    /// The overall attempt deadline passed
    DeadlineElapsed,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::DeadlineElapsed => write!(f, "deadline elapsed"),
        }
    }
}

/// How the change-polling loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The sequence number moved
    Changed,
    /// The polling budget ran out first
    TimedOut,
}

/// Classify the text read after polling.
///
/// A changed sequence number or new non-empty text counts as a capture, as
/// long as something other than whitespace is left after trimming. A timeout
/// with nothing readable is reported as `TimedOut`; everything else is
/// `NoChangeDetected`.
pub fn classify(
    poll: PollOutcome,
    original_text: Option<&str>,
    current_text: Option<&str>,
) -> CaptureResult {
    let current = current_text.unwrap_or_default();
    let trimmed = current.trim();
    let changed = poll == PollOutcome::Changed;
    let differs = !current.is_empty() && Some(current) != original_text;

    if (changed || differs) && !trimmed.is_empty() {
        return CaptureResult::CapturedText(trimmed.to_string());
    }
    if poll == PollOutcome::TimedOut && trimmed.is_empty() {
        return CaptureResult::TimedOut;
    }
    CaptureResult::NoChangeDetected
}

/// One selection capture attempt.
///
/// State machine:
///   IDLE -> BACKUP_IN_PROGRESS (begin)
///   BACKUP_IN_PROGRESS -> AWAITING_CHANGE (backup_complete)
///   AWAITING_CHANGE -> EXTRACTING (polling_finished)
///   EXTRACTING -> RESTORING (extract)
///   BACKUP_IN_PROGRESS | AWAITING_CHANGE -> RESTORING (interrupt)
///   any phase before RESTORING -> RESTORING (fail)
///   RESTORING -> DONE (finish)
#[derive(Debug)]
pub struct SelectionCaptureAttempt {
    phase: CapturePhase,
    timeout_budget: Duration,
    original_text: Option<String>,
    original_sequence: u32,
    poll_outcome: Option<PollOutcome>,
    interruption: Option<Interruption>,
    result: Option<CaptureResult>,
}

impl SelectionCaptureAttempt {
    /// Create an attempt in the idle phase
    pub fn new(timeout_budget: Duration) -> Self {
        Self {
            phase: CapturePhase::Idle,
            timeout_budget,
            original_text: None,
            original_sequence: 0,
            poll_outcome: None,
            interruption: None,
            result: None,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn timeout_budget(&self) -> Duration {
        self.timeout_budget
    }

    pub fn original_text(&self) -> Option<&str> {
        self.original_text.as_deref()
    }

    pub fn original_sequence(&self) -> u32 {
        self.original_sequence
    }

    pub fn change_observed(&self) -> bool {
        self.poll_outcome == Some(PollOutcome::Changed)
    }

    pub fn interruption(&self) -> Option<Interruption> {
        self.interruption
    }

    /// Result decided so far, available from the restoring phase on
    pub fn result(&self) -> Option<&CaptureResult> {
        self.result.as_ref()
    }

    fn expect_phase(
        &self,
        allowed: &[CapturePhase],
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(InvalidStateTransition {
                current_phase: self.phase,
                action: action.to_string(),
            })
        }
    }

    /// Transition from IDLE to BACKUP_IN_PROGRESS, recording the starting clipboard state
    pub fn begin(
        &mut self,
        original_sequence: u32,
        original_text: Option<String>,
    ) -> Result<(), InvalidStateTransition> {
        self.expect_phase(&[CapturePhase::Idle], "begin capture")?;
        self.original_sequence = original_sequence;
        self.original_text = original_text;
        self.phase = CapturePhase::BackupInProgress;
        Ok(())
    }

    /// Transition from BACKUP_IN_PROGRESS to AWAITING_CHANGE
    pub fn backup_complete(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect_phase(&[CapturePhase::BackupInProgress], "complete backup")?;
        self.phase = CapturePhase::AwaitingChange;
        Ok(())
    }

    /// Transition from AWAITING_CHANGE to EXTRACTING
    pub fn polling_finished(&mut self, outcome: PollOutcome) -> Result<(), InvalidStateTransition> {
        self.expect_phase(&[CapturePhase::AwaitingChange], "finish polling")?;
        self.poll_outcome = Some(outcome);
        self.phase = CapturePhase::Extracting;
        Ok(())
    }

    /// Transition from EXTRACTING to RESTORING, classifying the text read
    pub fn extract(
        &mut self,
        current_text: Option<&str>,
    ) -> Result<&CaptureResult, InvalidStateTransition> {
        self.expect_phase(&[CapturePhase::Extracting], "extract text")?;
        let poll = self.poll_outcome.unwrap_or(PollOutcome::TimedOut);
        self.phase = CapturePhase::Restoring;
        let result = classify(poll, self.original_text.as_deref(), current_text);
        Ok(&*self.result.insert(result))
    }

    /// Stop before extraction because of cancellation or the deadline
    pub fn interrupt(&mut self, reason: Interruption) -> Result<(), InvalidStateTransition> {
        self.expect_phase(
            &[CapturePhase::BackupInProgress, CapturePhase::AwaitingChange],
            "interrupt capture",
        )?;
        self.interruption = Some(reason);
        self.result = Some(CaptureResult::TimedOut);
        self.phase = CapturePhase::Restoring;
        Ok(())
    }

    /// Abandon the attempt after an unexpected failure
    pub fn fail(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect_phase(
            &[
                CapturePhase::Idle,
                CapturePhase::BackupInProgress,
                CapturePhase::AwaitingChange,
                CapturePhase::Extracting,
            ],
            "fail capture",
        )?;
        self.result = Some(CaptureResult::Failed);
        self.phase = CapturePhase::Restoring;
        Ok(())
    }

    /// Transition from RESTORING to DONE and hand out the result
    pub fn finish(&mut self) -> Result<CaptureResult, InvalidStateTransition> {
        self.expect_phase(&[CapturePhase::Restoring], "finish capture")?;
        self.phase = CapturePhase::Done;
        Ok(self.result.clone().unwrap_or(CaptureResult::Failed))
    }
}
