//! Selection capture use case
//!
//! Captures the user's current selection by backing up the clipboard,
//! sending a copy shortcut to the focused application, waiting for the
//! clipboard to change and reading the text that landed there. The previous
//! clipboard contents are restored on every path.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::accessor::ClipboardAccessor;
use crate::application::backup::BackupStore;
use crate::application::ports::{AccessError, ClipboardApi, Keystroke, KeystrokeError};
use crate::domain::capture::{
    CaptureResult, CaptureSettings, InvalidStateTransition, Interruption, PollOutcome,
    SelectionCaptureAttempt,
};
use crate::domain::clipboard::{BackupReport, ClipboardSnapshot, RestoreReport};
use crate::domain::timing::Duration;

/// Time the target application gets to consume a paste before the clipboard is restored
pub const PASTE_DELAY: Duration = Duration::from_millis(150);

/// Errors inside a capture attempt. Never returned from the public capture calls.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Keystroke(#[from] KeystrokeError),

    #[error("Capture interrupted: {0}")]
    Interrupted(Interruption),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

/// Everything known about a finished capture
#[derive(Debug, Clone, Serialize)]
pub struct CaptureOutcome {
    pub result: CaptureResult,
    /// Text handed to callers. Set for captured text and for the degraded
    /// read after an interruption.
    pub text: Option<String>,
    pub interruption: Option<Interruption>,
    pub backup: Option<BackupReport>,
    pub restore: Option<RestoreReport>,
    pub elapsed_ms: u64,
}

/// Use case for capturing the current text selection
pub struct SelectionCaptureUseCase<A: ClipboardApi, K: Keystroke> {
    accessor: Arc<ClipboardAccessor<A>>,
    keystroke: K,
    backup: BackupStore,
    settings: CaptureSettings,
}

#[derive(Default)]
struct AttemptState {
    snapshot: Option<ClipboardSnapshot>,
    backup_report: Option<BackupReport>,
}

impl<A: ClipboardApi, K: Keystroke> SelectionCaptureUseCase<A, K> {
    pub fn new(api: A, keystroke: K, settings: CaptureSettings) -> Self {
        let accessor = ClipboardAccessor::new(api).with_retry(settings.retry);
        Self::with_accessor(Arc::new(accessor), keystroke, settings)
    }

    pub fn with_accessor(
        accessor: Arc<ClipboardAccessor<A>>,
        keystroke: K,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            accessor,
            keystroke,
            backup: BackupStore::new(settings.limits),
            settings,
        }
    }

    pub fn accessor(&self) -> &Arc<ClipboardAccessor<A>> {
        &self.accessor
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Capture the selection and return its trimmed text.
    ///
    /// Returns `None` when nothing new was selected or the attempt failed.
    /// When cancelled or out of time, returns whatever text the clipboard
    /// holds after restoration.
    pub async fn get_selected_text(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Option<String> {
        self.capture(timeout, cancel).await.text
    }

    /// Capture the selection and report how it went.
    pub async fn capture(&self, timeout: Duration, cancel: &CancellationToken) -> CaptureOutcome {
        let started = Instant::now();
        let deadline = started + timeout.as_std();
        let mut attempt = SelectionCaptureAttempt::new(timeout);
        let mut state = AttemptState::default();

        match self
            .run_attempt(&mut attempt, &mut state, deadline, cancel)
            .await
        {
            Ok(()) => {}
            Err(CaptureError::Interrupted(reason)) => {
                debug!(%reason, phase = %attempt.phase(), "Capture interrupted");
                if let Err(e) = attempt.interrupt(reason) {
                    warn!(error = %e, "Could not record interruption");
                    let _ = attempt.fail();
                }
            }
            Err(e) => {
                warn!(error = %e, phase = %attempt.phase(), "Capture failed");
                if let Err(e) = attempt.fail() {
                    debug!(error = %e, "Attempt already past failure point");
                }
            }
        }

        let restore = self.restore(state.snapshot.take()).await;

        let degraded = match attempt.interruption() {
            Some(_) => self.read_trimmed_text().await,
            None => None,
        };

        let result = attempt.finish().unwrap_or(CaptureResult::Failed);
        let text = match &result {
            CaptureResult::CapturedText(text) => Some(text.clone()),
            _ => degraded,
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(result = %result, elapsed_ms, "Selection capture finished");

        CaptureOutcome {
            result,
            text,
            interruption: attempt.interruption(),
            backup: state.backup_report,
            restore,
            elapsed_ms,
        }
    }

    async fn run_attempt(
        &self,
        attempt: &mut SelectionCaptureAttempt,
        state: &mut AttemptState,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<(), CaptureError> {
        let original_sequence = self.accessor.sequence_number();
        let original_text = self
            .accessor
            .run_blocking(|accessor| accessor.get_text())
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "Could not read original clipboard text");
                None
            });
        attempt.begin(original_sequence, original_text)?;

        let backup = self.backup;
        let (snapshot, report) = self
            .accessor
            .run_blocking(move |accessor| backup.capture(accessor))
            .await?;
        state.snapshot = Some(snapshot);
        state.backup_report = Some(report);

        Self::check_interrupted(deadline, cancel)?;
        attempt.backup_complete()?;

        self.keystroke.send_copy().await?;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CaptureError::Interrupted(Interruption::Cancelled)),
            outcome = self.wait_for_change(original_sequence, deadline) => outcome,
        };
        debug!(?outcome, "Polling finished");
        attempt.polling_finished(outcome)?;

        let current = self
            .accessor
            .run_blocking(|accessor| accessor.get_text())
            .await?;
        attempt.extract(current.as_deref())?;
        Ok(())
    }

    fn check_interrupted(deadline: Instant, cancel: &CancellationToken) -> Result<(), CaptureError> {
        if cancel.is_cancelled() {
            return Err(CaptureError::Interrupted(Interruption::Cancelled));
        }
        if Instant::now() >= deadline {
            return Err(CaptureError::Interrupted(Interruption::DeadlineElapsed));
        }
        Ok(())
    }

    /// Poll the sequence number until it moves or the deadline passes.
    async fn wait_for_change(&self, original_sequence: u32, deadline: Instant) -> PollOutcome {
        let interval = self.settings.poll_interval.as_std();
        loop {
            if self.accessor.sequence_number() != original_sequence {
                sleep(self.settings.settle_delay.as_std()).await;
                return PollOutcome::Changed;
            }
            let now = Instant::now();
            if now >= deadline {
                return PollOutcome::TimedOut;
            }
            sleep_until((now + interval).min(deadline)).await;
        }
    }

    async fn restore(&self, snapshot: Option<ClipboardSnapshot>) -> Option<RestoreReport> {
        let snapshot = snapshot?;
        let backup = self.backup;
        match self
            .accessor
            .run_blocking(move |accessor| backup.restore(accessor, &snapshot))
            .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, "Failed to restore clipboard");
                None
            }
        }
    }

    async fn read_trimmed_text(&self) -> Option<String> {
        match self.get_text().await {
            Ok(text) => text
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read clipboard text");
                None
            }
        }
    }

    /// Read clipboard text without the capture protocol
    pub async fn get_text(&self) -> Result<Option<String>, AccessError> {
        self.accessor
            .run_blocking(|accessor| accessor.get_text())
            .await
    }

    /// Replace the clipboard contents with text
    pub async fn set_text(&self, text: &str) -> Result<(), AccessError> {
        let text = text.to_string();
        self.accessor
            .run_blocking(move |accessor| accessor.set_text(&text))
            .await
    }

    /// Paste text into the focused application, then put the previous
    /// clipboard contents back.
    pub async fn paste_text(&self, text: &str) -> Result<(), CaptureError> {
        let backup = self.backup;
        let (snapshot, _) = self
            .accessor
            .run_blocking(move |accessor| backup.capture(accessor))
            .await?;

        let pasted = async {
            self.set_text(text).await?;
            self.keystroke.send_paste().await?;
            sleep(PASTE_DELAY.as_std()).await;
            Ok::<(), CaptureError>(())
        }
        .await;

        self.restore(Some(snapshot)).await;
        pasted
    }
}
