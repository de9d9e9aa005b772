//! Passive selection watcher
//!
//! Listens for system-wide mouse drags. When a left-button drag ends, the
//! selection is captured in the background and announced to subscribers if
//! it is new.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::ports::{ClipboardApi, HookHandle, Keystroke, MouseHook, MouseHookError};
use crate::application::selection::SelectionCaptureUseCase;
use crate::domain::selection::{DragEvent, MouseButton};
use crate::domain::timing::Duration;

/// Capacity of the selection broadcast channel
const SELECTION_CHANNEL_CAPACITY: usize = 16;

struct ActiveWatch {
    hook: HookHandle,
    cancel: CancellationToken,
    events: JoinHandle<()>,
}

/// Watches mouse drags and broadcasts newly selected text
pub struct SelectionWatcher<A: ClipboardApi, K: Keystroke + 'static, H: MouseHook> {
    capture: Arc<SelectionCaptureUseCase<A, K>>,
    hook: H,
    timeout: Duration,
    selections: broadcast::Sender<String>,
    active: Mutex<Option<ActiveWatch>>,
    watching: AtomicBool,
}

impl<A: ClipboardApi, K: Keystroke + 'static, H: MouseHook> SelectionWatcher<A, K, H> {
    pub fn new(capture: Arc<SelectionCaptureUseCase<A, K>>, hook: H) -> Self {
        let timeout = capture.settings().timeout;
        let (selections, _) = broadcast::channel(SELECTION_CHANNEL_CAPACITY);
        Self {
            capture,
            hook,
            timeout,
            selections,
            active: Mutex::new(None),
            watching: AtomicBool::new(false),
        }
    }

    /// Receive every selection announced from now on
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.selections.subscribe()
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }

    /// Install the mouse hook. Does nothing if already watching.
    pub async fn start(&self) -> Result<(), MouseHookError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            debug!("Watcher already running");
            return Ok(());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let hook = self.hook.install(tx)?;
        let cancel = CancellationToken::new();
        let events = tokio::spawn(run_events(
            Arc::clone(&self.capture),
            self.timeout,
            rx,
            self.selections.clone(),
            cancel.clone(),
        ));

        *active = Some(ActiveWatch {
            hook,
            cancel,
            events,
        });
        self.watching.store(true, Ordering::SeqCst);
        info!("Selection watcher started");
        Ok(())
    }

    /// Release the mouse hook. Does nothing if not watching.
    ///
    /// Captures already in flight finish on their own.
    pub async fn stop(&self) {
        let Some(watch) = self.active.lock().await.take() else {
            return;
        };
        watch.cancel.cancel();
        watch.hook.release();
        drop(watch.events);
        self.watching.store(false, Ordering::SeqCst);
        info!("Selection watcher stopped");
    }

    /// Flip between watching and not watching. Returns the new state.
    pub async fn toggle(&self) -> Result<bool, MouseHookError> {
        if self.is_watching() {
            self.stop().await;
        } else {
            self.start().await?;
        }
        Ok(self.is_watching())
    }
}

async fn run_events<A: ClipboardApi, K: Keystroke + 'static>(
    capture: Arc<SelectionCaptureUseCase<A, K>>,
    timeout: Duration,
    mut events: mpsc::UnboundedReceiver<DragEvent>,
    selections: broadcast::Sender<String>,
    cancel: CancellationToken,
) {
    let mut baseline: Option<String> = None;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            DragEvent::Started { .. } => {
                baseline = capture.get_text().await.unwrap_or_else(|e| {
                    debug!(error = %e, "Could not read drag baseline");
                    None
                });
            }
            DragEvent::Finished {
                button: MouseButton::Left,
                ..
            } => {
                spawn_capture(
                    Arc::clone(&capture),
                    timeout,
                    baseline.clone(),
                    selections.clone(),
                );
            }
            DragEvent::Finished { button, .. } => {
                debug!(?button, "Ignoring non-left drag");
            }
        }
    }
    debug!("Drag event loop ended");
}

/// Fire-and-forget capture. Panics are caught at the join handle and logged.
fn spawn_capture<A: ClipboardApi, K: Keystroke + 'static>(
    capture: Arc<SelectionCaptureUseCase<A, K>>,
    timeout: Duration,
    baseline: Option<String>,
    selections: broadcast::Sender<String>,
) {
    let task = tokio::spawn(async move {
        capture
            .get_selected_text(timeout, &CancellationToken::new())
            .await
    });

    tokio::spawn(async move {
        let text = match task.await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("Drag produced no selection");
                return;
            }
            Err(e) if e.is_panic() => {
                error!("Selection capture panicked");
                return;
            }
            Err(e) => {
                error!(error = %e, "Selection capture task failed");
                return;
            }
        };

        if text.is_empty() || baseline.as_deref().map(str::trim) == Some(text.as_str()) {
            debug!("Selection unchanged since drag start");
            return;
        }

        if selections.send(text).is_err() {
            debug!("No selection subscribers");
        }
    });
}
