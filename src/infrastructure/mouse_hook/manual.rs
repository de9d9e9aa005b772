//! Mouse hook driven by hand
//!
//! Stands in for the system hook when there is no desktop: callers push raw
//! input or finished drag events themselves.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::ports::{DragEventSender, HookHandle, MouseHook, MouseHookError};
use crate::domain::selection::{DragEvent, DragTracker, RawMouseInput};

#[derive(Default)]
struct ManualState {
    sender: Option<DragEventSender>,
    tracker: DragTracker,
    installs: usize,
    fail_install: bool,
}

/// Mouse hook whose events come from [`ManualMouseHook::emit`] or
/// [`ManualMouseHook::feed`]. Clones share the same hook.
#[derive(Clone, Default)]
pub struct ManualMouseHook {
    state: Arc<Mutex<ManualState>>,
}

impl ManualMouseHook {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make the next installs fail
    pub fn fail_install(&self) {
        self.state().fail_install = true;
    }

    /// Deliver a drag event. Returns false when no hook is installed.
    pub fn emit(&self, event: DragEvent) -> bool {
        self.state()
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(event).is_ok())
    }

    /// Run raw input through the drag tracker and deliver what it produces.
    pub fn feed(&self, input: RawMouseInput) -> Option<DragEvent> {
        let mut state = self.state();
        let event = state.tracker.feed(input)?;
        if let Some(sender) = &state.sender {
            let _ = sender.send(event);
        }
        Some(event)
    }

    /// Total successful installs
    pub fn install_count(&self) -> usize {
        self.state().installs
    }

    /// Hooks currently installed (0 or 1)
    pub fn active_installs(&self) -> usize {
        usize::from(self.state().sender.is_some())
    }
}

impl MouseHook for ManualMouseHook {
    fn install(&self, events: DragEventSender) -> Result<HookHandle, MouseHookError> {
        let mut state = self.state();
        if state.fail_install {
            return Err(MouseHookError::InstallFailed("install disabled".into()));
        }
        if state.sender.is_some() {
            return Err(MouseHookError::AlreadyInstalled);
        }
        state.sender = Some(events);
        state.installs += 1;
        drop(state);

        let hook = self.clone();
        Ok(HookHandle::new(move || {
            hook.state().sender = None;
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::selection::{MouseButton, Point};
    use tokio::sync::mpsc;

    #[test]
    fn second_install_is_rejected() {
        let hook = ManualMouseHook::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let _handle = hook.install(tx.clone()).unwrap();
        assert!(matches!(
            hook.install(tx),
            Err(MouseHookError::AlreadyInstalled)
        ));
    }

    #[test]
    fn feed_turns_raw_input_into_drag_events() {
        let hook = ManualMouseHook::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = hook.install(tx).unwrap();

        hook.feed(RawMouseInput::Down(MouseButton::Left, Point::new(0, 0)));
        hook.feed(RawMouseInput::Move(Point::new(30, 0)));
        hook.feed(RawMouseInput::Up(MouseButton::Left, Point::new(30, 0)));

        assert!(matches!(rx.try_recv(), Ok(DragEvent::Started { .. })));
        assert!(matches!(rx.try_recv(), Ok(DragEvent::Finished { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropping_handle_uninstalls() {
        let hook = ManualMouseHook::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = hook.install(tx).unwrap();
        assert_eq!(hook.active_installs(), 1);
        drop(handle);
        assert_eq!(hook.active_installs(), 0);
    }
}
