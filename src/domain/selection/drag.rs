//! Mouse drag gesture detection
//!
//! Turns raw low-level mouse input into drag start/finish events. A drag
//! starts when the pointer moves beyond the threshold while a button is held
//! and finishes when that button is released.

use serde::Serialize;

/// Default drag threshold in pixels, matching the usual system metric
pub const DEFAULT_DRAG_THRESHOLD: i32 = 4;

/// Screen position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn exceeds(&self, other: &Point, threshold: i32) -> bool {
        (self.x - other.x).abs() > threshold || (self.y - other.y).abs() > threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// One low-level mouse notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMouseInput {
    Down(MouseButton, Point),
    Move(Point),
    Up(MouseButton, Point),
}

/// Drag gesture events delivered to the watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragEvent {
    Started { button: MouseButton, at: Point },
    Finished { button: MouseButton, at: Point },
}

impl DragEvent {
    pub fn button(&self) -> MouseButton {
        match self {
            Self::Started { button, .. } | Self::Finished { button, .. } => *button,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Press {
    button: MouseButton,
    anchor: Point,
    dragging: bool,
}

/// Stateful drag detector fed from the mouse hook
#[derive(Debug, Clone)]
pub struct DragTracker {
    threshold: i32,
    press: Option<Press>,
}

impl DragTracker {
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold: threshold.max(0),
            press: None,
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Whether a drag is currently in progress
    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    /// Feed one input and return the gesture event it completes, if any.
    pub fn feed(&mut self, input: RawMouseInput) -> Option<DragEvent> {
        match input {
            RawMouseInput::Down(button, at) => {
                // A second button while one is held keeps the first gesture
                if self.press.is_none() {
                    self.press = Some(Press {
                        button,
                        anchor: at,
                        dragging: false,
                    });
                }
                None
            }
            RawMouseInput::Move(at) => {
                let threshold = self.threshold;
                let press = self.press.as_mut()?;
                if press.dragging || !at.exceeds(&press.anchor, threshold) {
                    return None;
                }
                press.dragging = true;
                Some(DragEvent::Started {
                    button: press.button,
                    at: press.anchor,
                })
            }
            RawMouseInput::Up(button, at) => {
                let press = self.press?;
                if press.button != button {
                    return None;
                }
                self.press = None;
                press
                    .dragging
                    .then_some(DragEvent::Finished { button, at })
            }
        }
    }
}

impl Default for DragTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}
