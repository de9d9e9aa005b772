//! Selection gesture domain

mod drag;

pub use drag::{
    DragEvent, DragTracker, MouseButton, Point, RawMouseInput, DEFAULT_DRAG_THRESHOLD,
};
