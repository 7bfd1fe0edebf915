//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code is responsible for translating platform key events into
//! `KeyEvent`s before handing them to the application.

mod types;

pub use types::{Key, KeyEvent, KeyState};
