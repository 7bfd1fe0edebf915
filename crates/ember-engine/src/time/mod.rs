//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the
//! runtime. Intended usage:
//! - one `FrameClock` per window (or per render loop)
//! - call `tick()` once per presented frame to obtain `FrameTime`
//!
//! Animation state must be derived from `FrameTime::elapsed`, never from the
//! frame counter, so that animated values are independent of frame rate.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
