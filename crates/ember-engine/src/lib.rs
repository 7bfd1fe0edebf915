//! Ember engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by applications:
//! window/event loop, device + surface management, shader program
//! construction, geometry upload, and the per-frame render path.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod shader;
pub mod geometry;
pub mod render;
