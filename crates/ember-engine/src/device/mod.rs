//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for rendering
//!
//! The adapter/device request doubles as the entry-point acquisition step:
//! it runs once after surface creation and before any GPU resource is
//! allocated, and a failure there is fatal to the whole pipeline.

mod gpu;
mod surface;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
