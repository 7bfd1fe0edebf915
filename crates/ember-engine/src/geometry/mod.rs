//! Geometry upload and draw-set construction.
//!
//! A draw set couples a vertex buffer, an optional index buffer, and the
//! draw-call shape derived from the data. Both buffers are created inside a
//! single constructor so the attribute layout and the uploaded bytes can
//! never drift apart; a layout/data mismatch would corrupt silently, so both
//! are constructed together, before the first bind.
//!
//! Upload is static: data is immutable for the buffers' lifetime and there
//! is no update or resize operation.

mod draw_set;

pub use draw_set::{upload_geometry, AllocationError, DrawCall, DrawSet, Vertex};
