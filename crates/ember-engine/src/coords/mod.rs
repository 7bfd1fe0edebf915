//! Small shared value types: drawable viewport and clear color.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
