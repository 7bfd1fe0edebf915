//! Shader program construction.
//!
//! A program is built from a pair of WGSL text blobs (vertex + fragment
//! stage). Each stage is compiled through the naga front-end so that
//! malformed source fails fast, on the CPU, with a full source-annotated
//! diagnostic instead of a backend panic mid-frame. After both stages
//! compile, the pair is linked: entry points are resolved and the
//! vertex-output / fragment-input interface is checked.
//!
//! Failures carry the complete (bounded) diagnostic transcript. They are
//! reported, never silently swallowed, and never retried with altered
//! source; the orchestrating loop decides whether to abort or continue
//! without a usable program.

mod diagnostics;
mod program;
mod source;

pub(crate) use diagnostics::truncate_log;
pub use diagnostics::MAX_DIAGNOSTIC_LEN;
pub use program::{ShaderBuildError, ShaderProgram, UniformBinding};
pub use source::{ShaderSource, ShaderStage, UniformValue};
