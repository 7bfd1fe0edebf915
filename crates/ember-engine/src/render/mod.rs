//! GPU rendering subsystem.
//!
//! [`ScenePipeline`] assembles a linked shader program and the vertex layout
//! into a backend render pipeline; [`SceneRenderer`] owns the pipeline plus
//! the draw set and issues one draw per frame.
//!
//! Binding discipline: all pipeline/buffer binds happen inside a scoped
//! render pass, and dropping the pass is the unbind. No implicit binding
//! state survives a renderer call.

mod ctx;
mod frame_state;
mod pipeline;
mod scene;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame_state::{pulse, FrameState};
pub use pipeline::{PipelineError, ScenePipeline};
pub use scene::{SceneDesc, SceneRenderer, UniformAnimator};
