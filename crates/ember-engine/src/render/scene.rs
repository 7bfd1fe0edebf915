use crate::coords::ColorRgba;
use crate::geometry::{self, DrawSet, Vertex};
use crate::shader::{ShaderProgram, UniformValue};

use super::{FrameState, RenderCtx, RenderTarget, ScenePipeline};

/// Per-frame uniform update supplied by the orchestrator.
///
/// The callback derives a value from the frame state; the renderer pushes
/// it to the named uniform if (and only if) the program declares one.
pub struct UniformAnimator {
    pub name: String,
    pub update: Box<dyn Fn(FrameState) -> UniformValue>,
}

/// Everything a scene needs to render: clear color, program, geometry, and
/// an optional animated uniform.
///
/// `program` is `None` when shader construction already failed: the
/// diagnostics were surfaced at build time and the renderer then produces
/// clear-only frames instead of crashing on an unusable program.
pub struct SceneDesc {
    pub clear: ColorRgba,
    pub program: Option<ShaderProgram>,
    pub vertices: Vec<Vertex>,
    pub indices: Option<Vec<u32>>,
    pub animator: Option<UniformAnimator>,
    pub wireframe: bool,
}

/// Owns the GPU-side scene state (pipeline + draw set) and issues one draw
/// per frame.
///
/// GPU objects are created once, on the first frame the device is
/// available, behind idempotent ensure-guards; they are dropped with the
/// renderer, exactly once, on every exit path.
pub struct SceneRenderer {
    scene: SceneDesc,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<ScenePipeline>,
    draw_set: Option<DrawSet>,

    /// Set after an assembly or upload failure: the error has been logged
    /// and the renderer degrades to clear-only frames.
    disabled: bool,
}

impl SceneRenderer {
    pub fn new(scene: SceneDesc) -> Self {
        Self {
            scene,
            pipeline_format: None,
            pipeline: None,
            draw_set: None,
            disabled: false,
        }
    }

    pub fn clear_color(&self) -> ColorRgba {
        self.scene.clear
    }

    /// Renders the scene into `target`.
    ///
    /// Frame contract, in order: push the animated uniform value, then bind
    /// pipeline + geometry inside a scoped render pass and draw. The clear
    /// has already happened (see `FrameCtx::render`); this pass loads the
    /// cleared color target.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, frame: FrameState) {
        if self.disabled || self.scene.program.is_none() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_geometry(ctx);

        if let (Some(animator), Some(program), Some(pipeline)) = (
            &self.scene.animator,
            self.scene.program.as_mut(),
            self.pipeline.as_ref(),
        ) {
            let value = (animator.update)(frame);
            // A cached "not found" location makes this a silent no-op.
            if let Some(binding) = program.uniform_location(&animator.name) {
                pipeline.write_uniform(ctx.queue, &binding, value);
            }
        }

        let (Some(pipeline), Some(draw_set)) = (self.pipeline.as_ref(), self.draw_set.as_ref())
        else {
            return;
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ember scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pipeline.record(&mut rpass, draw_set);

        // Dropping the pass restores the unbound state; nothing this scene
        // bound can leak into the next pass.
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }
        let Some(program) = self.scene.program.as_ref() else {
            return;
        };

        match ScenePipeline::assemble(ctx.device, program, ctx.surface_format, self.scene.wireframe)
        {
            Ok(pipeline) => {
                self.pipeline_format = Some(ctx.surface_format);
                self.pipeline = Some(pipeline);
            }
            Err(err) => {
                log::error!("scene pipeline assembly failed: {err}");
                self.disabled = true;
            }
        }
    }

    fn ensure_geometry(&mut self, ctx: &RenderCtx<'_>) {
        if self.draw_set.is_some() || self.disabled {
            return;
        }

        match geometry::upload_geometry(
            ctx.device,
            &self.scene.vertices,
            self.scene.indices.as_deref(),
        ) {
            Ok(draw_set) => self.draw_set = Some(draw_set),
            Err(err) => {
                log::error!("{err}");
                self.disabled = true;
            }
        }
    }
}
