use ember_engine::core::{App, AppControl, FrameCtx};
use ember_engine::render::{FrameState, SceneRenderer};

/// The demo application: one scene renderer driven by the frame loop.
pub struct PipelineApp {
    renderer: SceneRenderer,
}

impl PipelineApp {
    pub fn new(renderer: SceneRenderer) -> Self {
        Self { renderer }
    }
}

impl App for PipelineApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        // Frame state is derived from elapsed time only, so the animation
        // speed is independent of how many frames it took to get here.
        let frame = FrameState::at(ctx.time.elapsed);
        let clear = self.renderer.clear_color();

        let renderer = &mut self.renderer;
        ctx.render(clear, |rctx, target| renderer.render(rctx, target, frame))
    }
}
