use anyhow::{bail, Result};

use ember_engine::device::GpuInit;
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::render::SceneRenderer;
use ember_engine::window::Runtime;

mod app;
mod scenes;

use app::PipelineApp;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SceneKind {
    Triangle,
    Quads,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Options {
    scene: SceneKind,
    wireframe: bool,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut scene = SceneKind::Quads;
        let mut wireframe = false;

        for arg in args {
            match arg.as_str() {
                "triangle" => scene = SceneKind::Triangle,
                "quads" => scene = SceneKind::Quads,
                "--wireframe" => wireframe = true,
                other => bail!("unknown argument '{other}' (expected: triangle | quads | --wireframe)"),
            }
        }

        Ok(Self { scene, wireframe })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let options = Options::parse(std::env::args().skip(1))?;

    let (scene, config) = match options.scene {
        SceneKind::Triangle => scenes::triangle(options.wireframe),
        SceneKind::Quads => scenes::quads(options.wireframe),
    };

    let mut gpu_init = GpuInit::default();
    if options.wireframe {
        // Line polygon mode is an optional feature; request it only when
        // the scene actually needs it so the default path stays portable.
        gpu_init.required_features |= wgpu::Features::POLYGON_MODE_LINE;
    }

    Runtime::run(config, gpu_init, PipelineApp::new(SceneRenderer::new(scene)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options> {
        Options::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_quads() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.scene, SceneKind::Quads);
        assert!(!options.wireframe);
    }

    #[test]
    fn selects_the_triangle_scene() {
        assert_eq!(parse(&["triangle"]).unwrap().scene, SceneKind::Triangle);
    }

    #[test]
    fn wireframe_flag_composes_with_scene_selection() {
        let options = parse(&["triangle", "--wireframe"]).unwrap();
        assert_eq!(options.scene, SceneKind::Triangle);
        assert!(options.wireframe);
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse(&["cube"]).is_err());
    }
}
