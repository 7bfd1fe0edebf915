//! The two built-in scenes: a plain triangle and a pair of quads with an
//! animated tint.

use ember_engine::coords::ColorRgba;
use ember_engine::geometry::Vertex;
use ember_engine::render::{SceneDesc, UniformAnimator};
use ember_engine::shader::{ShaderProgram, ShaderSource, UniformValue};
use ember_engine::window::RuntimeConfig;
use winit::dpi::LogicalSize;

/// Sky-blue clear shared by both scenes.
const CLEAR: ColorRgba = ColorRgba::new(0.529, 0.808, 0.980, 1.0);

const VS_POSITION: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
"#;

const FS_WHITE: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

const FS_TINT: &str = r#"
@group(0) @binding(0) var<uniform> tint: vec4<f32>;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return tint;
}
"#;

/// A single white triangle, drawn non-indexed.
pub fn triangle(wireframe: bool) -> (SceneDesc, RuntimeConfig) {
    let vertices = vec![
        Vertex::new(-0.5, -0.5, 0.0), // left
        Vertex::new(0.5, -0.5, 0.0),  // right
        Vertex::new(0.0, 0.5, 0.0),   // top
    ];

    let scene = SceneDesc {
        clear: CLEAR,
        program: build_program("triangle shaders", VS_POSITION, FS_WHITE),
        vertices,
        indices: None,
        animator: None,
        wireframe,
    };

    let config = RuntimeConfig {
        title: "ember (triangle)".to_string(),
        initial_size: LogicalSize::new(640.0, 480.0),
    };

    (scene, config)
}

/// Two overlapping quads drawn through an index buffer, with a gray tint
/// that pulses over time.
pub fn quads(wireframe: bool) -> (SceneDesc, RuntimeConfig) {
    let vertices = vec![
        Vertex::new(0.2, 0.2, 0.0),   // top right
        Vertex::new(0.2, -0.8, 0.0),  // bottom right
        Vertex::new(-0.8, -0.8, 0.0), // bottom left
        Vertex::new(-0.8, 0.2, 0.0),  // top left
        Vertex::new(0.8, 0.8, 0.0),
        Vertex::new(0.8, -0.2, 0.0),
        Vertex::new(-0.2, -0.2, 0.0),
        Vertex::new(-0.2, 0.8, 0.0),
    ];
    let indices = vec![
        0, 1, 3, // first quad
        1, 2, 3,
        4, 5, 7, // second quad
        5, 6, 7,
    ];

    let scene = SceneDesc {
        clear: CLEAR,
        program: build_program("quads shaders", VS_POSITION, FS_TINT),
        vertices,
        indices: Some(indices),
        animator: Some(UniformAnimator {
            name: "tint".to_string(),
            update: Box::new(|frame| {
                UniformValue::Vec4([frame.pulse, frame.pulse, frame.pulse, 1.0])
            }),
        }),
        wireframe,
    };

    let config = RuntimeConfig {
        title: "ember (quads)".to_string(),
        initial_size: LogicalSize::new(512.0, 512.0),
    };

    (scene, config)
}

/// Builds the program and surfaces any diagnostic before the loop starts.
///
/// A failed build returns `None`: the loop still runs, rendering clear-only
/// frames, with the full compile/link transcript already in the log.
fn build_program(label: &str, vertex: &str, fragment: &str) -> Option<ShaderProgram> {
    match ShaderProgram::build(&ShaderSource::new(vertex, fragment)) {
        Ok(program) => Some(program),
        Err(err) => {
            log::error!("{label}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_engine::geometry::DrawCall;

    #[test]
    fn builtin_shader_sources_build() {
        assert!(build_program("triangle shaders", VS_POSITION, FS_WHITE).is_some());
        assert!(build_program("quads shaders", VS_POSITION, FS_TINT).is_some());
    }

    #[test]
    fn triangle_scene_draws_three_vertices_non_indexed() {
        let (scene, _) = triangle(false);
        assert_eq!(scene.vertices.len(), 3);
        assert!(scene.indices.is_none());
        assert_eq!(
            DrawCall::for_geometry(scene.vertices.len(), None),
            DrawCall::NonIndexed { vertices: 3 }
        );
    }

    #[test]
    fn quads_scene_draws_twelve_indices() {
        let (scene, _) = quads(false);
        assert_eq!(scene.vertices.len(), 8);
        let indices = scene.indices.as_ref().expect("quads are indexed");
        assert_eq!(indices.len(), 12);
        assert_eq!(
            DrawCall::for_geometry(scene.vertices.len(), Some(indices.len())),
            DrawCall::Indexed { indices: 12 }
        );
    }

    #[test]
    fn quads_tint_resolves_in_its_own_program() {
        let (scene, _) = quads(false);
        let mut program = scene.program.expect("quads shaders build");
        assert!(program.uniform_location("tint").is_some());
    }

    #[test]
    fn quads_animator_pulses_gray() {
        let (scene, _) = quads(false);
        let animator = scene.animator.expect("quads animate their tint");

        let frame = ember_engine::render::FrameState::at(0.0);
        let UniformValue::Vec4([r, g, b, a]) = (animator.update)(frame) else {
            panic!("tint should be a vec4");
        };
        assert_eq!((r, g, b, a), (0.5, 0.5, 0.5, 1.0));
    }
}
