use thiserror::Error;

use crate::geometry::{DrawCall, DrawSet, Vertex};
use crate::shader::{truncate_log, ShaderProgram, UniformBinding, UniformValue};

/// Failure to assemble the backend pipeline from a linked program.
///
/// Same reporting class as a shader link failure: the diagnostic is
/// surfaced in full and the renderer degrades to clear-only frames rather
/// than crashing.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("render pipeline failed to link:\n{log}")]
    Link { log: String },

    #[error("GPU allocation failed while assembling the pipeline: {log}")]
    Allocation { log: String },
}

/// A linked program bound to the vertex layout and surface format, ready to
/// record draw calls.
pub struct ScenePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: Option<wgpu::BindGroup>,
    uniforms: Vec<UniformSlot>,
}

struct UniformSlot {
    group: u32,
    binding: u32,
    buffer: wgpu::Buffer,
}

impl ScenePipeline {
    /// Creates the backend pipeline plus one uniform buffer per uniform the
    /// shaders declare.
    ///
    /// Backend validation and out-of-memory errors are captured with device
    /// error scopes so they surface here, as values, instead of through the
    /// process-wide uncaptured-error handler. The backend stage modules are
    /// created inside this call and dropped as soon as the pipeline handle
    /// exists; they are not needed afterward.
    pub fn assemble(
        device: &wgpu::Device,
        program: &ShaderProgram,
        surface_format: wgpu::TextureFormat,
        wireframe: bool,
    ) -> Result<Self, PipelineError> {
        let uniform_meta = program.uniform_bindings();
        check_uniform_groups(&uniform_meta)?;

        let oom_scope = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let assembled = build_objects(device, program, surface_format, wireframe, &uniform_meta);

        let validation = pollster::block_on(validation_scope.pop());
        let oom = pollster::block_on(oom_scope.pop());

        if let Some(err) = oom {
            return Err(PipelineError::Allocation {
                log: truncate_log(err.to_string()),
            });
        }
        if let Some(err) = validation {
            return Err(PipelineError::Link {
                log: truncate_log(err.to_string()),
            });
        }

        Ok(assembled)
    }

    /// Pushes a value into the uniform at `binding`.
    ///
    /// A binding with no backing slot (the shader pair never declared it)
    /// is a silent no-op.
    pub fn write_uniform(&self, queue: &wgpu::Queue, binding: &UniformBinding, value: UniformValue) {
        let slot = self
            .uniforms
            .iter()
            .find(|s| s.group == binding.group && s.binding == binding.binding);
        let Some(slot) = slot else { return };

        queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&value.padded()));
    }

    /// Records one draw of `draw_set` into an open render pass.
    ///
    /// All binds live inside the pass; dropping the pass restores the
    /// unbound state.
    pub fn record(&self, rpass: &mut wgpu::RenderPass<'_>, draw_set: &DrawSet) {
        rpass.set_pipeline(&self.pipeline);
        if let Some(bind_group) = &self.bind_group {
            rpass.set_bind_group(0, bind_group, &[]);
        }
        rpass.set_vertex_buffer(0, draw_set.vertex_buffer.slice(..));

        match draw_set.call() {
            DrawCall::NonIndexed { vertices } => rpass.draw(0..vertices, 0..1),
            DrawCall::Indexed { indices } => {
                // Constructor invariant: an indexed call always has a buffer.
                if let Some(index_buffer) = &draw_set.index_buffer {
                    rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..indices, 0, 0..1);
                }
            }
        }
    }
}

/// Single bind group at index 0 is the supported shape; anything else in
/// the source is rejected before touching the device.
fn check_uniform_groups(uniforms: &[UniformBinding]) -> Result<(), PipelineError> {
    match uniforms.iter().find(|u| u.group != 0) {
        Some(u) => Err(PipelineError::Link {
            log: format!(
                "uniform '{}' is bound to group {}; only bind group 0 is supported",
                u.name, u.group
            ),
        }),
        None => Ok(()),
    }
}

/// A uniform buffer must cover the declared type and satisfy the minimum
/// binding size; 16 bytes fits every scalar/vector uniform in scope.
fn uniform_buffer_size(declared: u32) -> u64 {
    u64::from(declared.max(16))
}

fn build_objects(
    device: &wgpu::Device,
    program: &ShaderProgram,
    surface_format: wgpu::TextureFormat,
    wireframe: bool,
    uniform_meta: &[UniformBinding],
) -> ScenePipeline {
    let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("ember vertex stage"),
        source: wgpu::ShaderSource::Wgsl(program.vertex_wgsl().into()),
    });
    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("ember fragment stage"),
        source: wgpu::ShaderSource::Wgsl(program.fragment_wgsl().into()),
    });

    let (bind_group_layout, bind_group, uniforms) = if uniform_meta.is_empty() {
        (None, None, Vec::new())
    } else {
        let entries: Vec<wgpu::BindGroupLayoutEntry> = uniform_meta
            .iter()
            .map(|u| wgpu::BindGroupLayoutEntry {
                binding: u.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(uniform_buffer_size(u.size)),
                },
                count: None,
            })
            .collect();

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ember uniform bgl"),
            entries: &entries,
        });

        let uniforms: Vec<UniformSlot> = uniform_meta
            .iter()
            .map(|u| UniformSlot {
                group: u.group,
                binding: u.binding,
                buffer: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("ember uniform buffer"),
                    size: uniform_buffer_size(u.size),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
            })
            .collect();

        let bind_entries: Vec<wgpu::BindGroupEntry> = uniforms
            .iter()
            .map(|s| wgpu::BindGroupEntry {
                binding: s.binding,
                resource: s.buffer.as_entire_binding(),
            })
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ember uniform bind group"),
            layout: &layout,
            entries: &bind_entries,
        });

        (Some(layout), Some(bind_group), uniforms)
    };

    let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("ember pipeline layout"),
        bind_group_layouts: &layout_refs,
        // Newer wgpu uses immediate constants; keep disabled.
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("ember scene pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some(program.vertex_entry()),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some(program.fragment_entry()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: if wireframe {
                wgpu::PolygonMode::Line
            } else {
                wgpu::PolygonMode::Fill
            },
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    });

    // vertex_module / fragment_module drop here: stages are released the
    // moment linking has produced the pipeline handle.
    ScenePipeline {
        pipeline,
        bind_group,
        uniforms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str, group: u32, binding: u32, size: u32) -> UniformBinding {
        UniformBinding {
            name: name.to_string(),
            group,
            binding,
            size,
        }
    }

    // ── uniform buffer sizing ─────────────────────────────────────────────

    #[test]
    fn small_uniforms_are_padded_to_sixteen_bytes() {
        assert_eq!(uniform_buffer_size(4), 16);
        assert_eq!(uniform_buffer_size(16), 16);
    }

    #[test]
    fn larger_uniforms_keep_their_declared_size() {
        assert_eq!(uniform_buffer_size(64), 64);
    }

    // ── group restriction ─────────────────────────────────────────────────

    #[test]
    fn group_zero_uniforms_pass() {
        let meta = [binding("tint", 0, 0, 16), binding("level", 0, 1, 4)];
        assert!(check_uniform_groups(&meta).is_ok());
    }

    #[test]
    fn non_zero_groups_are_rejected_with_a_log() {
        let meta = [binding("tint", 1, 0, 16)];
        match check_uniform_groups(&meta) {
            Err(PipelineError::Link { log }) => assert!(log.contains("tint")),
            other => panic!("expected a link error, got {other:?}"),
        }
    }
}
