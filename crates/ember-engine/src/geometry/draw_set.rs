use bytemuck::{Pod, Zeroable};
use thiserror::Error;
use wgpu::util::DeviceExt;

/// GPU memory exhaustion while uploading geometry.
///
/// Fatal for the affected draw set: there is no degraded or partial
/// geometry state, the caller drops the whole set.
#[derive(Debug, Error)]
#[error("GPU allocation failed while uploading {what}: {log}")]
pub struct AllocationError {
    pub what: &'static str,
    pub log: String,
}

/// One vertex: a 3-component float position.
///
/// The attribute layout below and this struct's memory layout are two views
/// of the same contract; `#[repr(C)]` plus the single `Float32x3` attribute
/// at shader location 0 keep stride and offsets in lockstep.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Draw-call shape: what gets submitted and how many elements it covers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
    /// Triangle list drawn straight from the vertex buffer.
    NonIndexed { vertices: u32 },
    /// Triangle list drawn through a `u32` index buffer.
    Indexed { indices: u32 },
}

impl DrawCall {
    /// Derives the call shape from the uploaded data: index data, when
    /// present, decides both the mode and the element count.
    pub fn for_geometry(vertex_count: usize, index_count: Option<usize>) -> Self {
        match index_count {
            Some(n) => DrawCall::Indexed { indices: n as u32 },
            None => DrawCall::NonIndexed { vertices: vertex_count as u32 },
        }
    }
}

/// A ready-to-draw set of geometry buffers. Immutable after construction.
///
/// Invariant (upheld by [`upload_geometry`]): `index_buffer` is `Some` iff
/// `call` is [`DrawCall::Indexed`].
pub struct DrawSet {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: Option<wgpu::Buffer>,
    call: DrawCall,
}

impl DrawSet {
    pub fn call(&self) -> DrawCall {
        self.call
    }
}

/// Uploads vertex and (optionally) index data as one atomic setup sequence.
///
/// Both buffers are created before the function returns; no draw can ever
/// observe a half-built set. Out-of-memory is detected with a device error
/// scope so exhaustion surfaces as [`AllocationError`] instead of a deferred
/// backend panic.
pub fn upload_geometry(
    device: &wgpu::Device,
    vertices: &[Vertex],
    indices: Option<&[u32]>,
) -> Result<DrawSet, AllocationError> {
    let error_scope = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("ember vertex buffer"),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = indices.map(|data| {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ember index buffer"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::INDEX,
        })
    });

    if let Some(err) = pollster::block_on(error_scope.pop()) {
        return Err(AllocationError {
            what: "geometry buffers",
            log: err.to_string(),
        });
    }

    Ok(DrawSet {
        vertex_buffer,
        index_buffer,
        call: DrawCall::for_geometry(vertices.len(), indices.map(<[u32]>::len)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── draw-call derivation ──────────────────────────────────────────────

    #[test]
    fn three_vertices_without_indices_draw_non_indexed() {
        assert_eq!(
            DrawCall::for_geometry(3, None),
            DrawCall::NonIndexed { vertices: 3 }
        );
    }

    #[test]
    fn eight_vertices_with_twelve_indices_draw_indexed() {
        assert_eq!(
            DrawCall::for_geometry(8, Some(12)),
            DrawCall::Indexed { indices: 12 }
        );
    }

    #[test]
    fn index_data_decides_the_count_even_when_smaller() {
        assert_eq!(
            DrawCall::for_geometry(100, Some(6)),
            DrawCall::Indexed { indices: 6 }
        );
    }

    // ── vertex layout ─────────────────────────────────────────────────────

    #[test]
    fn vertex_stride_is_three_floats() {
        assert_eq!(Vertex::layout().array_stride, 12);
        assert_eq!(std::mem::size_of::<Vertex>(), 12);
    }

    #[test]
    fn vertex_attribute_sits_at_location_zero_with_no_offset() {
        let layout = Vertex::layout();
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
    }
}
