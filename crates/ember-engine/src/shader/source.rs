use std::fmt;

/// Pipeline stage a shader text compiles for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A pair of WGSL text blobs, one per stage. Immutable once supplied.
///
/// Source is owned text rather than `&'static str` so callers may load it
/// from anywhere (embedded constants today, files later) without changing
/// the builder contract.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// A per-draw-call constant value pushed into the active program.
///
/// Scalars are padded out to a vec4-sized buffer write; uniform buffers are
/// allocated with at least 16 bytes so either variant fits.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Scalar(f32),
    Vec4([f32; 4]),
}

impl UniformValue {
    /// Returns the value padded to four components for a buffer write.
    #[inline]
    pub fn padded(self) -> [f32; 4] {
        match self {
            UniformValue::Scalar(v) => [v, 0.0, 0.0, 0.0],
            UniformValue::Vec4(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_pads_into_first_component() {
        assert_eq!(UniformValue::Scalar(0.25).padded(), [0.25, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn vec4_is_passed_through() {
        let v = [0.0, 0.5, 0.0, 1.0];
        assert_eq!(UniformValue::Vec4(v).padded(), v);
    }

    #[test]
    fn stage_names_match_diagnostic_wording() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
