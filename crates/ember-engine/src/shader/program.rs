use std::collections::HashMap;

use thiserror::Error;

use super::{truncate_log, ShaderSource, ShaderStage};

/// Failure to construct a usable program from source text.
///
/// The `log` field carries the full diagnostic transcript (bounded to
/// [`super::MAX_DIAGNOSTIC_LEN`]), attributed to the failing stage for
/// compile errors. There is no retry and no fallback source.
#[derive(Debug, Error)]
pub enum ShaderBuildError {
    #[error("{stage} stage failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
}

/// Resolved location of a named uniform: its bind group slot and the byte
/// size of its declared type.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformBinding {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub size: u32,
}

/// A compiled and linked shader program.
///
/// Holds the parsed stage IR for uniform reflection plus the WGSL text,
/// which is what the GPU backend consumes when the render pipeline is
/// assembled. The backend shader modules themselves are created and released
/// during assembly; nothing GPU-side lives here.
#[derive(Debug)]
pub struct ShaderProgram {
    vertex: naga::Module,
    fragment: naga::Module,
    vertex_src: String,
    fragment_src: String,
    vertex_entry: String,
    fragment_entry: String,

    /// Memoized name → location lookups. "Not found" is a valid cached
    /// outcome: pushing a value to an absent uniform is a silent no-op.
    uniform_cache: HashMap<String, Option<UniformBinding>>,
}

impl ShaderProgram {
    /// Compiles both stages and links them.
    ///
    /// The vertex stage is compiled first; a compile failure is terminal for
    /// the build and linking is never attempted. Linking resolves one entry
    /// point per stage and checks that every fragment input location is fed
    /// by a vertex output of the same type.
    pub fn build(source: &ShaderSource) -> Result<Self, ShaderBuildError> {
        let vertex = compile_stage(ShaderStage::Vertex, &source.vertex)?;
        let fragment = compile_stage(ShaderStage::Fragment, &source.fragment)?;

        let vertex_entry =
            resolve_entry_point(&vertex, naga::ShaderStage::Vertex, ShaderStage::Vertex)?;
        let fragment_entry =
            resolve_entry_point(&fragment, naga::ShaderStage::Fragment, ShaderStage::Fragment)?;

        check_stage_interface(&vertex, &vertex_entry, &fragment, &fragment_entry)?;

        Ok(Self {
            vertex,
            fragment,
            vertex_src: source.vertex.clone(),
            fragment_src: source.fragment.clone(),
            vertex_entry,
            fragment_entry,
            uniform_cache: HashMap::new(),
        })
    }

    pub fn vertex_wgsl(&self) -> &str {
        &self.vertex_src
    }

    pub fn fragment_wgsl(&self) -> &str {
        &self.fragment_src
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    /// Resolves a uniform by name, lazily and memoized.
    ///
    /// The first request for a name reflects both stage modules and caches
    /// the result; subsequent requests (one per frame for an animated
    /// uniform) are a map lookup. An unknown name resolves to `None`, which
    /// is cached too; tolerating unused uniform names is part of the
    /// contract, not an error.
    pub fn uniform_location(&mut self, name: &str) -> Option<UniformBinding> {
        if let Some(cached) = self.uniform_cache.get(name) {
            return cached.clone();
        }

        let resolved =
            find_uniform(&self.fragment, name).or_else(|| find_uniform(&self.vertex, name));
        self.uniform_cache.insert(name.to_string(), resolved.clone());
        resolved
    }

    /// Every uniform either stage declares, deduplicated by bind slot and
    /// ordered by (group, binding).
    ///
    /// Pipeline assembly uses this to build a bind group layout that covers
    /// exactly what the shaders statically reference.
    pub fn uniform_bindings(&self) -> Vec<UniformBinding> {
        let mut out: Vec<UniformBinding> = Vec::new();

        for module in [&self.vertex, &self.fragment] {
            for (_, var) in module.global_variables.iter() {
                if var.space != naga::AddressSpace::Uniform {
                    continue;
                }
                let (Some(name), Some(slot)) = (&var.name, &var.binding) else {
                    continue;
                };
                if out
                    .iter()
                    .any(|u| u.group == slot.group && u.binding == slot.binding)
                {
                    continue;
                }
                out.push(UniformBinding {
                    name: name.clone(),
                    group: slot.group,
                    binding: slot.binding,
                    size: module.types[var.ty].inner.size(module.to_ctx()),
                });
            }
        }

        out.sort_by_key(|u| (u.group, u.binding));
        out
    }
}

fn compile_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, ShaderBuildError> {
    naga::front::wgsl::parse_str(source).map_err(|err| ShaderBuildError::Compile {
        stage,
        log: truncate_log(err.emit_to_string(source)),
    })
}

/// Picks the single entry point of the requested stage kind.
fn resolve_entry_point(
    module: &naga::Module,
    naga_stage: naga::ShaderStage,
    stage: ShaderStage,
) -> Result<String, ShaderBuildError> {
    let mut candidates = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == naga_stage);

    let Some(entry) = candidates.next() else {
        return Err(ShaderBuildError::Link {
            log: format!("{stage} stage source declares no {stage} entry point"),
        });
    };

    if let Some(extra) = candidates.next() {
        return Err(ShaderBuildError::Link {
            log: format!(
                "{stage} stage source declares multiple {stage} entry points \
                 ('{}' and '{}'); exactly one is expected",
                entry.name, extra.name
            ),
        });
    }

    Ok(entry.name.clone())
}

/// Verifies the vertex-output / fragment-input interface.
///
/// Every fragment input location must be produced by a vertex output at the
/// same location with a matching type; builtins are handled by the backend
/// and skipped here.
fn check_stage_interface(
    vertex: &naga::Module,
    vertex_entry: &str,
    fragment: &naga::Module,
    fragment_entry: &str,
) -> Result<(), ShaderBuildError> {
    let outputs = entry_point(vertex, vertex_entry)
        .map(|ep| output_locations(vertex, ep))
        .unwrap_or_default();
    let inputs = entry_point(fragment, fragment_entry)
        .map(|ep| input_locations(fragment, ep))
        .unwrap_or_default();

    for (location, input_ty) in &inputs {
        match outputs.iter().find(|(loc, _)| loc == location) {
            None => {
                return Err(ShaderBuildError::Link {
                    log: format!(
                        "fragment input at location {location} has no matching vertex output"
                    ),
                });
            }
            Some((_, output_ty)) if !io_types_compatible(output_ty, input_ty) => {
                return Err(ShaderBuildError::Link {
                    log: format!(
                        "vertex output and fragment input at location {location} \
                         disagree on type"
                    ),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn entry_point<'m>(module: &'m naga::Module, name: &str) -> Option<&'m naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.name == name)
}

fn output_locations(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<(u32, naga::TypeInner)> {
    let mut out = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_io(module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn input_locations(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<(u32, naga::TypeInner)> {
    let mut out = Vec::new();
    for arg in &ep.function.arguments {
        collect_io(module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

/// Collects `@location` bindings from an IO value, descending into a bare
/// struct whose members carry the bindings.
fn collect_io(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<(u32, naga::TypeInner)>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.push((*location, module.types[ty].inner.clone()));
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_io(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// IO types live in separate modules, so handle-bearing variants cannot be
/// compared structurally; scalars, vectors and matrices can, and those are
/// the only legal inter-stage IO types anyway.
fn io_types_compatible(a: &naga::TypeInner, b: &naga::TypeInner) -> bool {
    fn comparable(t: &naga::TypeInner) -> bool {
        matches!(
            t,
            naga::TypeInner::Scalar(_)
                | naga::TypeInner::Vector { .. }
                | naga::TypeInner::Matrix { .. }
        )
    }

    if comparable(a) || comparable(b) {
        a == b
    } else {
        true
    }
}

fn find_uniform(module: &naga::Module, name: &str) -> Option<UniformBinding> {
    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        if var.name.as_deref() != Some(name) {
            continue;
        }
        let slot = var.binding.as_ref()?;
        return Some(UniformBinding {
            name: name.to_string(),
            group: slot.group,
            binding: slot.binding,
            size: module.types[var.ty].inner.size(module.to_ctx()),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

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

    // Missing semicolon after the return expression.
    const VS_MALFORMED: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0)
}
"#;

    const VS_WITH_COLOR_OUT: &str = r#"
struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(position, 1.0);
    out.color = position;
    return out;
}
"#;

    const FS_COLOR_IN: &str = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;

    const FS_COLOR_IN_VEC4: &str = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

    fn source(vs: &str, fs: &str) -> ShaderSource {
        ShaderSource::new(vs, fs)
    }

    // ── build ─────────────────────────────────────────────────────────────

    #[test]
    fn valid_pair_builds() {
        let program = ShaderProgram::build(&source(VS_POSITION, FS_WHITE));
        assert!(program.is_ok());
    }

    #[test]
    fn valid_pair_with_varyings_builds() {
        let program = ShaderProgram::build(&source(VS_WITH_COLOR_OUT, FS_COLOR_IN));
        assert!(program.is_ok());
    }

    #[test]
    fn entry_point_names_are_resolved() {
        let program = ShaderProgram::build(&source(VS_POSITION, FS_WHITE)).unwrap();
        assert_eq!(program.vertex_entry(), "vs_main");
        assert_eq!(program.fragment_entry(), "fs_main");
    }

    // ── compile failures ──────────────────────────────────────────────────

    #[test]
    fn malformed_vertex_source_fails_with_stage_and_log() {
        let err = ShaderProgram::build(&source(VS_MALFORMED, FS_WHITE)).unwrap_err();
        match err {
            ShaderBuildError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected a vertex compile error, got {other:?}"),
        }
    }

    #[test]
    fn vertex_failure_is_reported_even_when_fragment_is_also_broken() {
        // The vertex stage compiles first; its failure is terminal and the
        // fragment stage is never blamed.
        let err = ShaderProgram::build(&source(VS_MALFORMED, VS_MALFORMED)).unwrap_err();
        assert!(matches!(
            err,
            ShaderBuildError::Compile { stage: ShaderStage::Vertex, .. }
        ));
    }

    #[test]
    fn malformed_fragment_source_is_attributed_to_fragment() {
        let err = ShaderProgram::build(&source(VS_POSITION, "not wgsl")).unwrap_err();
        assert!(matches!(
            err,
            ShaderBuildError::Compile { stage: ShaderStage::Fragment, .. }
        ));
    }

    // ── link failures ─────────────────────────────────────────────────────

    #[test]
    fn missing_entry_point_fails_link() {
        // FS_WHITE used as a vertex stage parses but declares no @vertex.
        let err = ShaderProgram::build(&source(FS_WHITE, FS_WHITE)).unwrap_err();
        match err {
            ShaderBuildError::Link { log } => assert!(log.contains("entry point")),
            other => panic!("expected a link error, got {other:?}"),
        }
    }

    #[test]
    fn unfed_fragment_input_fails_link() {
        let err = ShaderProgram::build(&source(VS_POSITION, FS_COLOR_IN)).unwrap_err();
        match err {
            ShaderBuildError::Link { log } => assert!(log.contains("location 0")),
            other => panic!("expected a link error, got {other:?}"),
        }
    }

    #[test]
    fn varying_type_mismatch_fails_link() {
        let err = ShaderProgram::build(&source(VS_WITH_COLOR_OUT, FS_COLOR_IN_VEC4)).unwrap_err();
        assert!(matches!(err, ShaderBuildError::Link { .. }));
    }

    // ── uniform resolution ────────────────────────────────────────────────

    #[test]
    fn declared_uniform_resolves_to_its_slot() {
        let mut program = ShaderProgram::build(&source(VS_POSITION, FS_TINT)).unwrap();
        let binding = program.uniform_location("tint").expect("tint should resolve");
        assert_eq!(binding.group, 0);
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.size, 16);
    }

    #[test]
    fn unknown_uniform_is_a_cached_none() {
        let mut program = ShaderProgram::build(&source(VS_POSITION, FS_TINT)).unwrap();
        assert_eq!(program.uniform_location("missing"), None);
        // The miss is memoized, not retried.
        assert!(program.uniform_cache.contains_key("missing"));
        assert_eq!(program.uniform_location("missing"), None);
    }

    #[test]
    fn uniform_lookup_is_memoized() {
        let mut program = ShaderProgram::build(&source(VS_POSITION, FS_TINT)).unwrap();
        assert!(program.uniform_cache.is_empty());
        let first = program.uniform_location("tint");
        assert!(program.uniform_cache.contains_key("tint"));
        let second = program.uniform_location("tint");
        assert_eq!(first, second);
    }

    #[test]
    fn uniform_bindings_enumerates_declared_slots() {
        let program = ShaderProgram::build(&source(VS_POSITION, FS_TINT)).unwrap();
        let bindings = program.uniform_bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name, "tint");
    }

    #[test]
    fn programs_without_uniforms_have_no_bindings() {
        let program = ShaderProgram::build(&source(VS_POSITION, FS_WHITE)).unwrap();
        assert!(program.uniform_bindings().is_empty());
    }
}
