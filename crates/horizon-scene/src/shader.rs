//! Shader sources, linking and per-layer programs with partial reload.
//!
//! A layer's program is built from three WGSL files: the shared prelude
//! `common.wgsl` (uniform block), `<layer>.vs.wgsl` and `<layer>.fs.wgsl`.
//! [`link`] concatenates and validates them with naga so that errors carry
//! source locations instead of surfacing as device errors. Beyond naga's
//! per-module checks it also verifies what the pipeline will bind: stage
//! interface, vertex buffers and the uniform block.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::layer::{Layer, VertexInput};
use crate::params::LayerUniforms;

pub const PRELUDE_FILE: &str = "common.wgsl";
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{layer} shader failed to parse:\n{message}")]
    Parse { layer: &'static str, message: String },

    #[error("{layer} shader failed validation: {message}")]
    Validation { layer: &'static str, message: String },

    #[error("{layer} shader has no `{entry}` entry point")]
    MissingEntryPoint {
        layer: &'static str,
        entry: &'static str,
    },

    #[error("{layer} shader does not fit its pipeline: {message}")]
    Interface { layer: &'static str, message: String },

    #[error("{layer} pipeline rejected by the device: {message}")]
    Pipeline { layer: &'static str, message: String },
}

/// Source files for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub prelude: PathBuf,
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

/// Locates shader files on disk. Files are re-read on every compile.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    dir: PathBuf,
}

impl ShaderLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self, layer: Layer) -> ShaderPaths {
        ShaderPaths {
            prelude: self.dir.join(PRELUDE_FILE),
            vertex: self.dir.join(format!("{}.vs.wgsl", layer.name())),
            fragment: self.dir.join(format!("{}.fs.wgsl", layer.name())),
        }
    }
}

/// Validated WGSL for one layer.
#[derive(Debug)]
pub struct LinkedShader {
    pub source: String,
    pub module: naga::Module,
}

fn read(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads, concatenates and validates a layer's sources.
pub fn link(layer: Layer, paths: &ShaderPaths) -> Result<LinkedShader, ShaderError> {
    let mut source = read(&paths.prelude)?;
    for path in [&paths.vertex, &paths.fragment] {
        source.push('\n');
        source.push_str(&read(path)?);
    }
    link_source(layer, source)
}

/// Validates already concatenated WGSL for `layer`.
pub fn link_source(layer: Layer, source: String) -> Result<LinkedShader, ShaderError> {
    let name = layer.name();

    let module = naga::front::wgsl::parse_str(&source).map_err(|e| ShaderError::Parse {
        layer: name,
        message: e.emit_to_string(&source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Validation {
        layer: name,
        message: e.into_inner().to_string(),
    })?;

    for (entry, stage) in [
        (VERTEX_ENTRY, naga::ShaderStage::Vertex),
        (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.name == entry && ep.stage == stage);
        if !found {
            return Err(ShaderError::MissingEntryPoint { layer: name, entry });
        }
    }

    check_interface(layer, &module).map_err(|message| ShaderError::Interface {
        layer: name,
        message,
    })?;

    Ok(LinkedShader { source, module })
}

/// `@location` slots of an entry point argument or result, looking through
/// IO structs.
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.insert(*location);
                    }
                }
            }
        }
    }
}

fn entry_point<'m>(module: &'m naga::Module, name: &str) -> Option<&'m naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.name == name)
}

fn inputs(module: &naga::Module, ep: &naga::EntryPoint) -> BTreeSet<u32> {
    let mut set = BTreeSet::new();
    for arg in &ep.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut set);
    }
    set
}

fn outputs(module: &naga::Module, ep: &naga::EntryPoint) -> BTreeSet<u32> {
    let mut set = BTreeSet::new();
    if let Some(result) = &ep.function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut set);
    }
    set
}

/// Checks the module against the fixed pipeline shape: the vertex stage reads
/// only the layer's buffer, every fragment input is written by the vertex
/// stage, and the only resource is the layer uniform block.
fn check_interface(layer: Layer, module: &naga::Module) -> Result<(), String> {
    let (Some(vs), Some(fs)) = (
        entry_point(module, VERTEX_ENTRY),
        entry_point(module, FRAGMENT_ENTRY),
    ) else {
        return Err("entry points missing".into());
    };

    let expected: BTreeSet<u32> = match layer.vertex_input() {
        VertexInput::Procedural => BTreeSet::new(),
        VertexInput::PerVertex | VertexInput::PerInstance => BTreeSet::from([0]),
    };
    let vs_in = inputs(module, vs);
    if vs_in != expected {
        return Err(format!(
            "{VERTEX_ENTRY} reads locations {vs_in:?}, the pipeline provides {expected:?}"
        ));
    }

    let vs_out = outputs(module, vs);
    if let Some(missing) = inputs(module, fs).difference(&vs_out).next() {
        return Err(format!(
            "{FRAGMENT_ENTRY} reads @location({missing}) which {VERTEX_ENTRY} never writes"
        ));
    }

    let mut layouter = naga::proc::Layouter::default();
    layouter
        .update(module.to_ctx())
        .map_err(|e| format!("type layout: {e}"))?;

    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };
        if binding.group != 0 || binding.binding != 0 {
            return Err(format!(
                "unexpected resource at @group({}) @binding({})",
                binding.group, binding.binding
            ));
        }
        if var.space != naga::AddressSpace::Uniform {
            return Err("@group(0) @binding(0) must be a uniform block".into());
        }
        let size = layouter[var.ty].size as usize;
        let bound = std::mem::size_of::<LayerUniforms>();
        if size > bound {
            return Err(format!("uniform block is {size} bytes, only {bound} are bound"));
        }
    }

    Ok(())
}

/// Turns shader sources into a backend program.
pub trait ShaderCompiler {
    type Program;

    fn compile_and_link(
        &mut self,
        layer: Layer,
        paths: &ShaderPaths,
    ) -> Result<Self::Program, ShaderError>;
}

/// Outcome of a reload: layers whose program was replaced, and layers that
/// kept their previous program.
#[derive(Debug, Default)]
pub struct ReloadReport {
    pub replaced: Vec<Layer>,
    pub failed: Vec<(Layer, ShaderError)>,
}

impl ReloadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One program per layer. Every slot always holds a valid program.
#[derive(Debug)]
pub struct ShaderSet<P> {
    programs: Vec<P>,
}

impl<P> ShaderSet<P> {
    /// Compiles every layer. Any failure aborts with the first error.
    pub fn compile_all<C>(compiler: &mut C, library: &ShaderLibrary) -> Result<Self, ShaderError>
    where
        C: ShaderCompiler<Program = P>,
    {
        let programs = Layer::ORDER
            .iter()
            .map(|&layer| compiler.compile_and_link(layer, &library.paths(layer)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { programs })
    }

    /// Recompiles every layer, replacing only the programs that succeed.
    pub fn reload<C>(&mut self, compiler: &mut C, library: &ShaderLibrary) -> ReloadReport
    where
        C: ShaderCompiler<Program = P>,
    {
        let mut report = ReloadReport::default();
        for layer in Layer::ORDER {
            match compiler.compile_and_link(layer, &library.paths(layer)) {
                Ok(program) => {
                    self.programs[layer.index()] = program;
                    report.replaced.push(layer);
                }
                Err(e) => report.failed.push((layer, e)),
            }
        }
        report
    }

    pub fn get(&self, layer: Layer) -> &P {
        &self.programs[layer.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn bundled() -> ShaderLibrary {
        ShaderLibrary::new(SceneConfig::default().shader_dir)
    }

    struct Counting {
        next: u32,
        fail: Option<Layer>,
    }

    impl ShaderCompiler for Counting {
        type Program = u32;

        fn compile_and_link(&mut self, layer: Layer, _: &ShaderPaths) -> Result<u32, ShaderError> {
            if self.fail == Some(layer) {
                return Err(ShaderError::Parse {
                    layer: layer.name(),
                    message: "boom".into(),
                });
            }
            self.next += 1;
            Ok(self.next)
        }
    }

    // ── linking ───────────────────────────────────────────────────────────

    #[test]
    fn every_bundled_layer_links() {
        let lib = bundled();
        for layer in Layer::ORDER {
            if let Err(e) = link(layer, &lib.paths(layer)) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn paths_follow_layer_names() {
        let lib = ShaderLibrary::new("/shaders");
        let p = lib.paths(Layer::Stars);
        assert_eq!(p.prelude, PathBuf::from("/shaders/common.wgsl"));
        assert_eq!(p.vertex, PathBuf::from("/shaders/star.vs.wgsl"));
        assert_eq!(p.fragment, PathBuf::from("/shaders/star.fs.wgsl"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let lib = ShaderLibrary::new("/definitely/not/here");
        let err = link(Layer::Sun, &lib.paths(Layer::Sun)).unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
    }

    // ── pipeline interface ────────────────────────────────────────────────

    const PRELUDE: &str = include_str!("../shaders/common.wgsl");

    fn with_prelude(stages: &[&str]) -> String {
        let mut source = PRELUDE.to_string();
        for stage in stages {
            source.push('\n');
            source.push_str(stage);
        }
        source
    }

    #[test]
    fn fragment_input_not_written_by_vertex_stage_is_rejected() {
        let fs = r#"
@fragment
fn fs_main(v: VsOut, @location(3) extra: vec4<f32>) -> @location(0) vec4<f32> {
    return extra;
}
"#;
        let source = with_prelude(&[include_str!("../shaders/sun.vs.wgsl"), fs]);
        let err = link_source(Layer::Sun, source).unwrap_err();
        assert!(matches!(err, ShaderError::Interface { layer: "sun", .. }), "{err}");
        assert!(err.to_string().contains("@location(3)"), "{err}");
    }

    #[test]
    fn procedural_layer_reading_a_vertex_buffer_is_rejected() {
        let vs = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return to_clip(position);
}
"#;
        let fs = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let err = link_source(Layer::Sun, with_prelude(&[vs, fs])).unwrap_err();
        assert!(matches!(err, ShaderError::Interface { .. }), "{err}");

        // The same stages fit a layer fed from a vertex buffer.
        assert!(link_source(Layer::Mountains, with_prelude(&[vs, fs])).is_ok());
    }

    #[test]
    fn uniform_block_larger_than_layer_uniforms_is_rejected() {
        let grown = PRELUDE.replace(
            "scale_factor: f32,\n",
            "scale_factor: f32,\n    extra: vec4<f32>,\n",
        );
        assert_ne!(grown, PRELUDE);
        let mut source = grown;
        for stage in [
            include_str!("../shaders/sun.vs.wgsl"),
            include_str!("../shaders/sun.fs.wgsl"),
        ] {
            source.push('\n');
            source.push_str(stage);
        }
        let err = link_source(Layer::Sun, source).unwrap_err();
        assert!(err.to_string().contains("uniform block"), "{err}");
    }

    #[test]
    fn second_resource_binding_is_rejected() {
        let fs = r#"
@group(0) @binding(1)
var<uniform> tint: vec4<f32>;

@fragment
fn fs_main(v: VsOut) -> @location(0) vec4<f32> {
    return tint;
}
"#;
        let source = with_prelude(&[include_str!("../shaders/sun.vs.wgsl"), fs]);
        let err = link_source(Layer::Sun, source).unwrap_err();
        assert!(matches!(err, ShaderError::Interface { .. }), "{err}");
    }

    // ── reload ────────────────────────────────────────────────────────────

    #[test]
    fn compile_all_fails_on_any_layer() {
        let mut c = Counting { next: 0, fail: Some(Layer::Grid) };
        assert!(ShaderSet::compile_all(&mut c, &bundled()).is_err());
    }

    #[test]
    fn reload_keeps_failed_layer() {
        let lib = bundled();
        let mut c = Counting { next: 0, fail: None };
        let mut set = ShaderSet::compile_all(&mut c, &lib).unwrap();
        assert_eq!(*set.get(Layer::Mountains), 4);

        c.fail = Some(Layer::Mountains);
        let report = set.reload(&mut c, &lib);

        assert_eq!(report.replaced.len(), 4);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Layer::Mountains);
        assert_eq!(*set.get(Layer::Mountains), 4);
        assert_eq!(*set.get(Layer::Skybox), 6);
        assert_eq!(*set.get(Layer::Grid), 9);
    }
}
