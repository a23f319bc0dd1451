//! Frame orchestration: which layers are drawn, in what order, with which
//! parameters, plus the shader lifecycle around it.
//!
//! The orchestrator never talks to the GPU. It hands programs, parameters and
//! geometry to a [`DrawSink`] and gets programs from a [`ShaderCompiler`], so
//! the whole frame can be checked with recording fakes.

use glam::{Mat4, Vec3};

use crate::config::LayerSettings;
use crate::layer::{DrawCall, Layer};
use crate::params::{self, ShaderParams};
use crate::shader::{ReloadReport, ShaderCompiler, ShaderError, ShaderLibrary, ShaderSet};

/// Vertices in the procedural unit cube of the skybox.
pub const SKYBOX_VERTICES: u32 = 36;
/// Vertices in a procedural quad (sun, star billboard, grid).
pub const QUAD_VERTICES: u32 = 6;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderState {
    Initializing,
    Running,
    ReloadingShaders,
    ShuttingDown,
}

/// Per-frame values shared by every layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameInputs {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_pos: Vec3,
    /// Seconds since startup.
    pub time: f32,
}

/// Static geometry, uploaded once. `G` is the backend's buffer handle.
#[derive(Debug)]
pub struct SceneGeometry<G> {
    pub stars: G,
    pub star_count: u32,
    pub ridge: G,
    pub ridge_vertex_count: u32,
}

/// Receives one draw per layer, in order.
pub trait DrawSink {
    type Program;
    type Geometry;

    fn draw_layer(
        &mut self,
        layer: Layer,
        program: &Self::Program,
        params: &ShaderParams,
        geometry: Option<&Self::Geometry>,
        call: DrawCall,
    );
}

pub struct Orchestrator<P, G> {
    state: RenderState,
    settings: LayerSettings,
    library: Option<ShaderLibrary>,
    shaders: Option<ShaderSet<P>>,
    geometry: Option<SceneGeometry<G>>,
}

impl<P, G> Orchestrator<P, G> {
    pub fn new(settings: LayerSettings) -> Self {
        Self {
            state: RenderState::Initializing,
            settings,
            library: None,
            shaders: None,
            geometry: None,
        }
    }

    #[inline]
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Compiles every layer and takes ownership of the static geometry.
    ///
    /// On error the orchestrator stays in `Initializing` and draws nothing.
    pub fn initialize<C>(
        &mut self,
        compiler: &mut C,
        library: ShaderLibrary,
        geometry: SceneGeometry<G>,
    ) -> Result<(), ShaderError>
    where
        C: ShaderCompiler<Program = P>,
    {
        if self.state != RenderState::Initializing {
            log::warn!("initialize called in state {:?}; ignored", self.state);
            return Ok(());
        }

        let shaders = ShaderSet::compile_all(compiler, &library)?;
        log::info!(
            "scene ready: {} stars, {} ridge vertices, shaders from {}",
            geometry.star_count,
            geometry.ridge_vertex_count,
            library.dir().display()
        );

        self.shaders = Some(shaders);
        self.geometry = Some(geometry);
        self.library = Some(library);
        self.state = RenderState::Running;
        Ok(())
    }

    /// Recompiles every layer, keeping the old program wherever compilation
    /// fails. Returns `None` outside of `Running`.
    pub fn reload<C>(&mut self, compiler: &mut C) -> Option<ReloadReport>
    where
        C: ShaderCompiler<Program = P>,
    {
        if self.state != RenderState::Running {
            return None;
        }
        let (Some(shaders), Some(library)) = (self.shaders.as_mut(), self.library.as_ref()) else {
            return None;
        };

        self.state = RenderState::ReloadingShaders;
        let report = shaders.reload(compiler, library);
        self.state = RenderState::Running;

        for (layer, err) in &report.failed {
            log::error!("keeping previous {layer} shader: {err}");
        }
        if report.is_clean() {
            log::info!("reloaded {} shaders", report.replaced.len());
        }

        Some(report)
    }

    /// Parameters bound for `layer` this frame.
    pub fn layer_params(&self, layer: Layer, frame: &FrameInputs) -> ShaderParams {
        let mut p = ShaderParams::new();
        p.set_mat4(params::VIEW, frame.view);
        p.set_mat4(params::PROJECTION, frame.projection);
        p.set_vec3(params::CAMERA_POS, frame.camera_pos);

        match layer {
            Layer::Sun => {
                p.set_float(params::TIME, frame.time);
                p.set_float(params::SCALE_FACTOR, self.settings.sun_scale);
                p.set_vec3(
                    params::TRANSLATION,
                    self.settings.sun_offset + frame.camera_pos,
                );
            }
            Layer::Stars => {
                p.set_float(params::TIME, frame.time);
                p.set_float(params::SCALE_FACTOR, self.settings.star_scale);
            }
            Layer::Skybox | Layer::Mountains | Layer::Grid => {}
        }

        p
    }

    /// Draws every layer in [`Layer::ORDER`]. Does nothing unless `Running`.
    pub fn render_frame<S>(&self, sink: &mut S, frame: &FrameInputs) -> bool
    where
        S: DrawSink<Program = P, Geometry = G>,
    {
        if self.state != RenderState::Running {
            return false;
        }
        let (Some(shaders), Some(geometry)) = (self.shaders.as_ref(), self.geometry.as_ref()) else {
            return false;
        };

        for layer in Layer::ORDER {
            let (buffer, call) = match layer {
                Layer::Skybox => (
                    None,
                    DrawCall::Instanced { vertices: SKYBOX_VERTICES, instances: 1 },
                ),
                Layer::Sun | Layer::Grid => (
                    None,
                    DrawCall::Instanced { vertices: QUAD_VERTICES, instances: 1 },
                ),
                Layer::Stars => (
                    Some(&geometry.stars),
                    DrawCall::Instanced {
                        vertices: QUAD_VERTICES,
                        instances: geometry.star_count,
                    },
                ),
                Layer::Mountains => (
                    Some(&geometry.ridge),
                    DrawCall::Strip { vertices: geometry.ridge_vertex_count },
                ),
            };

            let params = self.layer_params(layer, frame);
            sink.draw_layer(layer, shaders.get(layer), &params, buffer, call);
        }

        true
    }

    /// Releases programs and geometry. Terminal.
    pub fn shutdown(&mut self) {
        if self.state == RenderState::ShuttingDown {
            return;
        }
        self.state = RenderState::ShuttingDown;
        self.shaders = None;
        self.geometry = None;
        log::info!("renderer shut down");
    }
}
