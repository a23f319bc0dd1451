use std::time::Instant;

use anyhow::{anyhow, Context, Result};

use horizon_engine::core::{App, AppControl, FrameCtx};
use horizon_engine::input::{InputFrame, InputState, Key};
use horizon_engine::time::{fps_title, FrameTimes};

use crate::camera::{Direction, FlyCamera};
use crate::config::SceneConfig;
use crate::gpu::{geometry, GpuBackend, GpuProgram, VertexStream, WgpuCompiler};
use crate::mountains;
use crate::orchestrator::{FrameInputs, Orchestrator, RenderState};
use crate::shader::ShaderLibrary;
use crate::stars::StarField;

/// Frame durations kept for the title bar average.
const FRAME_SAMPLES: usize = 100;

const MOVE_KEYS: [(Key, Direction); 4] = [
    (Key::W, Direction::Forward),
    (Key::S, Direction::Back),
    (Key::A, Direction::Left),
    (Key::D, Direction::Right),
];

/// Requests raised by this frame's input.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
struct Controls {
    quit: bool,
    reload: bool,
}

/// Applies held keys, mouse motion and wheel to the camera.
///
/// Mouse y grows downwards on screen; it is flipped so moving the mouse up
/// looks up.
fn apply_controls(
    camera: &mut FlyCamera,
    input: &InputState,
    frame: &InputFrame,
    dt: f32,
) -> Controls {
    for (key, direction) in MOVE_KEYS {
        if input.key_down(key) {
            camera.move_in(direction, dt);
        }
    }

    let (dx, dy) = frame.mouse_delta;
    if dx != 0.0 || dy != 0.0 {
        camera.process_look_delta(dx, -dy);
    }

    if frame.wheel_lines != 0.0 {
        camera.adjust_fov(-frame.wheel_lines);
    }

    Controls {
        quit: frame.key_pressed(Key::Escape),
        reload: frame.key_released(Key::R),
    }
}

struct GpuState {
    compiler: WgpuCompiler,
    backend: GpuBackend,
}

/// The landscape viewer, driven by the engine runtime.
pub struct SceneApp {
    config: SceneConfig,
    camera: FlyCamera,
    orchestrator: Orchestrator<GpuProgram, VertexStream>,
    gpu: Option<GpuState>,
    frame_times: FrameTimes<FRAME_SAMPLES>,
    fatal: Option<anyhow::Error>,
}

impl SceneApp {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            camera: FlyCamera::new(&config.camera),
            orchestrator: Orchestrator::new(config.layers.clone()),
            gpu: None,
            frame_times: FrameTimes::new(),
            fatal: None,
            config,
        }
    }

    /// Generates geometry, uploads it and compiles every layer.
    fn initialize(&mut self, ctx: &FrameCtx<'_, '_>) -> Result<()> {
        let rctx = ctx.render_ctx();

        let stars = StarField::generate(&self.config.stars);
        let ridge = mountains::generate_with(&self.config.ridge);

        let mut compiler = WgpuCompiler::new(&rctx);
        let geometry = geometry::upload(&rctx, stars.positions(), &ridge);

        self.orchestrator
            .initialize(
                &mut compiler,
                ShaderLibrary::new(&self.config.shader_dir),
                geometry,
            )
            .context("initial shader compilation failed")?;

        let backend = GpuBackend::new(&rctx, &compiler);
        self.gpu = Some(GpuState { compiler, backend });
        Ok(())
    }

    fn fail(&mut self, err: anyhow::Error) -> AppControl {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.orchestrator.shutdown();
        AppControl::Exit
    }
}

impl App for SceneApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.orchestrator.state() == RenderState::Initializing {
            if let Err(e) = self.initialize(ctx) {
                return self.fail(e);
            }
        }

        // Shader compilation and uploads stay out of the frame time.
        let started = Instant::now();

        let controls = apply_controls(&mut self.camera, ctx.input, ctx.input_frame, ctx.time.dt);

        if controls.quit {
            log::info!("escape pressed; shutting down");
            self.orchestrator.shutdown();
            return AppControl::Exit;
        }

        if controls.reload {
            if let Some(gpu) = self.gpu.as_mut() {
                self.orchestrator.reload(&mut gpu.compiler);
            }
        }

        let (width, height) = ctx.window.physical_size();
        let inputs = FrameInputs {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(width, height),
            camera_pos: self.camera.position(),
            time: ctx.time.elapsed,
        };

        let Some(gpu) = self.gpu.as_mut() else {
            return AppControl::Continue;
        };
        let orchestrator = &self.orchestrator;

        let control = ctx.render(|rctx, target| {
            gpu.backend.render(rctx, target, orchestrator, &inputs);
        });

        if control == AppControl::Exit {
            return self.fail(anyhow!("surface is no longer usable"));
        }

        self.frame_times.push(started.elapsed().as_secs_f32());
        if let Some(fps) = self.frame_times.average_fps() {
            ctx.window.set_title(&fps_title(fps));
        }

        AppControl::Continue
    }

    fn on_exit(&mut self) -> Result<()> {
        self.orchestrator.shutdown();
        // Pipelines and buffers go before the device does.
        self.gpu = None;

        match self.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use horizon_engine::input::{InputEvent, KeyState, MouseWheelDelta};

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, repeat: false }
    }

    fn feed(events: &[InputEvent]) -> (InputState, InputFrame) {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        for ev in events {
            state.apply_event(&mut frame, ev.clone());
        }
        (state, frame)
    }

    #[test]
    fn held_w_moves_forward() {
        let mut cam = FlyCamera::default();
        let (state, frame) = feed(&[key(Key::W, KeyState::Pressed)]);
        apply_controls(&mut cam, &state, &frame, 1.0);
        assert!(cam.position().z < 0.0);
        assert!(cam.position().x.abs() < 1e-4);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut cam = FlyCamera::default();
        let (state, frame) = feed(&[
            key(Key::A, KeyState::Pressed),
            key(Key::D, KeyState::Pressed),
        ]);
        apply_controls(&mut cam, &state, &frame, 1.0);
        assert!((cam.position() - Vec3::ZERO).length() < 1e-4);
    }

    #[test]
    fn mouse_up_looks_up() {
        let mut cam = FlyCamera::default();
        let (state, frame) = feed(&[InputEvent::MouseMotion { dx: 0.0, dy: -20.0 }]);
        apply_controls(&mut cam, &state, &frame, 0.0);
        assert!(cam.pitch_deg() > 0.0);
    }

    #[test]
    fn wheel_up_zooms_in() {
        let mut cam = FlyCamera::default();
        let before = cam.fov_deg();
        let (state, frame) = feed(&[InputEvent::MouseWheel {
            delta: MouseWheelDelta::Line { x: 0.0, y: 2.0 },
        }]);
        apply_controls(&mut cam, &state, &frame, 0.0);
        assert_eq!(cam.fov_deg(), before - 2.0);
    }

    #[test]
    fn escape_press_quits_and_r_release_reloads() {
        let mut cam = FlyCamera::default();

        let (state, frame) = feed(&[key(Key::Escape, KeyState::Pressed)]);
        let c = apply_controls(&mut cam, &state, &frame, 0.0);
        assert_eq!(c, Controls { quit: true, reload: false });

        // Pressing R alone does not reload; releasing it does.
        let (state, frame) = feed(&[key(Key::R, KeyState::Pressed)]);
        assert!(!apply_controls(&mut cam, &state, &frame, 0.0).reload);

        let mut state = state;
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::R, KeyState::Released));
        assert!(apply_controls(&mut cam, &state, &frame, 0.0).reload);
    }
}
