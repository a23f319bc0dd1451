use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{InputEvent, InputFrame, InputState, Key, KeyState, MouseWheelDelta};
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Hide and grab the cursor so raw mouse motion drives the camera.
    pub capture_cursor: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "horizon".to_string(),
            initial_size: LogicalSize::new(1600.0, 1200.0),
            capture_cursor: true,
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn capture_cursor(&mut self, captured: bool) {
        self.commands.push(Command::CaptureCursor(captured));
    }
}

enum Command {
    CaptureCursor(bool),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the event loop until the window closes or the app exits.
    ///
    /// Returns the first fatal runtime error (window or GPU creation), otherwise
    /// whatever `App::on_exit` reports.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        // Normally done in `exiting`; covers loops that stop without that callback.
        let app_result = state.shutdown();

        match state.fatal.take() {
            Some(err) => Err(err),
            None => app_result,
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
    app_result: Option<Result<()>>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            exit_requested: false,
            fatal: None,
            app_result: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        if self.config.capture_cursor {
            set_cursor_captured(&window, true);
        }

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            input_state: InputState::new(window.has_focus()),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()?;

        self.window = Some(entry);
        Ok(())
    }

    /// Lets the app release its resources, then drops the window and GPU.
    fn shutdown(&mut self) -> Result<()> {
        if self.app_result.is_none() {
            self.app_result = Some(self.app.on_exit());
        }
        self.window = None;
        self.app_result.take().unwrap_or(Ok(()))
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::CaptureCursor(captured) => {
                    if let Some(entry) = self.window.as_ref() {
                        entry.with_window(|w| set_cursor_captured(w, captured));
                    }
                }
                Command::Exit => self.request_exit(event_loop),
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let mut runtime_ctx = RuntimeCtx::default();
        let mut app_control = AppControl::Continue;

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        entry.with_mut(|fields| {
            let ft: FrameTime = fields.clock.tick();

            {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        id: fields.window.id(),
                        window: fields.window,
                    },
                    gpu: fields.gpu,
                    input: fields.input_state,
                    input_frame: fields.input_frame,
                    time: ft,
                    runtime: &mut runtime_ctx,
                };

                app_control = app.on_frame(&mut ctx);
            }

            // Per-frame deltas are consumed; start the next frame clean.
            fields.input_frame.clear();
        });

        if app_control == AppControl::Exit {
            runtime_ctx.exit();
        }

        self.apply_commands(event_loop, runtime_ctx);
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.fatal = Some(e);
            self.request_exit(event_loop);
            return;
        }

        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw; Fifo presentation paces the loop.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let DeviceEvent::MouseMotion { delta } = event else {
            return;
        };
        let Some(entry) = self.window.as_mut() else {
            return;
        };

        entry.with_mut(|fields| {
            fields
                .input_state
                .apply_raw_motion(fields.input_frame, delta.0 as f32, delta.1 as f32);
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let capture_cursor = self.config.capture_cursor;
        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        let mut exit_from_app_event = false;

        entry.with_mut(|fields| {
            if let Some(ev) = translate_input_event(&event) {
                if capture_cursor && ev == InputEvent::Focused(true) {
                    set_cursor_captured(fields.window, true);
                }
                fields.input_state.apply_event(fields.input_frame, ev);
            }

            if app.on_window_event(&event) == AppControl::Exit {
                exit_from_app_event = true;
            }
        });

        if exit_from_app_event {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let result = self.shutdown();
        self.app_result = Some(result);
    }
}

fn set_cursor_captured(window: &Window, captured: bool) {
    if captured {
        // Locked is ideal for mouse look; not every platform supports it.
        if window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::Confined) {
                log::warn!("cursor grab unavailable: {e}");
            }
        }
        window.set_cursor_visible(false);
    } else {
        let _ = window.set_cursor_grab(CursorGrabMode::None);
        window.set_cursor_visible(true);
    }
}

fn translate_input_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x: *x, y: *y },
                MouseScrollDelta::PixelDelta(p) => MouseWheelDelta::Pixel {
                    x: p.x as f32,
                    y: p.y as f32,
                },
            };
            Some(InputEvent::MouseWheel { delta })
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };

            Some(InputEvent::Key {
                key: map_key(event.physical_key),
                state,
                repeat: event.repeat,
            })
        }

        _ => None,
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        // NativeKeyCode has no stable numeric form in winit 0.30.
        return Key::Unknown(0);
    };

    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Space => Key::Space,

        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        other => Key::Unknown(other as u32),
    }
}
