use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for raw window events, after the runtime has updated input state.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once when the loop stops, before the window and GPU are torn down.
    ///
    /// Release GPU resources here. The returned error becomes the result of
    /// `Runtime::run`, which lets the app report why it asked to exit.
    fn on_exit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
