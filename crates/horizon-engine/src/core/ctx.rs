use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Window handle and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the drawable size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:      WindowCtx<'a>,
    pub gpu:         &'a mut Gpu<'w>,
    pub input:       &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time:        FrameTime,
    pub runtime:     &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Builds a [`RenderCtx`] for resource creation outside of a frame.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        let size = self.gpu.size();
        RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.gpu.depth_format(),
            self.gpu.sample_count(),
            (size.width, size.height),
        )
    }

    /// Acquires the next swapchain image, calls `draw` with a ready
    /// [`RenderCtx`] and [`RenderTarget`], then presents.
    ///
    /// `draw` owns the clear: the swapchain image arrives with undefined contents.
    /// Surface errors are handled here; only a fatal one yields `AppControl::Exit`.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            // Minimized: nothing to present.
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::warn!("surface error: {err}");
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.gpu.depth_format(),
            self.gpu.sample_count(),
            (size.width, size.height),
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
