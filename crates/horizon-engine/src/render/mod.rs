//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers) and record into the
//! per-frame [`RenderTarget`] handed out by `core::FrameCtx::render`.
//!
//! Convention:
//! - world space is right-handed, +Y up
//! - depth is standard (near = 0, far = 1), cleared to 1.0

mod ctx;
mod targets;

pub use ctx::{RenderCtx, RenderTarget};
pub use targets::AttachmentTargets;
