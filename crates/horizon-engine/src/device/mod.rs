//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - resolving the multisample count the surface format supports
//! - acquiring frames and providing encoders/views for rendering

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
