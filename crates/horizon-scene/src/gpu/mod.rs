//! wgpu implementation of the compile and draw seams.
//!
//! - [`WgpuCompiler`] turns validated WGSL into one render pipeline per layer
//! - [`geometry`] uploads the star and ridge buffers once
//! - [`GpuBackend`] owns per-layer uniforms and records the frame's pass

mod backend;
mod compiler;
pub mod geometry;

pub use backend::GpuBackend;
pub use compiler::{GpuProgram, WgpuCompiler};
pub use geometry::VertexStream;
