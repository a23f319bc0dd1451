use glam::Vec3;
use wgpu::util::DeviceExt;

use horizon_engine::render::RenderCtx;

use crate::orchestrator::SceneGeometry;

/// Size of one position in a vertex buffer.
pub const POSITION_STRIDE: u64 = std::mem::size_of::<[f32; 3]>() as u64;

/// Immutable vertex buffer plus the number of positions it holds.
#[derive(Debug)]
pub struct VertexStream {
    pub buffer: wgpu::Buffer,
    pub count: u32,
}

impl VertexStream {
    pub fn upload(ctx: &RenderCtx<'_>, label: &str, positions: &[Vec3]) -> Self {
        let raw: Vec<[f32; 3]> = positions.iter().map(|p| p.to_array()).collect();

        // Zero-sized buffers cannot be bound; keep one dummy element around.
        let contents: &[[f32; 3]] = if raw.is_empty() { &[[0.0; 3]] } else { &raw };

        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(contents),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            count: raw.len() as u32,
        }
    }
}

/// Uploads stars (per-instance) and ridge (per-vertex) positions.
pub fn upload(ctx: &RenderCtx<'_>, stars: &[Vec3], ridge: &[Vec3]) -> SceneGeometry<VertexStream> {
    let stars = VertexStream::upload(ctx, "horizon star instances", stars);
    let ridge = VertexStream::upload(ctx, "horizon ridge vertices", ridge);
    log::debug!(
        "uploaded {} star instances, {} ridge vertices",
        stars.count,
        ridge.count
    );

    SceneGeometry {
        star_count: stars.count,
        ridge_vertex_count: ridge.count,
        stars,
        ridge,
    }
}
