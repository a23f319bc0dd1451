/// Represents a single acquired swapchain image.
///
/// Short-lived: holding the surface texture prevents acquisition of the next
/// frame, so it must be submitted within the same callback.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
