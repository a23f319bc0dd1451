/// Renderer-facing context (device/queue + surface description).
///
/// This is intentionally small and stable.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub sample_count: u32,
    /// Drawable size in physical pixels.
    pub size: (u32, u32),
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        size: (u32, u32),
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            depth_format,
            sample_count,
            size,
        }
    }

    /// Width / height of the drawable, 1.0 when either side is zero.
    #[inline]
    pub fn aspect(&self) -> f32 {
        let (w, h) = self.size;
        if w == 0 || h == 0 { 1.0 } else { w as f32 / h as f32 }
    }
}

/// Target for drawing (encoder + swapchain color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
