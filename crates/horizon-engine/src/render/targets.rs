use super::RenderCtx;

/// Size-dependent attachments for a 3D pass: depth buffer plus, when
/// multisampling, the MSAA color buffer that resolves into the swapchain.
///
/// Recreated lazily when the drawable size or sample count changes.
pub struct AttachmentTargets {
    depth: wgpu::TextureView,
    msaa_color: Option<wgpu::TextureView>,
    size: (u32, u32),
    sample_count: u32,
}

impl AttachmentTargets {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let size = (ctx.size.0.max(1), ctx.size.1.max(1));
        let extent = wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        };

        let depth = ctx
            .device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("horizon depth"),
                size: extent,
                mip_level_count: 1,
                sample_count: ctx.sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: ctx.depth_format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default());

        let msaa_color = (ctx.sample_count > 1).then(|| {
            ctx.device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("horizon msaa color"),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: ctx.sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: ctx.surface_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        Self {
            depth,
            msaa_color,
            size,
            sample_count: ctx.sample_count,
        }
    }

    /// Rebuilds the attachments if the drawable changed. No-op otherwise.
    pub fn ensure(&mut self, ctx: &RenderCtx<'_>) {
        let size = (ctx.size.0.max(1), ctx.size.1.max(1));
        if self.size == size && self.sample_count == ctx.sample_count {
            return;
        }
        log::debug!("recreating attachments at {}x{}", size.0, size.1);
        *self = Self::new(ctx);
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth
    }

    /// Returns `(view, resolve_target)` for the color attachment.
    pub fn color_attachment<'a>(
        &'a self,
        swapchain: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa_color {
            Some(msaa) => (msaa, Some(swapchain)),
            None => (swapchain, None),
        }
    }
}
