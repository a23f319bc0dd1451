use std::collections::HashSet;

use horizon_engine::render::{AttachmentTargets, RenderCtx, RenderTarget};

use crate::layer::{DrawCall, Layer};
use crate::orchestrator::{DrawSink, FrameInputs, Orchestrator};
use crate::params::{LayerUniforms, ShaderParams};

use super::compiler::{GpuProgram, WgpuCompiler};
use super::geometry::VertexStream;

/// Uniform buffer and bind group for one layer.
///
/// Every layer gets its own buffer: all uniform writes land before the pass
/// executes, so a shared buffer would hand every layer the last values.
struct LayerBinding {
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Frame-level GPU state: per-layer uniforms and size-dependent attachments.
pub struct GpuBackend {
    bindings: Vec<LayerBinding>,
    targets: AttachmentTargets,
    warned: HashSet<&'static str>,
}

impl GpuBackend {
    pub fn new(ctx: &RenderCtx<'_>, compiler: &WgpuCompiler) -> Self {
        let bindings = Layer::ORDER
            .iter()
            .map(|layer| {
                let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(format!("horizon {layer} ubo").as_str()),
                    size: std::mem::size_of::<LayerUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(format!("horizon {layer} bind group").as_str()),
                    layout: compiler.bind_group_layout(),
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    }],
                });

                LayerBinding { ubo, bind_group }
            })
            .collect();

        Self {
            bindings,
            targets: AttachmentTargets::new(ctx),
            warned: HashSet::new(),
        }
    }

    /// Clears to black and draws every layer into one pass.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        orchestrator: &Orchestrator<GpuProgram, VertexStream>,
        frame: &FrameInputs,
    ) {
        self.targets.ensure(ctx);
        let (color_view, resolve_target) = self.targets.color_attachment(target.color_view);

        let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("horizon scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    // The multisampled buffer is only needed until it resolves.
                    store: if resolve_target.is_some() {
                        wgpu::StoreOp::Discard
                    } else {
                        wgpu::StoreOp::Store
                    },
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.targets.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let mut sink = PassSink {
            pass: &mut pass,
            queue: ctx.queue,
            bindings: &self.bindings,
            warned: &mut self.warned,
        };
        orchestrator.render_frame(&mut sink, frame);
    }
}

/// Records layer draws into an open render pass.
struct PassSink<'p, 'r> {
    pass: &'p mut wgpu::RenderPass<'r>,
    queue: &'p wgpu::Queue,
    bindings: &'p [LayerBinding],
    warned: &'p mut HashSet<&'static str>,
}

impl DrawSink for PassSink<'_, '_> {
    type Program = GpuProgram;
    type Geometry = VertexStream;

    fn draw_layer(
        &mut self,
        layer: Layer,
        program: &GpuProgram,
        params: &ShaderParams,
        geometry: Option<&VertexStream>,
        call: DrawCall,
    ) {
        let binding = &self.bindings[layer.index()];

        let (uniforms, rejected) = LayerUniforms::pack(params);
        for name in rejected {
            if self.warned.insert(name) {
                log::warn!("{layer} shader has no parameter `{name}`; ignored");
            }
        }
        self.queue
            .write_buffer(&binding.ubo, 0, bytemuck::bytes_of(&uniforms));

        self.pass.set_pipeline(&program.pipeline);
        self.pass.set_bind_group(0, &binding.bind_group, &[]);

        if let Some(stream) = geometry {
            if stream.count == 0 {
                return;
            }
            self.pass.set_vertex_buffer(0, stream.buffer.slice(..));
        }

        match call {
            DrawCall::Instanced { vertices, instances } => {
                self.pass.draw(0..vertices, 0..instances);
            }
            DrawCall::Strip { vertices } => {
                self.pass.draw(0..vertices, 0..1);
            }
        }
    }
}
