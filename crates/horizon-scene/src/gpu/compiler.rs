use std::num::NonZeroU64;

use horizon_engine::render::RenderCtx;

use crate::layer::{Layer, Topology, VertexInput};
use crate::params::LayerUniforms;
use crate::shader::{self, ShaderCompiler, ShaderError, ShaderPaths, FRAGMENT_ENTRY, VERTEX_ENTRY};

use super::geometry::POSITION_STRIDE;

/// A linked layer program.
#[derive(Debug)]
pub struct GpuProgram {
    pub pipeline: wgpu::RenderPipeline,
    /// Increments on every successful compile; tells reloaded programs apart in logs.
    pub generation: u64,
}

/// Builds render pipelines for the current surface.
///
/// All layers share one pipeline layout: a single uniform block at
/// `@group(0) @binding(0)`.
pub struct WgpuCompiler {
    device: wgpu::Device,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    sample_count: u32,
    generation: u64,
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

impl WgpuCompiler {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let bind_group_layout = layer_bind_group_layout(ctx.device);

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("horizon layer pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        Self {
            device: ctx.device.clone(),
            bind_group_layout,
            pipeline_layout,
            color_format: ctx.surface_format,
            depth_format: ctx.depth_format,
            sample_count: ctx.sample_count,
            generation: 0,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

fn layer_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("horizon layer bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(std::mem::size_of::<LayerUniforms>() as u64),
            },
            count: None,
        }],
    })
}

fn vertex_buffers(layer: Layer) -> Vec<wgpu::VertexBufferLayout<'static>> {
    let step_mode = match layer.vertex_input() {
        VertexInput::Procedural => return Vec::new(),
        VertexInput::PerVertex => wgpu::VertexStepMode::Vertex,
        VertexInput::PerInstance => wgpu::VertexStepMode::Instance,
    };
    vec![wgpu::VertexBufferLayout {
        array_stride: POSITION_STRIDE,
        step_mode,
        attributes: &POSITION_ATTRS,
    }]
}

fn primitive_topology(layer: Layer) -> wgpu::PrimitiveTopology {
    match layer.topology() {
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

impl ShaderCompiler for WgpuCompiler {
    type Program = GpuProgram;

    fn compile_and_link(
        &mut self,
        layer: Layer,
        paths: &ShaderPaths,
    ) -> Result<GpuProgram, ShaderError> {
        // Validate before handing anything to the device; wgpu treats invalid
        // modules as uncaptured device errors.
        let linked = shader::link(layer, paths)?;

        // Device-side rejections land in this scope, not the uncaptured handler.
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let label = format!("horizon {layer}");
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label.as_str()),
            source: wgpu::ShaderSource::Wgsl(linked.source.into()),
        });

        let buffers = vertex_buffers(layer);

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label.as_str()),
            layout: Some(&self.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: primitive_topology(layer),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),

            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },

            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(ShaderError::Pipeline {
                layer: layer.name(),
                message: err.to_string(),
            });
        }

        self.generation += 1;
        log::debug!("compiled {layer} shader (generation {})", self.generation);

        Ok(GpuProgram {
            pipeline,
            generation: self.generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_buffered_layers_declare_vertex_buffers() {
        assert!(vertex_buffers(Layer::Skybox).is_empty());
        assert!(vertex_buffers(Layer::Grid).is_empty());

        let stars = vertex_buffers(Layer::Stars);
        assert_eq!(stars[0].step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(stars[0].array_stride, 12);

        let ridge = vertex_buffers(Layer::Mountains);
        assert_eq!(ridge[0].step_mode, wgpu::VertexStepMode::Vertex);
    }

    #[test]
    fn ridge_is_drawn_as_strip() {
        assert_eq!(
            primitive_topology(Layer::Mountains),
            wgpu::PrimitiveTopology::TriangleStrip
        );
        assert_eq!(
            primitive_topology(Layer::Sun),
            wgpu::PrimitiveTopology::TriangleList
        );
    }
}
