//! Cible de rendu wgpu adossée à une surface de fenêtre

use super::context::GraphicsContext;
use super::target::{FrameStatus, RenderTarget};
use super::validation::validate_wgsl;
use super::{FrameUniforms, CLEAR_COLOR, OUTPUT_FORMAT};
use crate::diagnostics::HeavyError;
use crate::shader::{FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT};
use anyhow::{anyhow, Result};
use log::{debug, error, warn};
use std::sync::Arc;
use wgpu::*;

/// Buffer d'uniformes d'une instance et son bind group
pub struct UniformBinding {
    pub buffer: Buffer,
    pub bind_group: BindGroup,
}

/// Surface présentable et ressources communes à ses pipelines
pub struct SurfaceTarget<'window> {
    /// Contexte graphique partagé
    pub context: Arc<GraphicsContext>,

    /// Surface de rendu
    pub surface: Surface<'window>,

    /// Configuration de surface
    pub surface_config: SurfaceConfiguration,

    /// Layout du bind group des uniformes
    pub uniform_layout: BindGroupLayout,

    /// Layout du pipeline plein écran
    pub pipeline_layout: PipelineLayout,
}

impl<'window> SurfaceTarget<'window> {
    /// Configure la surface pour la taille donnée
    pub fn new(
        context: Arc<GraphicsContext>,
        surface: Surface<'window>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<Self> {
        let surface_caps = surface.get_capabilities(&context.adapter);
        let surface_format = if surface_caps.formats.contains(&OUTPUT_FORMAT) {
            OUTPUT_FORMAT
        } else {
            let fallback = surface_caps
                .formats
                .first()
                .copied()
                .ok_or_else(|| anyhow!("Surface incompatible avec l'adaptateur"))?;
            warn!(
                "Format {:?} non supporté par la surface, repli sur {:?}",
                OUTPUT_FORMAT, fallback
            );
            fallback
        };
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(CompositeAlphaMode::Auto);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: if vsync {
                PresentMode::Fifo
            } else {
                PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&context.device, &surface_config);

        let uniform_layout = context.device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("uniform_bind_group_layout"),
        });

        let pipeline_layout = context.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Pixel Shader Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        Ok(Self {
            context,
            surface,
            surface_config,
            uniform_layout,
            pipeline_layout,
        })
    }

    pub fn format(&self) -> TextureFormat {
        self.surface_config.format
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.context.device, &self.surface_config);
    }
}

impl<'window> RenderTarget for SurfaceTarget<'window> {
    type Pipeline = RenderPipeline;
    type UniformBuffer = UniformBinding;

    fn compile(&self, source: &str) -> Result<RenderPipeline, HeavyError> {
        // naga donne un diagnostic lisible avant de solliciter le device
        validate_wgsl(source)?;

        let device = &self.context.device;

        device.push_error_scope(ErrorFilter::Validation);
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Pixel Shader"),
            source: ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(HeavyError::diagnostic(err.to_string()));
        }

        device.push_error_scope(ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Pixel Shader Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: VERTEX_ENTRY_POINT,
                buffers: &[],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: FRAGMENT_ENTRY_POINT,
                targets: &[Some(ColorTargetState {
                    format: self.surface_config.format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            debug!("Création du pipeline refusée: {}", err);
            return Err(HeavyError::pipeline_creation(source));
        }

        Ok(pipeline)
    }

    fn create_uniform_buffer(&self) -> UniformBinding {
        let device = &self.context.device;
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Uniforms Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            layout: &self.uniform_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });
        UniformBinding { buffer, bind_group }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.reconfigure();
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    fn render_frame(
        &mut self,
        pipeline: &RenderPipeline,
        uniforms: &UniformBinding,
        frame: &FrameUniforms,
    ) -> FrameStatus {
        // Obtenir la texture de surface
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.reconfigure();
                return FrameStatus::NoDrawable;
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("Mémoire GPU épuisée lors de l'acquisition de la surface");
                return FrameStatus::NoDrawable;
            }
            Err(err) => {
                debug!("Surface indisponible: {}", err);
                return FrameStatus::NoDrawable;
            }
        };
        let view = output.texture.create_view(&TextureViewDescriptor::default());

        let queue = &self.context.queue;
        queue.write_buffer(&uniforms.buffer, 0, bytemuck::bytes_of(frame));

        let mut encoder = self.context.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Pixel Shader Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &uniforms.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        // Soumettre les commandes
        queue.submit(std::iter::once(encoder.finish()));
        output.present();

        FrameStatus::Presented
    }
}
