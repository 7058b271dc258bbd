use std::collections::HashMap;

use ssgi_core::{Command, FilterMode, SubmittedBatch, TargetId, CAMERA_DEPTH_TARGET};
use wgpu::{BindGroupLayout, Device, Queue, RenderPipeline, Sampler};

use crate::error::{GpuError, Result};
use crate::material::{Material, MaterialStore};
use crate::renderer::{fullscreen_bind_group_layout, fullscreen_pipeline};
use crate::targets::{GpuTarget, TargetTextures};

/// What one replay did, for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub parameters: usize,
    pub material_blits: usize,
    pub copies: usize,
    /// Self-copies without a material; they leave the target unchanged.
    pub skipped: usize,
}

/// Turns submitted command batches into wgpu work.
///
/// Parameter commands update the material's CPU-side properties; each
/// material blit uploads them before drawing. Two material blits with
/// different parameters on the same material in one submission therefore
/// both see the later values.
pub struct CommandExecutor {
    linear_sampler: Sampler,
    nearest_sampler: Sampler,
    copy_bgl: BindGroupLayout,
    /// Fullscreen copy pipelines, one per destination format.
    copy_pipelines: HashMap<wgpu::TextureFormat, RenderPipeline>,
}

impl CommandExecutor {
    pub fn new(device: &Device) -> Self {
        let make_sampler = |label: &str, filter: wgpu::FilterMode| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                mag_filter: filter,
                min_filter: filter,
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                ..Default::default()
            })
        };
        Self {
            linear_sampler: make_sampler("blit_linear", wgpu::FilterMode::Linear),
            nearest_sampler: make_sampler("blit_nearest", wgpu::FilterMode::Nearest),
            copy_bgl: fullscreen_bind_group_layout(device, "blit_copy_bgl"),
            copy_pipelines: HashMap::new(),
        }
    }

    pub fn replay(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        materials: &mut MaterialStore,
        targets: &TargetTextures,
        batches: &[SubmittedBatch],
    ) -> Result<ReplayStats> {
        let mut stats = ReplayStats::default();
        for batch in batches {
            log::trace!("replay '{}' ({} commands)", batch.name, batch.commands.len());
            for command in &batch.commands {
                match *command {
                    Command::SetFloat { material, name, value } => {
                        let m = materials.get_mut(material)?;
                        if !m.properties.set_float(name, value) {
                            log::debug!("material '{}' has no float '{}'", m.label, name);
                        }
                        stats.parameters += 1;
                    }
                    Command::SetInt { material, name, value } => {
                        let m = materials.get_mut(material)?;
                        if !m.properties.set_int(name, value) {
                            log::debug!("material '{}' has no int '{}'", m.label, name);
                        }
                        stats.parameters += 1;
                    }
                    Command::SetMatrix { material, name, value } => {
                        let m = materials.get_mut(material)?;
                        if !m.properties.set_matrix(name, value) {
                            log::debug!("material '{}' has no matrix '{}'", m.label, name);
                        }
                        stats.parameters += 1;
                    }
                    Command::Blit { source, destination, material: Some(mp) } => {
                        let material = materials.get_mut(mp.material)?;
                        self.material_blit(device, queue, encoder, material, mp.pass, targets, source, destination)?;
                        stats.material_blits += 1;
                    }
                    Command::Blit { source, destination, material: None } if source == destination => {
                        log::trace!("identity blit on {:?} skipped", source);
                        stats.skipped += 1;
                    }
                    Command::Blit { source, destination, material: None } => {
                        self.copy(device, encoder, targets, source, destination)?;
                        stats.copies += 1;
                    }
                }
            }
        }
        Ok(stats)
    }

    fn sampler_for(&self, filter: FilterMode) -> &Sampler {
        match filter {
            FilterMode::Point => &self.nearest_sampler,
            FilterMode::Bilinear | FilterMode::Trilinear => &self.linear_sampler,
        }
    }

    fn material_blit(
        &self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        material: &mut Material,
        pass: u32,
        targets: &TargetTextures,
        source: TargetId,
        destination: TargetId,
    ) -> Result<()> {
        if source == destination {
            return Err(GpuError::FeedbackLoop(source));
        }
        let src = targets.get(source)?;
        let dst = targets.get(destination)?;
        let depth = targets.get(CAMERA_DEPTH_TARGET)?;
        if dst.format != material.target_format() {
            return Err(GpuError::FormatMismatch {
                material: material.label.clone(),
                expected: material.target_format(),
                actual: dst.format,
            });
        }

        material.flush(queue);
        let material: &Material = material;
        let pipeline = material.pass(pass)?;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(material.label.as_str()),
            layout: material.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&src.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.sampler_for(src.filter)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: material.uniform_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&depth.view),
                },
            ],
        });

        draw_fullscreen(encoder, &material.label, dst, pipeline, &bind_group);
        Ok(())
    }

    fn copy(
        &mut self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        targets: &TargetTextures,
        source: TargetId,
        destination: TargetId,
    ) -> Result<()> {
        let src = targets.get(source)?;
        let dst = targets.get(destination)?;

        if src.format == dst.format && src.width == dst.width && src.height == dst.height {
            encoder.copy_texture_to_texture(
                src.texture.as_image_copy(),
                dst.texture.as_image_copy(),
                wgpu::Extent3d {
                    width: src.width,
                    height: src.height,
                    depth_or_array_layers: 1,
                },
            );
            return Ok(());
        }

        // Size or format differ: resample through the fullscreen shader.
        let copy_bgl = &self.copy_bgl;
        self.copy_pipelines
            .entry(dst.format)
            .or_insert_with(|| fullscreen_pipeline(device, "blit_copy", copy_bgl, dst.format));
        let pipeline = &self.copy_pipelines[&dst.format];
        let sampler = self.sampler_for(src.filter);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_copy_bg"),
            layout: &self.copy_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&src.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        draw_fullscreen(encoder, "blit_copy", dst, pipeline, &bind_group);
        Ok(())
    }
}

fn draw_fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &GpuTarget,
    pipeline: &RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: &target.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
