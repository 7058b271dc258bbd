//! GPU storage behind render target ids.
//! Temporary targets mirror the core pool; camera color and depth are
//! registered explicitly and live until replaced.

use std::collections::HashMap;

use ssgi_core::{
    ColorFormat, FilterMode, TargetId, TemporaryTargetPool, CAMERA_COLOR_TARGET, CAMERA_DEPTH_TARGET,
};
use wgpu::Device;

use crate::error::{GpuError, Result};

/// Format of the camera color target (and of `Argb32` temporaries).
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Format of the camera depth target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub fn texture_format(format: ColorFormat) -> wgpu::TextureFormat {
    match format {
        ColorFormat::Argb32 => COLOR_FORMAT,
        ColorFormat::ArgbHalf => wgpu::TextureFormat::Rgba16Float,
        ColorFormat::ArgbFloat => wgpu::TextureFormat::Rgba32Float,
    }
}

pub struct GpuTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub filter: FilterMode,
    pub width: u32,
    pub height: u32,
    /// Pool generation this storage was built for; `None` for camera targets.
    generation: Option<u64>,
}

impl GpuTarget {
    fn new(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        filter: FilterMode,
        usage: wgpu::TextureUsages,
        generation: Option<u64>,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view, format, filter, width, height, generation }
    }
}

const COLOR_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING)
    .union(wgpu::TextureUsages::COPY_SRC)
    .union(wgpu::TextureUsages::COPY_DST);

#[derive(Default)]
pub struct TargetTextures {
    targets: HashMap<TargetId, GpuTarget>,
}

impl TargetTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)create the camera color and depth targets at the given size.
    pub fn create_camera_targets(&mut self, device: &Device, width: u32, height: u32) {
        let color = GpuTarget::new(
            device,
            "camera_color",
            width,
            height,
            COLOR_FORMAT,
            FilterMode::Bilinear,
            COLOR_USAGE,
            None,
        );
        let depth = GpuTarget::new(
            device,
            "camera_depth",
            width,
            height,
            DEPTH_FORMAT,
            FilterMode::Point,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            None,
        );
        self.targets.insert(CAMERA_COLOR_TARGET, color);
        self.targets.insert(CAMERA_DEPTH_TARGET, depth);
        log::debug!("camera targets created: {}×{}", width, height);
    }

    /// Bring temporary storage in line with `pool`: build textures for new or
    /// re-allocated ids, drop textures whose ids were released.
    pub fn sync(&mut self, device: &Device, pool: &TemporaryTargetPool) {
        for (id, desc) in pool.iter() {
            let generation = pool.generation(id);
            let stale = self.targets.get(&id).map_or(true, |t| t.generation != generation);
            if stale {
                log::debug!("building temporary target {:?}: {}×{}", id, desc.width, desc.height);
                let target = GpuTarget::new(
                    device,
                    "temporary",
                    desc.width.max(1),
                    desc.height.max(1),
                    texture_format(desc.format),
                    desc.filter,
                    COLOR_USAGE,
                    generation,
                );
                self.targets.insert(id, target);
            }
        }
        self.targets
            .retain(|id, t| t.generation.is_none() || pool.descriptor(*id).is_some());
    }

    pub fn get(&self, id: TargetId) -> Result<&GpuTarget> {
        self.targets.get(&id).ok_or(GpuError::UnknownTarget(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb32_maps_to_camera_format() {
        assert_eq!(texture_format(ColorFormat::Argb32), COLOR_FORMAT);
    }

    #[test]
    fn float_formats_map_to_float_textures() {
        assert_eq!(texture_format(ColorFormat::ArgbHalf), wgpu::TextureFormat::Rgba16Float);
        assert_eq!(texture_format(ColorFormat::ArgbFloat), wgpu::TextureFormat::Rgba32Float);
    }

    #[test]
    fn texel_sizes_agree_with_core() {
        for format in [ColorFormat::Argb32, ColorFormat::ArgbHalf, ColorFormat::ArgbFloat] {
            assert_eq!(
                texture_format(format).block_copy_size(None),
                Some(format.bytes_per_pixel()),
                "{format:?}"
            );
        }
    }

    #[test]
    fn empty_store_has_no_camera() {
        let targets = TargetTextures::new();
        assert!(matches!(targets.get(CAMERA_COLOR_TARGET), Err(GpuError::UnknownTarget(_))));
    }
}
