use ssgi_core::props;
use wgpu::Device;

use crate::material::{Material, UniformKind, UniformLayout};
use crate::targets::COLOR_FORMAT;

pub const SSGI_WGSL: &str = include_str!("../shaders/ssgi.wgsl");

/// Layout of `SsgiParams` in `ssgi.wgsl`.
pub fn ssgi_uniform_layout() -> UniformLayout {
    UniformLayout::new(&[
        (props::INVERSE_PROJECTION_MATRIX, UniformKind::Mat4),
        (props::SAMPLES_COUNT, UniformKind::Float),
        (props::INDIRECT_AMOUNT, UniformKind::Float),
        (props::NOISE_AMOUNT, UniformKind::Float),
        (props::NOISE, UniformKind::Int),
    ])
}

/// The SSGI material: one shader pass rendering into `Argb32` targets.
pub fn create_ssgi_material(device: &Device) -> Material {
    Material::new(device, "SSGI", SSGI_WGSL, &["fs_main"], ssgi_uniform_layout(), COLOR_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shader_property_has_a_slot() {
        let layout = ssgi_uniform_layout();
        for name in [
            props::SAMPLES_COUNT,
            props::INDIRECT_AMOUNT,
            props::NOISE_AMOUNT,
            props::NOISE,
            props::INVERSE_PROJECTION_MATRIX,
        ] {
            assert!(layout.field(name).is_some(), "missing {name}");
        }
        assert_eq!(layout.size(), 80);
    }
}
