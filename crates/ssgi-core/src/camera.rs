use glam::{Mat4, Vec3, Vec4};

use crate::target::TargetDescriptor;

// ---------------------------------------------------------------------------
// Clip-space conventions
// ---------------------------------------------------------------------------

/// How a graphics backend's clip space differs from the OpenGL convention
/// camera projections are authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipConvention {
    /// Clip depth is [0, 1] rather than [-1, 1].
    pub depth_zero_to_one: bool,
    /// Texture rows run top-down, so offscreen rendering needs a Y flip.
    pub flip_y_when_rendering_to_texture: bool,
}

impl ClipConvention {
    pub const OPENGL: Self = Self { depth_zero_to_one: false, flip_y_when_rendering_to_texture: false };
    pub const WGPU: Self = Self { depth_zero_to_one: true, flip_y_when_rendering_to_texture: false };
    pub const DIRECT3D: Self = Self { depth_zero_to_one: true, flip_y_when_rendering_to_texture: true };
}

impl Default for ClipConvention {
    fn default() -> Self {
        Self::WGPU
    }
}

/// Convert an OpenGL-style projection to the matrix the GPU actually uses
/// under `convention`.
pub fn gpu_projection_matrix(
    projection: Mat4,
    render_into_texture: bool,
    convention: ClipConvention,
) -> Mat4 {
    let mut m = projection;
    if convention.depth_zero_to_one {
        // z' = 0.5 * z + 0.5 * w
        let remap = Mat4::from_cols(
            Vec4::X,
            Vec4::Y,
            Vec4::new(0.0, 0.0, 0.5, 0.0),
            Vec4::new(0.0, 0.0, 0.5, 1.0),
        );
        m = remap * m;
    }
    if render_into_texture && convention.flip_y_when_rendering_to_texture {
        m = Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0)) * m;
    }
    m
}

// ---------------------------------------------------------------------------
// Per-frame camera data handed to passes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraData {
    /// OpenGL-convention projection matrix.
    pub projection: Mat4,
    /// Description of the camera's color target this frame.
    pub target_descriptor: TargetDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderingData {
    pub camera: CameraData,
    pub clip: ClipConvention,
}

impl RenderingData {
    pub fn new(projection: Mat4, target_descriptor: TargetDescriptor) -> Self {
        Self {
            camera: CameraData { projection, target_descriptor },
            clip: ClipConvention::default(),
        }
    }

    /// Inverse of the GPU-adjusted projection: clip space back to view space.
    pub fn inverse_gpu_projection(&self) -> Mat4 {
        gpu_projection_matrix(self.camera.projection, false, self.clip).inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    fn gl_projection() -> Mat4 {
        Mat4::perspective_rh_gl(60f32.to_radians(), 16.0 / 9.0, NEAR, FAR)
    }

    fn ndc_depth(m: Mat4, view_z: f32) -> f32 {
        let clip = m * Vec4::new(0.0, 0.0, view_z, 1.0);
        clip.z / clip.w
    }

    #[test]
    fn opengl_convention_is_identity() {
        let p = gl_projection();
        assert_eq!(gpu_projection_matrix(p, false, ClipConvention::OPENGL), p);
        assert_eq!(gpu_projection_matrix(p, true, ClipConvention::OPENGL), p);
    }

    #[test]
    fn wgpu_convention_maps_near_far_to_zero_one() {
        let m = gpu_projection_matrix(gl_projection(), false, ClipConvention::WGPU);
        assert!(ndc_depth(m, -NEAR).abs() < 1e-5, "near → {}", ndc_depth(m, -NEAR));
        assert!((ndc_depth(m, -FAR) - 1.0).abs() < 1e-4, "far → {}", ndc_depth(m, -FAR));
    }

    #[test]
    fn wgpu_convention_matches_zero_one_projection() {
        let converted = gpu_projection_matrix(gl_projection(), false, ClipConvention::WGPU);
        let expected = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, NEAR, FAR);
        assert!(converted.abs_diff_eq(expected, 1e-5), "{converted:?} vs {expected:?}");
    }

    #[test]
    fn direct3d_flips_y_only_into_textures() {
        let p = gl_projection();
        let screen = gpu_projection_matrix(p, false, ClipConvention::DIRECT3D);
        let texture = gpu_projection_matrix(p, true, ClipConvention::DIRECT3D);
        assert!((screen.y_axis.y + texture.y_axis.y).abs() < 1e-6);
        assert_eq!(screen.x_axis, texture.x_axis);
    }

    #[test]
    fn inverse_projection_round_trips_view_position() {
        let data = RenderingData::new(gl_projection(), TargetDescriptor::color(1920, 1080));
        let view = Vec4::new(1.0, -2.0, -10.0, 1.0);
        let clip = gpu_projection_matrix(data.camera.projection, false, data.clip) * view;
        let back = data.inverse_gpu_projection() * clip;
        let back = back / back.w;
        assert!((back - view).abs().max_element() < 1e-3, "{back:?}");
    }
}
