use ssgi_core::{MaterialId, PassError, TargetId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpuError {
    // ========================================================================
    // Device setup
    // ========================================================================
    #[error("Failed to request WGPU adapter")]
    AdapterRequestFailed,

    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    // ========================================================================
    // Command replay
    // ========================================================================
    #[error("Unknown material: {0:?}")]
    UnknownMaterial(MaterialId),

    #[error("Material '{material}' has no shader pass {pass}")]
    UnknownMaterialPass { material: String, pass: u32 },

    #[error("Unknown render target: {0:?}")]
    UnknownTarget(TargetId),

    #[error("Material blit reads and writes the same target: {0:?}")]
    FeedbackLoop(TargetId),

    #[error("Material '{material}' renders {expected:?} but the destination is {actual:?}")]
    FormatMismatch {
        material: String,
        expected: wgpu::TextureFormat,
        actual: wgpu::TextureFormat,
    },

    #[error(transparent)]
    Pass(#[from] PassError),

    // ========================================================================
    // Presentation
    // ========================================================================
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

pub type Result<T> = std::result::Result<T, GpuError>;
