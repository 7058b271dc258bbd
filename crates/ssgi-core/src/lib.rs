pub mod camera;
pub mod command;
pub mod feature;
pub mod pass;
pub mod presets;
pub mod renderer;
pub mod settings;
pub mod target;

pub use camera::{gpu_projection_matrix, CameraData, ClipConvention, RenderingData};
pub use command::{
    Command, CommandBuffer, CommandBufferPool, MaterialPass, PooledCommandBuffer, RenderContext,
    SubmittedBatch,
};
pub use feature::SsgiFeature;
pub use pass::{PassState, SsgiPass, TEMP_TARGET_NAME};
pub use presets::Quality;
pub use renderer::{FrameRenderer, PassContext, RenderPass, RendererFeature};
pub use settings::{RenderPassEvent, SsgiSettings};
pub use target::{
    Allocation, ColorFormat, FilterMode, TargetDescriptor, TargetId, TemporaryTargetPool,
    CAMERA_COLOR_TARGET, CAMERA_DEPTH_TARGET,
};

// ---------------------------------------------------------------------------
// Handles shared between the core model and any backend
// ---------------------------------------------------------------------------

/// Handle to a material owned by the host's material store.
///
/// Passes and settings only ever hold the handle: the material is used but
/// never owned by the effect, so every holder of the same id sees the same
/// shader and properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

// ---------------------------------------------------------------------------
// Shader property names read by the SSGI shader
// ---------------------------------------------------------------------------

pub mod props {
    pub const SAMPLES_COUNT: &str = "_SamplesCount";
    pub const INDIRECT_AMOUNT: &str = "_IndirectAmount";
    pub const NOISE_AMOUNT: &str = "_NoiseAmount";
    pub const NOISE: &str = "_Noise";
    pub const INVERSE_PROJECTION_MATRIX: &str = "_InverseProjectionMatrix";
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PassError {
    /// `execute` ran before `configure` allocated the temporary target.
    #[error("render pass '{0}' executed before configure")]
    NotConfigured(String),

    /// `execute` ran without a source target bound by `setup`.
    #[error("render pass '{0}' has no source target; call setup first")]
    NoSource(String),
}
