use crate::props;
use crate::renderer::{PassContext, RenderPass};
use crate::settings::RenderPassEvent;
use crate::target::{ColorFormat, FilterMode, TargetDescriptor, TargetId, TemporaryTargetPool};
use crate::{MaterialId, PassError};

/// Name of the pass's scratch target.
pub const TEMP_TARGET_NAME: &str = "SSGI_0_RT";

/// Lifecycle of a pass instance. `configure` moves it to `Ready`; every
/// later `configure` keeps it there, re-allocating on size changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Unconfigured,
    Ready { temp: TargetId, descriptor: TargetDescriptor },
}

/// Renders the camera color through the SSGI material into a scratch target,
/// then copies the result back. A shader cannot read and write the same
/// target in one pass, hence the two blits.
#[derive(Debug, Clone)]
pub struct SsgiPass {
    profiler_tag: String,
    state: PassState,
    source: Option<TargetId>,

    pub material: Option<MaterialId>,
    pub samples_count: u32,
    pub indirect_amount: f32,
    pub noise_amount: f32,
    pub noise: bool,
    pub enabled: bool,
    pub render_pass_event: RenderPassEvent,
}

impl SsgiPass {
    pub fn new(profiler_tag: impl Into<String>) -> Self {
        Self {
            profiler_tag: profiler_tag.into(),
            state: PassState::Unconfigured,
            source: None,
            material: None,
            samples_count: 8,
            indirect_amount: 8.0,
            noise_amount: 2.0,
            noise: true,
            enabled: true,
            render_pass_event: RenderPassEvent::default(),
        }
    }

    pub fn profiler_tag(&self) -> &str {
        &self.profiler_tag
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn source(&self) -> Option<TargetId> {
        self.source
    }

    /// The target this pass renders into, once configured.
    pub fn color_target(&self) -> Option<TargetId> {
        match self.state {
            PassState::Ready { temp, .. } => Some(temp),
            PassState::Unconfigured => None,
        }
    }

    /// Bind this frame's input/output surface.
    pub fn setup(&mut self, source: TargetId) {
        self.source = Some(source);
    }

    /// Allocate (or re-allocate on a size change) the scratch target to match
    /// the camera target and register it as this pass's color target.
    pub fn configure_target(
        &mut self,
        targets: &mut TemporaryTargetPool,
        camera_descriptor: &TargetDescriptor,
    ) -> TargetId {
        let temp = TargetId::from_name(TEMP_TARGET_NAME);
        let descriptor = TargetDescriptor {
            width: camera_descriptor.width,
            height: camera_descriptor.height,
            depth_bits: 0,
            filter: FilterMode::Bilinear,
            format: ColorFormat::Argb32,
        };
        targets.get_temporary(temp, descriptor);
        self.state = PassState::Ready { temp, descriptor };
        temp
    }

    /// Record and submit this frame's commands.
    pub fn execute_frame(&mut self, ctx: &mut PassContext<'_>) -> Result<(), PassError> {
        let Some(material) = self.material else {
            log::trace!("'{}' has no material; skipping", self.profiler_tag);
            return Ok(());
        };
        let source = self.source.ok_or_else(|| PassError::NoSource(self.profiler_tag.clone()))?;
        let PassState::Ready { temp, .. } = self.state else {
            return Err(PassError::NotConfigured(self.profiler_tag.clone()));
        };

        let mut cmd = ctx.command_pool.scoped(&self.profiler_tag);

        if self.enabled {
            let inverse_projection = ctx.data.inverse_gpu_projection();

            cmd.set_float(material, props::SAMPLES_COUNT, self.samples_count as f32);
            cmd.set_float(material, props::INDIRECT_AMOUNT, self.indirect_amount);
            cmd.set_float(material, props::NOISE_AMOUNT, self.noise_amount);
            cmd.set_int(material, props::NOISE, i32::from(self.noise));
            cmd.set_matrix(material, props::INVERSE_PROJECTION_MATRIX, inverse_projection);

            cmd.blit_with_material(source, temp, material, 0);
            cmd.blit(temp, source);
        } else {
            cmd.blit(source, source);
        }

        ctx.render.execute_command_buffer(&cmd);
        Ok(())
    }
}

impl RenderPass for SsgiPass {
    fn name(&self) -> &str {
        &self.profiler_tag
    }

    fn event(&self) -> RenderPassEvent {
        self.render_pass_event
    }

    fn configure(&mut self, targets: &mut TemporaryTargetPool, camera_descriptor: &TargetDescriptor) {
        self.configure_target(targets, camera_descriptor);
    }

    fn execute(&mut self, ctx: &mut PassContext<'_>) -> Result<(), PassError> {
        self.execute_frame(ctx)
    }

    fn frame_cleanup(&mut self) {}
}
