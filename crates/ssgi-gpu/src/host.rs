use glam::Mat4;
use ssgi_core::{
    CommandBufferPool, FrameRenderer, RenderContext, RendererFeature, RenderingData,
    TargetDescriptor, TemporaryTargetPool, CAMERA_COLOR_TARGET,
};
use wgpu::{Device, Queue};

use crate::error::Result;
use crate::executor::{CommandExecutor, ReplayStats};
use crate::material::MaterialStore;
use crate::targets::TargetTextures;

/// Everything a render feature needs from the engine side: materials,
/// render targets, pooled command buffers and a way to run what they record.
pub struct GpuHost {
    pub materials: MaterialStore,
    pub targets: TargetTextures,
    temp_targets: TemporaryTargetPool,
    command_pool: CommandBufferPool,
    context: RenderContext,
    executor: CommandExecutor,
    camera: TargetDescriptor,
}

impl GpuHost {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let mut targets = TargetTextures::new();
        targets.create_camera_targets(device, width, height);
        Self {
            materials: MaterialStore::new(),
            targets,
            temp_targets: TemporaryTargetPool::new(),
            command_pool: CommandBufferPool::new(),
            context: RenderContext::new(),
            executor: CommandExecutor::new(device),
            camera: TargetDescriptor::color(width, height).with_depth_bits(32),
        }
    }

    /// Rebuild the camera targets. Temporary targets follow on the next
    /// frame, when passes configure against the new size.
    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.targets.create_camera_targets(device, width, height);
        self.camera = TargetDescriptor::color(width, height).with_depth_bits(32);
    }

    pub fn rendering_data(&self, projection: Mat4) -> RenderingData {
        RenderingData::new(projection, self.camera)
    }

    pub fn temporary_targets(&self) -> &TemporaryTargetPool {
        &self.temp_targets
    }

    /// Run one frame of `feature`: enqueue its passes, execute them into the
    /// render context, then record the submitted commands into `encoder`.
    pub fn render_feature<F: RendererFeature>(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        feature: &mut F,
        data: &RenderingData,
    ) -> Result<ReplayStats> {
        let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, self.camera);
        renderer.add_feature(feature, data);
        renderer.execute(&mut self.temp_targets, &mut self.context, &mut self.command_pool, data)?;

        self.targets.sync(device, &self.temp_targets);
        let batches = self.context.submit();
        let stats = self.executor.replay(
            device,
            queue,
            encoder,
            &mut self.materials,
            &self.targets,
            &batches,
        )?;
        log::trace!("frame replayed: {stats:?}");
        Ok(stats)
    }
}
