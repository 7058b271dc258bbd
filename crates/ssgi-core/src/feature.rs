use crate::camera::RenderingData;
use crate::pass::SsgiPass;
use crate::renderer::{FrameRenderer, RendererFeature};
use crate::settings::SsgiSettings;

pub const PROFILER_TAG: &str = "SSGI";

/// Owns the SSGI settings and the pass built from them.
///
/// The pass receives its own copies of the scalar settings on
/// [`create`](RendererFeature::create); editing the settings afterwards has
/// no effect until the next `create`. The material is copied as a handle, so
/// both keep pointing at the same host material.
#[derive(Debug, Default)]
pub struct SsgiFeature {
    settings: SsgiSettings,
    pass: Option<SsgiPass>,
}

impl SsgiFeature {
    pub fn new(settings: SsgiSettings) -> Self {
        Self { settings, pass: None }
    }

    pub fn settings(&self) -> &SsgiSettings {
        &self.settings
    }

    /// Edits land in the pass on the next [`recreate`](Self::recreate).
    pub fn settings_mut(&mut self) -> &mut SsgiSettings {
        &mut self.settings
    }

    pub fn pass(&self) -> Option<&SsgiPass> {
        self.pass.as_ref()
    }

    /// Replace the settings and rebuild the pass from them.
    pub fn recreate(&mut self, settings: SsgiSettings) {
        self.settings = settings;
        self.create();
    }
}

impl RendererFeature for SsgiFeature {
    fn create(&mut self) {
        let settings = self.settings.clamped();
        if settings != self.settings {
            log::warn!(
                "SSGI settings out of range, clamped: samples {} → {}, indirect {} → {}, noise {} → {}",
                self.settings.samples_count,
                settings.samples_count,
                self.settings.indirect_amount,
                settings.indirect_amount,
                self.settings.noise_amount,
                settings.noise_amount
            );
        }

        let mut pass = SsgiPass::new(PROFILER_TAG);
        pass.material = settings.material;
        pass.samples_count = settings.samples_count;
        pass.indirect_amount = settings.indirect_amount;
        pass.noise_amount = settings.noise_amount;
        pass.noise = settings.noise;
        pass.enabled = settings.enabled;
        pass.render_pass_event = settings.render_pass_event;

        log::info!(
            "SSGI pass created: enabled={} samples={} indirect={} noise={} ({})",
            pass.enabled,
            pass.samples_count,
            pass.indirect_amount,
            pass.noise_amount,
            pass.noise
        );
        self.pass = Some(pass);
    }

    fn add_render_passes<'f>(&'f mut self, renderer: &mut FrameRenderer<'f>, _data: &RenderingData) {
        let Some(pass) = self.pass.as_mut() else {
            log::warn!("SSGI feature has no pass; call create() first");
            return;
        };
        pass.setup(renderer.camera_color_target());
        renderer.enqueue_pass(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandBufferPool, RenderContext};
    use crate::settings::RenderPassEvent;
    use crate::target::{TargetDescriptor, TemporaryTargetPool, CAMERA_COLOR_TARGET};
    use crate::MaterialId;
    use glam::Mat4;

    fn settings() -> SsgiSettings {
        SsgiSettings {
            render_pass_event: RenderPassEvent::BeforeRenderingPostProcessing,
            material: Some(MaterialId(4)),
            samples_count: 32,
            indirect_amount: 16.0,
            noise_amount: 1.5,
            noise: true,
            enabled: true,
        }
    }

    fn data() -> RenderingData {
        RenderingData::new(
            Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 50.0),
            TargetDescriptor::color(320, 240),
        )
    }

    #[test]
    fn create_copies_every_field() {
        let mut feature = SsgiFeature::new(settings());
        feature.create();
        let pass = feature.pass().unwrap();
        assert_eq!(pass.material, Some(MaterialId(4)));
        assert_eq!(pass.samples_count, 32);
        assert_eq!(pass.indirect_amount, 16.0);
        assert_eq!(pass.noise_amount, 1.5);
        assert!(pass.noise);
        assert!(pass.enabled);
        assert_eq!(pass.render_pass_event, RenderPassEvent::BeforeRenderingPostProcessing);
        assert_eq!(pass.profiler_tag(), "SSGI");
    }

    #[test]
    fn later_setting_edits_do_not_reach_existing_pass() {
        let mut feature = SsgiFeature::new(settings());
        feature.create();

        let s = feature.settings_mut();
        s.samples_count = 128;
        s.indirect_amount = 0.0;
        s.noise_amount = 5.0;
        s.noise = false;
        s.enabled = false;

        let pass = feature.pass().unwrap();
        assert_eq!(pass.samples_count, 32);
        assert_eq!(pass.indirect_amount, 16.0);
        assert_eq!(pass.noise_amount, 1.5);
        assert!(pass.noise);
        assert!(pass.enabled);
    }

    #[test]
    fn recreate_picks_up_edits() {
        let mut feature = SsgiFeature::new(settings());
        feature.create();
        feature.recreate(SsgiSettings { samples_count: 64, ..settings() });
        assert_eq!(feature.pass().unwrap().samples_count, 64);
    }

    #[test]
    fn create_clamps_out_of_range_settings() {
        let mut feature = SsgiFeature::new(SsgiSettings {
            samples_count: 1,
            noise_amount: 9.0,
            ..settings()
        });
        feature.create();
        let pass = feature.pass().unwrap();
        assert_eq!(pass.samples_count, 8);
        assert_eq!(pass.noise_amount, 5.0);
    }

    #[test]
    fn add_render_passes_binds_camera_target() {
        let mut feature = SsgiFeature::new(settings());
        feature.create();
        let data = data();
        {
            let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, data.camera.target_descriptor);
            renderer.add_feature(&mut feature, &data);
            assert_eq!(renderer.len(), 1);
        }
        assert_eq!(feature.pass().unwrap().source(), Some(CAMERA_COLOR_TARGET));
    }

    #[test]
    fn add_render_passes_before_create_enqueues_nothing() {
        let mut feature = SsgiFeature::new(settings());
        let data = data();
        let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, data.camera.target_descriptor);
        renderer.add_feature(&mut feature, &data);
        assert!(renderer.is_empty());
    }

    #[test]
    fn full_frame_through_renderer() {
        let mut feature = SsgiFeature::new(settings());
        feature.create();
        let data = data();

        let mut targets = TemporaryTargetPool::new();
        let mut ctx = RenderContext::new();
        let mut pool = CommandBufferPool::new();
        for _ in 0..3 {
            let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, data.camera.target_descriptor);
            renderer.add_feature(&mut feature, &data);
            renderer.execute(&mut targets, &mut ctx, &mut pool, &data).unwrap();
        }

        assert_eq!(ctx.batches().len(), 3);
        assert_eq!(targets.len(), 1, "scratch target is reused across frames");
        assert_eq!(pool.available(), 1);
        let blits = ctx.commands().filter(|c| c.is_blit()).count();
        assert_eq!(blits, 6);
        assert!(matches!(ctx.batches()[0].commands[0], Command::SetFloat { value, .. } if value == 32.0));
    }
}
