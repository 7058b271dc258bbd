use crate::camera::RenderingData;
use crate::command::{CommandBufferPool, RenderContext};
use crate::settings::RenderPassEvent;
use crate::target::{TargetDescriptor, TargetId, TemporaryTargetPool};
use crate::PassError;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Everything a pass may touch while executing.
pub struct PassContext<'a> {
    pub render: &'a mut RenderContext,
    pub command_pool: &'a mut CommandBufferPool,
    pub data: &'a RenderingData,
}

/// A unit of per-frame rendering work scheduled at a [`RenderPassEvent`].
pub trait RenderPass {
    fn name(&self) -> &str;

    fn event(&self) -> RenderPassEvent;

    /// Called every frame before `execute` with the camera target's
    /// description. Allocate size-dependent targets here.
    fn configure(&mut self, targets: &mut TemporaryTargetPool, camera_descriptor: &TargetDescriptor);

    fn execute(&mut self, ctx: &mut PassContext<'_>) -> Result<(), PassError>;

    /// Called once the frame's passes have all executed.
    fn frame_cleanup(&mut self) {}
}

/// Host-visible factory for one or more render passes.
pub trait RendererFeature {
    /// Build (or rebuild) the feature's passes from its settings.
    fn create(&mut self);

    /// Bind this frame's targets and enqueue passes into `renderer`.
    fn add_render_passes<'f>(&'f mut self, renderer: &mut FrameRenderer<'f>, data: &RenderingData);
}

// ---------------------------------------------------------------------------
// FrameRenderer — the per-frame pass list
// ---------------------------------------------------------------------------

pub struct FrameRenderer<'f> {
    camera_color_target: TargetId,
    camera_descriptor: TargetDescriptor,
    queue: Vec<&'f mut dyn RenderPass>,
}

impl<'f> FrameRenderer<'f> {
    pub fn new(camera_color_target: TargetId, camera_descriptor: TargetDescriptor) -> Self {
        Self { camera_color_target, camera_descriptor, queue: Vec::new() }
    }

    pub fn camera_color_target(&self) -> TargetId {
        self.camera_color_target
    }

    pub fn camera_descriptor(&self) -> &TargetDescriptor {
        &self.camera_descriptor
    }

    pub fn enqueue_pass(&mut self, pass: &'f mut dyn RenderPass) {
        log::trace!("enqueue '{}' at {:?}", pass.name(), pass.event());
        self.queue.push(pass);
    }

    pub fn add_feature(&mut self, feature: &'f mut dyn RendererFeature, data: &RenderingData) {
        feature.add_render_passes(self, data);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Names of the enqueued passes in the order they will run.
    pub fn ordered_names(&mut self) -> Vec<String> {
        self.sort();
        self.queue.iter().map(|p| p.name().to_string()).collect()
    }

    fn sort(&mut self) {
        // Stable: passes sharing an event keep their enqueue order.
        self.queue.sort_by_key(|p| p.event());
    }

    /// Configure and execute every pass in event order, then run each pass's
    /// frame cleanup. Stops executing at the first failing pass; batches the
    /// frame already queued are then discarded so none reach a later submit.
    pub fn execute(
        mut self,
        targets: &mut TemporaryTargetPool,
        context: &mut RenderContext,
        command_pool: &mut CommandBufferPool,
        data: &RenderingData,
    ) -> Result<(), PassError> {
        self.sort();
        let camera_descriptor = self.camera_descriptor;
        let mark = context.mark();
        let mut ctx = PassContext { render: context, command_pool, data };

        let mut result = Ok(());
        for pass in self.queue.iter_mut() {
            pass.configure(targets, &camera_descriptor);
            if let Err(e) = pass.execute(&mut ctx) {
                log::warn!("pass '{}' failed: {e}", pass.name());
                ctx.render.discard_since(mark);
                result = Err(e);
                break;
            }
        }
        for pass in self.queue.iter_mut() {
            pass.frame_cleanup();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandBuffer;
    use crate::target::CAMERA_COLOR_TARGET;
    use glam::Mat4;

    /// Records a blit named after itself so ordering is observable.
    struct MarkerPass {
        name: &'static str,
        event: RenderPassEvent,
        target: TargetId,
        configured: u32,
        cleaned: u32,
        fail: bool,
    }

    impl MarkerPass {
        fn new(name: &'static str, event: RenderPassEvent) -> Self {
            Self {
                name,
                event,
                target: TargetId::from_name(name),
                configured: 0,
                cleaned: 0,
                fail: false,
            }
        }
    }

    impl RenderPass for MarkerPass {
        fn name(&self) -> &str {
            self.name
        }
        fn event(&self) -> RenderPassEvent {
            self.event
        }
        fn configure(&mut self, _targets: &mut TemporaryTargetPool, _desc: &TargetDescriptor) {
            self.configured += 1;
        }
        fn execute(&mut self, ctx: &mut PassContext<'_>) -> Result<(), PassError> {
            if self.fail {
                return Err(PassError::NoSource(self.name.to_string()));
            }
            let mut cmd = CommandBuffer::new(self.name);
            cmd.blit(self.target, self.target);
            ctx.render.execute_command_buffer(&cmd);
            Ok(())
        }
        fn frame_cleanup(&mut self) {
            self.cleaned += 1;
        }
    }

    fn data() -> RenderingData {
        RenderingData::new(Mat4::IDENTITY, TargetDescriptor::color(4, 4))
    }

    #[test]
    fn passes_run_in_event_order() {
        let mut post = MarkerPass::new("post", RenderPassEvent::AfterRenderingPostProcessing);
        let mut opaque = MarkerPass::new("opaque", RenderPassEvent::AfterRenderingOpaques);
        let mut shadows = MarkerPass::new("shadows", RenderPassEvent::BeforeRenderingShadows);

        let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, TargetDescriptor::color(4, 4));
        renderer.enqueue_pass(&mut post);
        renderer.enqueue_pass(&mut opaque);
        renderer.enqueue_pass(&mut shadows);

        let mut ctx = RenderContext::new();
        renderer
            .execute(&mut TemporaryTargetPool::new(), &mut ctx, &mut CommandBufferPool::new(), &data())
            .unwrap();

        let names: Vec<_> = ctx.batches().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["shadows", "opaque", "post"]);
    }

    #[test]
    fn same_event_keeps_enqueue_order() {
        let mut a = MarkerPass::new("a", RenderPassEvent::AfterRenderingOpaques);
        let mut b = MarkerPass::new("b", RenderPassEvent::AfterRenderingOpaques);
        let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, TargetDescriptor::color(4, 4));
        renderer.enqueue_pass(&mut b);
        renderer.enqueue_pass(&mut a);
        assert_eq!(renderer.ordered_names(), ["b", "a"]);
    }

    #[test]
    fn every_pass_is_configured_and_cleaned() {
        let mut a = MarkerPass::new("a", RenderPassEvent::AfterRenderingOpaques);
        let mut b = MarkerPass::new("b", RenderPassEvent::AfterRendering);
        {
            let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, TargetDescriptor::color(4, 4));
            renderer.enqueue_pass(&mut a);
            renderer.enqueue_pass(&mut b);
            renderer
                .execute(
                    &mut TemporaryTargetPool::new(),
                    &mut RenderContext::new(),
                    &mut CommandBufferPool::new(),
                    &data(),
                )
                .unwrap();
        }
        assert_eq!((a.configured, a.cleaned), (1, 1));
        assert_eq!((b.configured, b.cleaned), (1, 1));
    }

    #[test]
    fn failing_pass_stops_later_passes() {
        let mut first = MarkerPass::new("first", RenderPassEvent::BeforeRendering);
        first.fail = true;
        let mut second = MarkerPass::new("second", RenderPassEvent::AfterRendering);
        let mut ctx = RenderContext::new();
        let result = {
            let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, TargetDescriptor::color(4, 4));
            renderer.enqueue_pass(&mut first);
            renderer.enqueue_pass(&mut second);
            renderer.execute(
                &mut TemporaryTargetPool::new(),
                &mut ctx,
                &mut CommandBufferPool::new(),
                &data(),
            )
        };
        assert_eq!(result, Err(PassError::NoSource("first".into())));
        assert!(ctx.batches().is_empty());
        assert_eq!(second.configured, 0);
        assert_eq!(second.cleaned, 1);
    }

    #[test]
    fn failed_frame_leaves_nothing_for_next_submit() {
        let mut ok = MarkerPass::new("ok", RenderPassEvent::BeforeRendering);
        let mut broken = MarkerPass::new("broken", RenderPassEvent::AfterRendering);
        broken.fail = true;
        let mut targets = TemporaryTargetPool::new();
        let mut ctx = RenderContext::new();
        let mut pool = CommandBufferPool::new();

        let result = {
            let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, TargetDescriptor::color(4, 4));
            renderer.enqueue_pass(&mut ok);
            renderer.enqueue_pass(&mut broken);
            renderer.execute(&mut targets, &mut ctx, &mut pool, &data())
        };
        assert!(result.is_err());
        assert!(ctx.batches().is_empty(), "failed frame left {:?}", ctx.batches());

        {
            let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, TargetDescriptor::color(4, 4));
            renderer.enqueue_pass(&mut ok);
            renderer.execute(&mut targets, &mut ctx, &mut pool, &data()).unwrap();
        }
        let names: Vec<_> = ctx.submit().into_iter().map(|b| b.name).collect();
        assert_eq!(names, ["ok"]);
    }

    #[test]
    fn failure_keeps_batches_queued_before_the_frame() {
        let mut broken = MarkerPass::new("broken", RenderPassEvent::AfterRendering);
        broken.fail = true;
        let mut ctx = RenderContext::new();
        ctx.execute_command_buffer(&CommandBuffer::new("earlier"));
        {
            let mut renderer = FrameRenderer::new(CAMERA_COLOR_TARGET, TargetDescriptor::color(4, 4));
            renderer.enqueue_pass(&mut broken);
            let _ = renderer.execute(
                &mut TemporaryTargetPool::new(),
                &mut ctx,
                &mut CommandBufferPool::new(),
                &data(),
            );
        }
        assert_eq!(ctx.batches().len(), 1);
        assert_eq!(ctx.batches()[0].name, "earlier");
    }
}
