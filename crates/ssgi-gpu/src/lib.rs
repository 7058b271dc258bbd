pub mod context;
pub mod error;
pub mod executor;
pub mod host;
pub mod material;
pub mod renderer;
pub mod scene;
pub mod ssgi_material;
pub mod targets;

pub use error::{GpuError, Result};
pub use host::GpuHost;

#[cfg(test)]
mod tests {
    use ssgi_core::{
        CommandBuffer, FilterMode, RenderContext, RendererFeature, SsgiFeature, SsgiSettings,
        TargetDescriptor, TargetId, TemporaryTargetPool, CAMERA_COLOR_TARGET,
    };

    use crate::context::GpuContext;
    use crate::executor::CommandExecutor;
    use crate::host::GpuHost;
    use crate::material::MaterialStore;
    use crate::scene::{SceneCamera, ScenePass};
    use crate::ssgi_material::{create_ssgi_material, ssgi_uniform_layout, SSGI_WGSL};
    use crate::targets::{TargetTextures, COLOR_FORMAT};

    /// A usable GPU, or `None` when the machine has no non-GL adapter.
    fn gpu() -> Option<GpuContext> {
        let Ok(ctx) = pollster::block_on(GpuContext::new_headless()) else {
            eprintln!("no GPU adapter; skipping");
            return None;
        };
        if ctx.adapter.get_info().backend == wgpu::Backend::Gl {
            eprintln!("GL adapter cannot load depth texels; skipping");
            return None;
        }
        Some(ctx)
    }

    fn validate(label: &str, src: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(src)
            .unwrap_or_else(|e| panic!("{label} failed to parse:\n{}", e.emit_to_string(src)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{label} failed validation: {e:?}"));
        module
    }

    #[test]
    fn shaders_validate() {
        validate("blit.wgsl", crate::renderer::FULLSCREEN_WGSL);
        validate("scene.wgsl", include_str!("../shaders/scene.wgsl"));
        validate("ssgi.wgsl", SSGI_WGSL);
    }

    #[test]
    fn ssgi_layout_matches_shader_struct() {
        let module = validate("ssgi.wgsl", SSGI_WGSL);
        let (members, span) = module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(name), naga::TypeInner::Struct { members, span }) if name == "SsgiParams" => {
                    Some((members.clone(), *span))
                }
                _ => None,
            })
            .expect("SsgiParams struct not found");

        let layout = ssgi_uniform_layout();
        assert_eq!(span as usize, layout.size());
        for member in &members {
            let name = member.name.as_deref().unwrap_or_default();
            let field = layout.field(name).unwrap_or_else(|| panic!("no slot for {name}"));
            assert_eq!(field.offset, member.offset as usize, "offset of {name}");
        }
        assert_eq!(members.len(), layout.fields().len());
    }

    /// Renders a few frames offscreen. Skipped when no adapter is available.
    #[test]
    fn offscreen_frames_replay_expected_commands() {
        let Some(ctx) = gpu() else { return };
        let (width, height) = (64, 48);
        let mut host = GpuHost::new(&ctx.device, width, height);
        let material = host.materials.add(create_ssgi_material(&ctx.device));
        let scene = ScenePass::new(&ctx.device);
        let camera = SceneCamera::default();

        let mut feature = SsgiFeature::new(SsgiSettings::default().with_material(material));
        feature.create();

        for enabled in [true, false] {
            if !enabled {
                let settings = SsgiSettings { enabled: false, ..feature.settings().clone() };
                feature.recreate(settings);
            }
            let aspect = width as f32 / height as f32;
            let data = host.rendering_data(camera.projection(aspect));
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test") });
            {
                let color = host.targets.get(CAMERA_COLOR_TARGET).unwrap();
                let depth = host.targets.get(ssgi_core::CAMERA_DEPTH_TARGET).unwrap();
                scene.draw(
                    &ctx.queue,
                    &mut encoder,
                    &color.view,
                    &depth.view,
                    &camera.uniforms(aspect, data.clip),
                );
            }
            let stats = host
                .render_feature(&ctx.device, &ctx.queue, &mut encoder, &mut feature, &data)
                .unwrap();
            ctx.queue.submit(std::iter::once(encoder.finish()));
            ctx.device.poll(wgpu::Maintain::Wait);

            if enabled {
                assert_eq!((stats.parameters, stats.material_blits, stats.copies), (5, 1, 1));
            } else {
                assert_eq!((stats.parameters, stats.material_blits, stats.skipped), (0, 0, 1));
            }
        }

        let temp = host.temporary_targets().iter().next().map(|(_, d)| *d).unwrap();
        assert_eq!((temp.width, temp.height), (width, height));
        assert_eq!(host.materials.get(material).unwrap().target_format(), COLOR_FORMAT);
    }

    #[test]
    fn copies_between_sizes_are_resampled() {
        let Some(ctx) = gpu() else { return };
        let mut targets = TargetTextures::new();
        targets.create_camera_targets(&ctx.device, 64, 48);

        let half = TargetId::from_name("half");
        let mut pool = TemporaryTargetPool::new();
        pool.get_temporary(
            half,
            TargetDescriptor { filter: FilterMode::Point, ..TargetDescriptor::color(32, 24) },
        );
        targets.sync(&ctx.device, &pool);

        let mut cmd = CommandBuffer::new("downsample");
        cmd.blit(CAMERA_COLOR_TARGET, half);
        cmd.blit(half, CAMERA_COLOR_TARGET);
        let mut render = RenderContext::new();
        render.execute_command_buffer(&cmd);

        let mut executor = CommandExecutor::new(&ctx.device);
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test") });
        let stats = executor
            .replay(
                &ctx.device,
                &ctx.queue,
                &mut encoder,
                &mut MaterialStore::new(),
                &targets,
                &render.submit(),
            )
            .unwrap();
        ctx.queue.submit(std::iter::once(encoder.finish()));
        ctx.device.poll(wgpu::Maintain::Wait);

        assert_eq!((stats.copies, stats.skipped, stats.material_blits), (2, 0, 0));
        assert_eq!(targets.get(half).unwrap().width, 32);
    }
}
