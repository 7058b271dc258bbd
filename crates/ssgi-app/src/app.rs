use std::sync::Arc;
use std::time::Instant;

use ssgi_core::{
    RendererFeature, SsgiFeature, SsgiSettings, CAMERA_COLOR_TARGET, CAMERA_DEPTH_TARGET,
};
use ssgi_gpu::{
    context::{request_device, BACKENDS},
    renderer::{fullscreen_bind_group_layout, fullscreen_pipeline},
    scene::{SceneCamera, ScenePass},
    ssgi_material::create_ssgi_material,
    GpuError, GpuHost,
};
use winit::window::Window;

use crate::input::{apply_action, describe, InputAction, InputState, Key};

// ---------------------------------------------------------------------------
// Simple FPS counter — logs to console once per second
// ---------------------------------------------------------------------------

struct FpsCounter {
    frames: u32,
    last_report: Instant,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            last_report: Instant::now(),
        }
    }

    /// Increment the frame count. Returns the FPS value once a full second
    /// has elapsed since the last report.
    fn tick(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.last_report.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.last_report = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// App — scene, SSGI feature and present pass
// ---------------------------------------------------------------------------

pub struct App {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,

    host: GpuHost,
    scene: ScenePass,
    camera: SceneCamera,
    feature: SsgiFeature,

    // Camera color → surface
    present_pipeline: wgpu::RenderPipeline,
    present_bgl: wgpu::BindGroupLayout,
    present_sampler: wgpu::Sampler,

    input: InputState,
    fps: FpsCounter,
}

impl App {
    /// Initialise wgpu for a given window. The window is wrapped in `Arc` so
    /// that the surface can hold a `'static` reference to it.
    pub fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        // ---- Instance & surface ---------------------------------------------
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: BACKENDS,
            ..Default::default()
        });
        let surface = instance.create_surface(Arc::clone(&window))?;

        // ---- Adapter, device & queue ----------------------------------------
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::AdapterRequestFailed)?;
        let (device, queue) = pollster::block_on(request_device(&adapter))?;

        // ---- Surface configuration ------------------------------------------
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(GpuError::AdapterRequestFailed)?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!("Surface configured: {}×{} {:?} Fifo", width, height, format);

        // ---- Host, scene and feature ----------------------------------------
        let mut host = GpuHost::new(&device, width, height);
        let material = host.materials.add(create_ssgi_material(&device));
        let scene = ScenePass::new(&device);

        let mut feature = SsgiFeature::new(SsgiSettings::default().with_material(material));
        feature.create();

        // ---- Present pipeline -----------------------------------------------
        let present_bgl = fullscreen_bind_group_layout(&device, "present_bgl");
        let present_pipeline = fullscreen_pipeline(&device, "present", &present_bgl, format);
        let present_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("present_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let app = Self {
            window,
            surface,
            device,
            queue,
            surface_config,
            host,
            scene,
            camera: SceneCamera::default(),
            feature,
            present_pipeline,
            present_bgl,
            present_sampler,
            input: InputState::new(),
            fps: FpsCounter::new(),
        };
        app.update_title();
        Ok(app)
    }

    // -------------------------------------------------------------------------
    // Resize
    // -------------------------------------------------------------------------

    /// Reconfigure the surface and rebuild the camera targets.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            return;
        }
        self.surface_config.width = new_width;
        self.surface_config.height = new_height;
        self.surface.configure(&self.device, &self.surface_config);
        self.host.resize(&self.device, new_width, new_height);

        log::debug!("Surface resized to {}×{}", new_width, new_height);
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    pub fn on_key_pressed(&self, key: Key) -> Option<InputAction> {
        self.input.on_key(key)
    }

    /// Apply an action. Settings edits recreate the feature, the same way an
    /// editor change would.
    ///
    /// Returns `true` if the app should exit.
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        if action == InputAction::Quit {
            return true;
        }
        if let Some(settings) = apply_action(self.feature.settings(), action) {
            log::info!("{:?}: {}", action, describe(&settings));
            self.feature.recreate(settings);
            self.update_title();
        }
        false
    }

    fn update_title(&self) {
        self.window.set_title(&describe(self.feature.settings()));
    }

    // -------------------------------------------------------------------------
    // Render
    // -------------------------------------------------------------------------

    /// One frame: draw the scene into the camera targets, run the SSGI
    /// feature over them, then present the camera color.
    pub fn render(&mut self) -> Result<(), GpuError> {
        if let Some(fps) = self.fps.tick() {
            log::debug!("FPS: {:.1}  {}", fps, describe(self.feature.settings()));
        }

        let aspect = self.surface_config.width as f32 / self.surface_config.height as f32;
        let data = self.host.rendering_data(self.camera.projection(aspect));

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        // --- 1. Scene ----------------------------------------------------------
        {
            let color = self.host.targets.get(CAMERA_COLOR_TARGET)?;
            let depth = self.host.targets.get(CAMERA_DEPTH_TARGET)?;
            self.scene.draw(
                &self.queue,
                &mut encoder,
                &color.view,
                &depth.view,
                &self.camera.uniforms(aspect, data.clip),
            );
        }

        // --- 2. SSGI -----------------------------------------------------------
        self.host.render_feature(
            &self.device,
            &self.queue,
            &mut encoder,
            &mut self.feature,
            &data,
        )?;

        // --- 3. Present --------------------------------------------------------
        let color = self.host.targets.get(CAMERA_COLOR_TARGET)?;
        let present_bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("present_bg"),
            layout: &self.present_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.present_sampler),
                },
            ],
        });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.present_pipeline);
            rpass.set_bind_group(0, &present_bg, &[]);
            rpass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
