use wgpu::{Adapter, Device, Instance, Queue};

use crate::error::{GpuError, Result};

/// Backends the host runs on. GL is left out: `ssgi.wgsl` loads texels from
/// the depth texture, which the GLSL backend cannot express.
pub const BACKENDS: wgpu::Backends = wgpu::Backends::PRIMARY;

pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
}

impl GpuContext {
    /// Create a headless GPU context (no surface), used for offscreen
    /// rendering and tests. The windowed demo builds its own surface-aware
    /// context.
    pub async fn new_headless() -> Result<Self> {
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: BACKENDS,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::AdapterRequestFailed)?;

        let (device, queue) = request_device(&adapter).await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }
}

pub async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("ssgi-gpu device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await?;
    log::info!("GPU device ready on {}", adapter.get_info().name);
    Ok((device, queue))
}
