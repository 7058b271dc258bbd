use glam::Mat4;
use ssgi_core::MaterialId;
use wgpu::{BindGroupLayout, Buffer, Device, Queue, RenderPipeline};

use crate::error::{GpuError, Result};

// ---------------------------------------------------------------------------
// UniformLayout — named material properties packed into one uniform block
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Mat4,
}

impl UniformKind {
    fn align(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Mat4 => 16,
        }
    }

    fn size(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub name: &'static str,
    pub kind: UniformKind,
    pub offset: usize,
}

/// Byte layout of a WGSL uniform struct, in declaration order. Follows the
/// WGSL uniform address-space rules for the supported member types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    size: usize,
}

impl UniformLayout {
    pub fn new(members: &[(&'static str, UniformKind)]) -> Self {
        let mut fields = Vec::with_capacity(members.len());
        let mut cursor = 0usize;
        for &(name, kind) in members {
            let offset = cursor.next_multiple_of(kind.align());
            fields.push(UniformField { name, kind, offset });
            cursor = offset + kind.size();
        }
        // Uniform structs are padded to 16 bytes.
        let size = cursor.next_multiple_of(16).max(16);
        Self { fields, size }
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

// ---------------------------------------------------------------------------
// MaterialProperties — CPU copy of the uniform block
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MaterialProperties {
    layout: UniformLayout,
    data: Vec<u8>,
    dirty: bool,
}

impl MaterialProperties {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0u8; layout.size()];
        Self { layout, data, dirty: true }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Set a float property. Int slots receive the truncated value.
    /// Returns false if the shader declares no scalar of that name.
    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        match self.layout.field(name).copied() {
            Some(UniformField { kind: UniformKind::Float, offset, .. }) => {
                self.write(offset, bytemuck::bytes_of(&value))
            }
            Some(UniformField { kind: UniformKind::Int, offset, .. }) => {
                self.write(offset, bytemuck::bytes_of(&(value as i32)))
            }
            _ => false,
        }
    }

    /// Set an int property. Float slots receive the converted value.
    pub fn set_int(&mut self, name: &str, value: i32) -> bool {
        match self.layout.field(name).copied() {
            Some(UniformField { kind: UniformKind::Int, offset, .. }) => {
                self.write(offset, bytemuck::bytes_of(&value))
            }
            Some(UniformField { kind: UniformKind::Float, offset, .. }) => {
                self.write(offset, bytemuck::bytes_of(&(value as f32)))
            }
            _ => false,
        }
    }

    pub fn set_matrix(&mut self, name: &str, value: Mat4) -> bool {
        match self.layout.field(name).copied() {
            Some(UniformField { kind: UniformKind::Mat4, offset, .. }) => {
                // glam and WGSL are both column-major.
                self.write(offset, bytemuck::bytes_of(&value.to_cols_array()))
            }
            _ => false,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        let f = self.layout.field(name).filter(|f| f.kind == UniformKind::Float)?;
        Some(bytemuck::pod_read_unaligned(&self.data[f.offset..f.offset + 4]))
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        let f = self.layout.field(name).filter(|f| f.kind == UniformKind::Int)?;
        Some(bytemuck::pod_read_unaligned(&self.data[f.offset..f.offset + 4]))
    }

    pub fn get_matrix(&self, name: &str) -> Option<Mat4> {
        let f = self.layout.field(name).filter(|f| f.kind == UniformKind::Mat4)?;
        let cols: [f32; 16] = bytemuck::pod_read_unaligned(&self.data[f.offset..f.offset + 64]);
        Some(Mat4::from_cols_array(&cols))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hand out the bytes for upload and clear the dirty flag.
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(&self.data)
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> bool {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.dirty = true;
        true
    }
}

// ---------------------------------------------------------------------------
// Material — a shader with one pipeline per pass plus its properties
// ---------------------------------------------------------------------------

/// Bindings shared by every material:
/// 0 source color, 1 sampler, 2 properties, 3 camera depth.
pub fn material_bind_group_layout(device: &Device, label: &str) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
        ],
    })
}

pub struct Material {
    pub label: String,
    pub properties: MaterialProperties,
    uniform_buf: Buffer,
    bind_group_layout: BindGroupLayout,
    passes: Vec<RenderPipeline>,
    target_format: wgpu::TextureFormat,
}

impl Material {
    /// Build a material from a WGSL module exposing `vs_main` and one
    /// fragment entry point per pass.
    pub fn new(
        device: &Device,
        label: &str,
        wgsl: &str,
        fragment_entries: &[&str],
        layout: UniformLayout,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let bind_group_layout = material_bind_group_layout(device, label);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });

        let passes = fragment_entries
            .iter()
            .map(|&entry| {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(entry),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &module,
                        entry_point: "vs_main",
                        buffers: &[],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &module,
                        entry_point: entry,
                        targets: &[Some(wgpu::ColorTargetState {
                            format: target_format,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
            })
            .collect();

        let uniform_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: layout.size() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            label: label.to_string(),
            properties: MaterialProperties::new(layout),
            uniform_buf,
            bind_group_layout,
            passes,
            target_format,
        }
    }

    pub fn pass(&self, index: u32) -> Result<&RenderPipeline> {
        self.passes
            .get(index as usize)
            .ok_or_else(|| GpuError::UnknownMaterialPass { material: self.label.clone(), pass: index })
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    pub fn bind_group_layout(&self) -> &BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn uniform_buffer(&self) -> &Buffer {
        &self.uniform_buf
    }

    /// Upload the properties if they changed since the last upload.
    pub fn flush(&mut self, queue: &Queue) {
        if let Some(bytes) = self.properties.take_dirty() {
            queue.write_buffer(&self.uniform_buf, 0, bytes);
        }
    }
}

// ---------------------------------------------------------------------------
// MaterialStore — owns materials; everything else holds a MaterialId
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MaterialStore {
    materials: Vec<Material>,
}

impl MaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        log::debug!("material '{}' registered as {:?}", material.label, id);
        self.materials.push(material);
        id
    }

    pub fn get(&self, id: MaterialId) -> Result<&Material> {
        self.materials.get(id.0 as usize).ok_or(GpuError::UnknownMaterial(id))
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Result<&mut Material> {
        self.materials.get_mut(id.0 as usize).ok_or(GpuError::UnknownMaterial(id))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
