use std::ops::RangeInclusive;

use crate::MaterialId;

// ---------------------------------------------------------------------------
// RenderPassEvent — where in the frame a pass is inserted
// ---------------------------------------------------------------------------

/// Insertion points in a frame's pass ordering. Passes run in ascending
/// [`order`](RenderPassEvent::order); passes sharing an event keep the order
/// they were enqueued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderPassEvent {
    BeforeRendering,
    BeforeRenderingShadows,
    AfterRenderingShadows,
    BeforeRenderingPrePasses,
    AfterRenderingPrePasses,
    BeforeRenderingOpaques,
    #[default]
    AfterRenderingOpaques,
    BeforeRenderingSkybox,
    AfterRenderingSkybox,
    BeforeRenderingTransparents,
    AfterRenderingTransparents,
    BeforeRenderingPostProcessing,
    AfterRenderingPostProcessing,
    AfterRendering,
}

impl RenderPassEvent {
    pub const ALL: [RenderPassEvent; 14] = [
        RenderPassEvent::BeforeRendering,
        RenderPassEvent::BeforeRenderingShadows,
        RenderPassEvent::AfterRenderingShadows,
        RenderPassEvent::BeforeRenderingPrePasses,
        RenderPassEvent::AfterRenderingPrePasses,
        RenderPassEvent::BeforeRenderingOpaques,
        RenderPassEvent::AfterRenderingOpaques,
        RenderPassEvent::BeforeRenderingSkybox,
        RenderPassEvent::AfterRenderingSkybox,
        RenderPassEvent::BeforeRenderingTransparents,
        RenderPassEvent::AfterRenderingTransparents,
        RenderPassEvent::BeforeRenderingPostProcessing,
        RenderPassEvent::AfterRenderingPostProcessing,
        RenderPassEvent::AfterRendering,
    ];

    pub fn order(self) -> u32 {
        match self {
            RenderPassEvent::BeforeRendering => 0,
            RenderPassEvent::BeforeRenderingShadows => 50,
            RenderPassEvent::AfterRenderingShadows => 100,
            RenderPassEvent::BeforeRenderingPrePasses => 150,
            RenderPassEvent::AfterRenderingPrePasses => 200,
            RenderPassEvent::BeforeRenderingOpaques => 250,
            RenderPassEvent::AfterRenderingOpaques => 300,
            RenderPassEvent::BeforeRenderingSkybox => 350,
            RenderPassEvent::AfterRenderingSkybox => 400,
            RenderPassEvent::BeforeRenderingTransparents => 450,
            RenderPassEvent::AfterRenderingTransparents => 500,
            RenderPassEvent::BeforeRenderingPostProcessing => 550,
            RenderPassEvent::AfterRenderingPostProcessing => 600,
            RenderPassEvent::AfterRendering => 1000,
        }
    }
}

impl PartialOrd for RenderPassEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RenderPassEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order().cmp(&other.order())
    }
}

// ---------------------------------------------------------------------------
// SsgiSettings — user-edited configuration of the effect
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SsgiSettings {
    pub render_pass_event: RenderPassEvent,
    /// Effect material. `None` disables the pass regardless of `enabled`.
    pub material: Option<MaterialId>,
    pub samples_count: u32,
    pub indirect_amount: f32,
    pub noise_amount: f32,
    pub noise: bool,
    pub enabled: bool,
}

impl SsgiSettings {
    pub const SAMPLES_COUNT_RANGE: RangeInclusive<u32> = 8..=128;
    pub const INDIRECT_AMOUNT_RANGE: RangeInclusive<f32> = 0.0..=512.0;
    pub const NOISE_AMOUNT_RANGE: RangeInclusive<f32> = 0.0..=5.0;

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Copy of these settings with every numeric field forced into its
    /// declared range. NaN maps to the range minimum.
    pub fn clamped(&self) -> Self {
        Self {
            samples_count: clamp_u32(self.samples_count, &Self::SAMPLES_COUNT_RANGE),
            indirect_amount: clamp_f32(self.indirect_amount, &Self::INDIRECT_AMOUNT_RANGE),
            noise_amount: clamp_f32(self.noise_amount, &Self::NOISE_AMOUNT_RANGE),
            ..self.clone()
        }
    }

    /// True if every numeric field lies within its declared range.
    pub fn in_range(&self) -> bool {
        Self::SAMPLES_COUNT_RANGE.contains(&self.samples_count)
            && Self::INDIRECT_AMOUNT_RANGE.contains(&self.indirect_amount)
            && Self::NOISE_AMOUNT_RANGE.contains(&self.noise_amount)
    }
}

impl Default for SsgiSettings {
    fn default() -> Self {
        Self {
            render_pass_event: RenderPassEvent::AfterRenderingOpaques,
            material: None,
            samples_count: 8,
            indirect_amount: 8.0,
            noise_amount: 2.0,
            noise: true,
            enabled: true,
        }
    }
}

pub fn clamp_u32(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

pub fn clamp_f32(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}
