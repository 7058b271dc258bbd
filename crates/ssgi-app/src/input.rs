use ssgi_core::{Quality, SsgiSettings};

// ---------------------------------------------------------------------------
// Key — windowing-library-independent key representation
// ---------------------------------------------------------------------------

/// A keyboard key, independent of any windowing library.
///
/// `main.rs` maps `winit::keyboard::PhysicalKey` → `Key`; everything else
/// in the input pipeline works purely with this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    G,
    N,
    Equal, // = / + (same physical key; Shift state ignored)
    Minus,
    BracketLeft,
    BracketRight,
    Comma,
    Period,
    R,
    Q,
    Escape,
}

// ---------------------------------------------------------------------------
// InputAction — what the app does in response to input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    ToggleEnabled,
    ToggleNoise,
    SamplesUp,
    SamplesDown,
    IndirectUp,
    IndirectDown,
    NoiseAmountUp,
    NoiseAmountDown,
    LoadQuality(Quality),
    Reset,
    Quit,
}

pub const SAMPLES_STEP: u32 = 8;
pub const INDIRECT_STEP: f32 = 4.0;
pub const NOISE_AMOUNT_STEP: f32 = 0.25;

// ---------------------------------------------------------------------------
// InputState
// ---------------------------------------------------------------------------

pub struct InputState;

impl InputState {
    pub fn new() -> Self {
        Self
    }

    /// Translate a `Key` press into an `InputAction`, if the key is mapped.
    pub fn on_key(&self, key: Key) -> Option<InputAction> {
        let action = match key {
            Key::Digit1 => InputAction::LoadQuality(Quality::Low),
            Key::Digit2 => InputAction::LoadQuality(Quality::Medium),
            Key::Digit3 => InputAction::LoadQuality(Quality::High),
            Key::Digit4 => InputAction::LoadQuality(Quality::Ultra),
            Key::G => InputAction::ToggleEnabled,
            Key::N => InputAction::ToggleNoise,
            Key::Equal => InputAction::SamplesUp,
            Key::Minus => InputAction::SamplesDown,
            Key::BracketRight => InputAction::IndirectUp,
            Key::BracketLeft => InputAction::IndirectDown,
            Key::Period => InputAction::NoiseAmountUp,
            Key::Comma => InputAction::NoiseAmountDown,
            Key::R => InputAction::Reset,
            Key::Q | Key::Escape => InputAction::Quit,
        };
        Some(action)
    }
}

// ---------------------------------------------------------------------------
// Settings edits (pure, testable)
// ---------------------------------------------------------------------------

/// Settings after applying `action` to `current`, clamped to their ranges.
/// Returns `None` for actions that don't edit settings.
///
/// Reset restores the defaults but keeps the material assignment.
pub fn apply_action(current: &SsgiSettings, action: InputAction) -> Option<SsgiSettings> {
    let mut next = current.clone();
    match action {
        InputAction::ToggleEnabled => next.enabled = !next.enabled,
        InputAction::ToggleNoise => next.noise = !next.noise,
        InputAction::SamplesUp => next.samples_count = next.samples_count.saturating_add(SAMPLES_STEP),
        InputAction::SamplesDown => {
            next.samples_count = next.samples_count.saturating_sub(SAMPLES_STEP)
        }
        InputAction::IndirectUp => next.indirect_amount += INDIRECT_STEP,
        InputAction::IndirectDown => next.indirect_amount -= INDIRECT_STEP,
        InputAction::NoiseAmountUp => next.noise_amount += NOISE_AMOUNT_STEP,
        InputAction::NoiseAmountDown => next.noise_amount -= NOISE_AMOUNT_STEP,
        InputAction::LoadQuality(quality) => next = quality.apply(current),
        InputAction::Reset => {
            next = SsgiSettings {
                material: current.material,
                ..SsgiSettings::default()
            }
        }
        InputAction::Quit => return None,
    }
    Some(next.clamped())
}

/// One-line summary for the window title.
pub fn describe(settings: &SsgiSettings) -> String {
    format!(
        "SSGI {} | samples {} | indirect {:.0} | noise {} {:.2}",
        if settings.enabled { "on" } else { "off" },
        settings.samples_count,
        settings.indirect_amount,
        if settings.noise { "on" } else { "off" },
        settings.noise_amount,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
