use crate::settings::SsgiSettings;

/// Quality presets, trading sample count for speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Low,
    Medium,
    High,
    Ultra,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Low, Quality::Medium, Quality::High, Quality::Ultra];

    pub fn name(self) -> &'static str {
        match self {
            Quality::Low => "Low",
            Quality::Medium => "Medium",
            Quality::High => "High",
            Quality::Ultra => "Ultra",
        }
    }

    pub fn samples_count(self) -> u32 {
        match self {
            Quality::Low => 8,
            Quality::Medium => 16,
            Quality::High => 32,
            Quality::Ultra => 64,
        }
    }

    /// Apply this preset on top of `base`. Only the sample count and noise
    /// change; material, insertion point and toggles are kept.
    pub fn apply(self, base: &SsgiSettings) -> SsgiSettings {
        // Fewer samples need more noise to hide banding.
        let noise_amount = match self {
            Quality::Low => 2.0,
            Quality::Medium => 1.5,
            Quality::High => 1.0,
            Quality::Ultra => 0.5,
        };
        SsgiSettings {
            samples_count: self.samples_count(),
            noise_amount,
            ..base.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaterialId;

    #[test]
    fn all_contains_four_presets() {
        assert_eq!(Quality::ALL.len(), 4);
    }

    #[test]
    fn all_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for q in Quality::ALL {
            assert!(seen.insert(q.name()), "duplicate preset name: {}", q.name());
        }
    }

    #[test]
    fn sample_counts_increase_with_quality() {
        for pair in Quality::ALL.windows(2) {
            assert!(pair[0].samples_count() < pair[1].samples_count());
        }
    }

    #[test]
    fn presets_stay_in_range() {
        let base = SsgiSettings::default();
        for q in Quality::ALL {
            assert!(q.apply(&base).in_range(), "{q:?} out of range");
        }
    }

    #[test]
    fn apply_keeps_material_and_toggles() {
        let base = SsgiSettings {
            enabled: false,
            noise: false,
            ..SsgiSettings::default().with_material(MaterialId(9))
        };
        let s = Quality::High.apply(&base);
        assert_eq!(s.material, Some(MaterialId(9)));
        assert!(!s.enabled);
        assert!(!s.noise);
        assert_eq!(s.samples_count, 32);
    }
}
