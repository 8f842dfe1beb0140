//! # Alpha Correction Presets
//!
//! Compiled-in catalog of threshold band sets for common console texture
//! formats. Presets are immutable and looked up by name, case-insensitively.
//!
//! | Preset | Levels | Mode |
//! |--------|--------|------|
//! | `ps2_binary` | 0 / 255 | threshold |
//! | `ps2_three_level` | 0 / 128 / 255 | threshold |
//! | `ps2_ui` | 0 / 255, cutoff at 64 | threshold |
//! | `ps2_smooth` | snaps extremes, keeps mid-range | hybrid |
//! | `generic_binary` | 0 / 255 | threshold |
//! | `clean_edges` | snaps fringes, keeps mid-range | hybrid |
//! | `ps2_four_level` | 0 / 85 / 170 / 255 | threshold |
//! | `psp_binary` | 0 / 255, cutoff at 100 | threshold |
//! | `gamecube_wii` | 8 levels (5-bit alpha) | threshold |
//! | `xbox_standard` | 0 / 128 / 255 | threshold |
//! | `fade_out` | snaps extremes, keeps fades | hybrid |
//! | `soft_edges` | snaps near-extremes only | hybrid |
//! | `dithered` | 0 / 128 / 255 | threshold |

use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// Alpha values in `min..=max` are set to `target`; a `None` target keeps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdBand {
    pub min: u8,
    pub max: u8,
    pub target: Option<u8>,
}

impl ThresholdBand {
    pub const fn new(min: u8, max: u8, target: Option<u8>) -> Self {
        Self { min, max, target }
    }

    /// Band that snaps its range to `target`.
    pub const fn snap(min: u8, max: u8, target: u8) -> Self {
        Self::new(min, max, Some(target))
    }

    /// Band that leaves its range untouched.
    pub const fn keep(min: u8, max: u8) -> Self {
        Self::new(min, max, None)
    }

    #[inline]
    pub fn contains(&self, alpha: u8) -> bool {
        self.min <= alpha && alpha <= self.max
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.min > self.max {
            return Err(EngineError::invalid_input(
                "band",
                "min must not exceed max",
                format!("{}..={}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// How a preset treats the alpha range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetMode {
    /// Every band snaps to a fixed value.
    Threshold,
    /// Some bands keep their values.
    Hybrid,
}

impl PresetMode {
    /// Hybrid when any band keeps its range, threshold otherwise.
    pub fn for_bands(bands: &[ThresholdBand]) -> Self {
        if bands.iter().any(|band| band.target.is_none()) {
            PresetMode::Hybrid
        } else {
            PresetMode::Threshold
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub bands: &'static [ThresholdBand],
    pub mode: PresetMode,
}

use ThresholdBand as B;

static CATALOG: [Preset; 13] = [
    Preset {
        name: "ps2_binary",
        description: "PS2 textures with binary alpha (fully transparent or fully opaque)",
        bands: &[B::snap(0, 127, 0), B::snap(128, 255, 255)],
        mode: PresetMode::Threshold,
    },
    Preset {
        name: "ps2_three_level",
        description: "PS2 textures with three alpha levels (0, 128, 255)",
        bands: &[B::snap(0, 42, 0), B::snap(43, 212, 128), B::snap(213, 255, 255)],
        mode: PresetMode::Threshold,
    },
    Preset {
        name: "ps2_ui",
        description: "PS2 UI elements with sharp alpha cutoff",
        bands: &[B::snap(0, 64, 0), B::snap(65, 255, 255)],
        mode: PresetMode::Threshold,
    },
    Preset {
        name: "ps2_smooth",
        description: "PS2 textures with smooth alpha gradients normalized to standard values",
        bands: &[B::snap(0, 10, 0), B::keep(11, 245), B::snap(246, 255, 255)],
        mode: PresetMode::Hybrid,
    },
    Preset {
        name: "generic_binary",
        description: "Simple binary alpha (transparent or opaque)",
        bands: &[B::snap(0, 127, 0), B::snap(128, 255, 255)],
        mode: PresetMode::Threshold,
    },
    Preset {
        name: "clean_edges",
        description: "Remove semi-transparent fringing around edges",
        bands: &[B::snap(0, 32, 0), B::keep(33, 223), B::snap(224, 255, 255)],
        mode: PresetMode::Hybrid,
    },
    Preset {
        name: "ps2_four_level",
        description: "PS2 textures with four alpha levels (0, 85, 170, 255)",
        bands: &[
            B::snap(0, 42, 0),
            B::snap(43, 127, 85),
            B::snap(128, 212, 170),
            B::snap(213, 255, 255),
        ],
        mode: PresetMode::Threshold,
    },
    Preset {
        name: "psp_binary",
        description: "PSP textures with binary alpha",
        bands: &[B::snap(0, 100, 0), B::snap(101, 255, 255)],
        mode: PresetMode::Threshold,
    },
    Preset {
        name: "gamecube_wii",
        description: "GameCube and Wii textures with quantized 5-bit alpha (8 levels)",
        bands: &[
            B::snap(0, 16, 0),
            B::snap(17, 52, 36),
            B::snap(53, 88, 73),
            B::snap(89, 124, 109),
            B::snap(125, 160, 146),
            B::snap(161, 196, 182),
            B::snap(197, 232, 219),
            B::snap(233, 255, 255),
        ],
        mode: PresetMode::Threshold,
    },
    Preset {
        name: "xbox_standard",
        description: "Xbox textures with three alpha levels (transparent, half, opaque)",
        bands: &[B::snap(0, 64, 0), B::snap(65, 191, 128), B::snap(192, 255, 255)],
        mode: PresetMode::Threshold,
    },
    Preset {
        name: "fade_out",
        description: "Normalize fade-out gradients: keep the mid-range, snap the extremes",
        bands: &[B::snap(0, 15, 0), B::keep(16, 240), B::snap(241, 255, 255)],
        mode: PresetMode::Hybrid,
    },
    Preset {
        name: "soft_edges",
        description: "Keep anti-aliased edges while cleaning near-extreme noise",
        bands: &[B::snap(0, 8, 0), B::keep(9, 247), B::snap(248, 255, 255)],
        mode: PresetMode::Hybrid,
    },
    Preset {
        name: "dithered",
        description: "Fix dithered transparency patterns",
        bands: &[B::snap(0, 84, 0), B::snap(85, 170, 128), B::snap(171, 255, 255)],
        mode: PresetMode::Threshold,
    },
];

/// Every preset, in catalog order.
pub fn catalog() -> &'static [Preset] {
    &CATALOG
}

pub fn preset_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|preset| preset.name)
}

/// Look up a preset by name, ignoring ASCII case.
pub fn find_preset(name: &str) -> EngineResult<&'static Preset> {
    CATALOG
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| EngineError::unknown_preset(name))
}

/// Where a correction gets its bands from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandSource {
    Preset(&'static Preset),
    Bands(Vec<ThresholdBand>),
}

impl BandSource {
    /// Resolve a catalog name.
    pub fn preset(name: &str) -> EngineResult<Self> {
        find_preset(name).map(BandSource::Preset)
    }

    pub fn bands(&self) -> &[ThresholdBand] {
        match self {
            BandSource::Preset(preset) => preset.bands,
            BandSource::Bands(bands) => bands,
        }
    }

    pub fn mode(&self) -> PresetMode {
        match self {
            BandSource::Preset(preset) => preset.mode,
            BandSource::Bands(bands) => PresetMode::for_bands(bands),
        }
    }

    /// Display name for logs: the preset name or `custom`.
    pub fn label(&self) -> &str {
        match self {
            BandSource::Preset(preset) => preset.name,
            BandSource::Bands(_) => "custom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_preset("PS2_Binary").unwrap().name, "ps2_binary");
        assert!(matches!(
            find_preset("n64_fog"),
            Err(EngineError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn catalog_bands_are_valid_and_cover_full_range() {
        assert_eq!(preset_names().count(), 13);
        for preset in catalog() {
            let bands = preset.bands;
            assert!(bands.iter().all(|b| b.validate().is_ok()), "{}", preset.name);
            assert_eq!(bands.first().map(|b| b.min), Some(0), "{}", preset.name);
            assert_eq!(bands.last().map(|b| b.max), Some(255), "{}", preset.name);
            for pair in bands.windows(2) {
                assert_eq!(pair[0].max as u16 + 1, pair[1].min as u16, "{}", preset.name);
            }
            assert_eq!(PresetMode::for_bands(bands), preset.mode, "{}", preset.name);
        }
    }

    #[test]
    fn band_source_mode_for_custom_bands() {
        let source = BandSource::Bands(vec![ThresholdBand::snap(0, 255, 0)]);
        assert_eq!(source.mode(), PresetMode::Threshold);
        assert_eq!(source.label(), "custom");
        let source = BandSource::Bands(vec![ThresholdBand::keep(0, 255)]);
        assert_eq!(source.mode(), PresetMode::Hybrid);
    }

    #[test]
    fn inverted_band_is_invalid() {
        assert!(ThresholdBand::snap(200, 100, 0).validate().is_err());
    }
}
