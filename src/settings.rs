//! Presentation preferences
//!
//! The simulation queues effects regardless of taste; the host runs them
//! through `Settings::filter` before playing them.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::sim::Effect;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
pub enum QualityPreset {
    Low,
    #[default]
    #[value(alias = "med")]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Maximum particles in a single burst for this preset
    pub fn max_particles(&self) -> u32 {
        match self {
            QualityPreset::Low => 8,
            QualityPreset::Medium => 20,
            QualityPreset::High => 64,
        }
    }
}

/// Player-facing effect preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Camera shake on hits and deaths
    pub screen_shake: bool,
    /// Red flash when the player is hit
    pub camera_flash: bool,
    /// Spark and blood particles
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (no shake or flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            camera_flash: true,
            particles: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        // Low preset trades the flash for performance
        if preset == QualityPreset::Low {
            self.camera_flash = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective camera flash (respects reduced_motion)
    pub fn effective_camera_flash(&self) -> bool {
        self.camera_flash && !self.reduced_motion
    }

    /// Effective particle cap per burst
    pub fn max_particles(&self) -> u32 {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Drop effects the player opted out of and cap particle counts.
    /// Gameplay-relevant feedback (tints, banners, health, game over) always passes.
    pub fn filter(&self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::CameraShake { .. } if !self.effective_screen_shake() => None,
            Effect::CameraFlash { .. } if !self.effective_camera_flash() => None,
            Effect::SparkBurst { pos, count, lifespan_ms } => {
                let count = count.min(self.max_particles());
                (count > 0).then_some(Effect::SparkBurst { pos, count, lifespan_ms })
            }
            Effect::BloodSpray { pos, count, lifespan_ms } => {
                let count = count.min(self.max_particles());
                (count > 0).then_some(Effect::BloodSpray { pos, count, lifespan_ms })
            }
            other => Some(other),
        }
    }
}
