//! Engine settings
//!
//! Tuning for the collider group: evaluation cadence, hit-detection precision
//! and capacity. Stored as JSON; missing keys fall back to the defaults in
//! [`crate::consts`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, Result};

/// Cadence presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CadencePreset {
    /// Fewer evaluations, cheaper with many objects
    Relaxed,
    #[default]
    Balanced,
    /// More evaluations, less tunneling for small fast objects
    Precise,
}

impl CadencePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            CadencePreset::Relaxed => "Relaxed",
            CadencePreset::Balanced => "Balanced",
            CadencePreset::Precise => "Precise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "low" => Some(CadencePreset::Relaxed),
            "balanced" | "medium" => Some(CadencePreset::Balanced),
            "precise" | "high" => Some(CadencePreset::Precise),
            _ => None,
        }
    }

    /// (least frequent, most frequent) evaluation interval in ms
    pub fn intervals_ms(&self) -> (u64, u64) {
        match self {
            CadencePreset::Relaxed => (200, 50),
            CadencePreset::Balanced => (LEAST_FREQUENT_INTERVAL_MS, MOST_FREQUENT_INTERVAL_MS),
            CadencePreset::Precise => (50, 10),
        }
    }

    /// Hit detection march increment
    pub fn step_precision(&self) -> f32 {
        match self {
            CadencePreset::Relaxed => 1.0,
            CadencePreset::Balanced => STEP_PRECISION,
            CadencePreset::Precise => 0.25,
        }
    }
}

/// Collider group configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Preset the cadence fields were derived from
    pub preset: CadencePreset,

    // === Time ===
    /// Global simulation speed multiplier (1.0 = real time)
    pub speed_ratio: f32,

    // === Capacity ===
    /// Maximum concurrently registered colliders
    pub max_colliders: usize,

    // === Cadence ===
    /// Re-evaluation interval for objects at or below `slow_speed`
    pub least_frequent_interval_ms: u64,
    /// Re-evaluation interval for objects at or above `fast_speed`
    pub most_frequent_interval_ms: u64,
    pub slow_speed: f32,
    pub fast_speed: f32,

    // === Hit detection ===
    pub step_precision: f32,
    /// Visibility = travel distance * lookahead
    pub lookahead: f32,
    /// Gap left between a mover and what it struck
    pub impact_backoff: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            preset: CadencePreset::Balanced,

            speed_ratio: 1.0,

            max_colliders: DEFAULT_MAX_COLLIDERS,

            least_frequent_interval_ms: LEAST_FREQUENT_INTERVAL_MS,
            most_frequent_interval_ms: MOST_FREQUENT_INTERVAL_MS,
            slow_speed: SLOW_SPEED,
            fast_speed: FAST_SPEED,

            step_precision: STEP_PRECISION,
            lookahead: LOOKAHEAD,
            impact_backoff: IMPACT_BACKOFF,
        }
    }
}

impl EngineSettings {
    /// Create settings from a cadence preset
    pub fn from_preset(preset: CadencePreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a cadence preset (updates the cadence and precision fields)
    pub fn apply_preset(&mut self, preset: CadencePreset) {
        let (least, most) = preset.intervals_ms();
        self.preset = preset;
        self.least_frequent_interval_ms = least;
        self.most_frequent_interval_ms = most;
        self.step_precision = preset.step_precision();
    }

    /// How long an object moving at `speed` waits between evaluations.
    ///
    /// Linear in speed between (`slow_speed`, least frequent) and
    /// (`fast_speed`, most frequent), clamped outside that range.
    pub fn evaluation_interval(&self, speed: f32) -> Duration {
        let least = self.least_frequent_interval_ms as f32;
        let most = self.most_frequent_interval_ms as f32;
        let span = self.fast_speed - self.slow_speed;
        let t = if span > 0.0 {
            ((speed - self.slow_speed) / span).clamp(0.0, 1.0)
        } else if speed >= self.fast_speed {
            1.0
        } else {
            0.0
        };
        let ms = least + (most - least) * t;
        Duration::from_micros((ms.max(0.0) * 1000.0).round() as u64)
    }

    /// Check every field is usable
    pub fn validate(&self) -> Result<()> {
        fn invalid(name: &'static str, value: f64, reason: &'static str) -> EngineError {
            EngineError::InvalidSetting {
                name,
                value,
                reason,
            }
        }

        if !(self.speed_ratio.is_finite() && self.speed_ratio >= 0.0) {
            return Err(invalid("speed_ratio", self.speed_ratio as f64, "must be finite and >= 0"));
        }
        if self.max_colliders == 0 {
            return Err(invalid("max_colliders", 0.0, "must be at least 1"));
        }
        if self.most_frequent_interval_ms > self.least_frequent_interval_ms {
            return Err(invalid(
                "most_frequent_interval_ms",
                self.most_frequent_interval_ms as f64,
                "must not exceed least_frequent_interval_ms",
            ));
        }
        if !(self.slow_speed.is_finite() && self.fast_speed.is_finite())
            || self.fast_speed < self.slow_speed
        {
            return Err(invalid("fast_speed", self.fast_speed as f64, "must be finite and >= slow_speed"));
        }
        if !(self.step_precision.is_finite() && self.step_precision >= crate::sim::hit::MIN_PRECISION) {
            return Err(invalid("step_precision", self.step_precision as f64, "must be >= 0.01"));
        }
        if !(self.lookahead.is_finite() && self.lookahead >= 1.0) {
            return Err(invalid("lookahead", self.lookahead as f64, "must be >= 1.0"));
        }
        if !(self.impact_backoff.is_finite() && self.impact_backoff >= 0.0) {
            return Err(invalid("impact_backoff", self.impact_backoff as f64, "must be finite and >= 0"));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded engine settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Engine settings saved to {}", path.display());
        Ok(())
    }
}
