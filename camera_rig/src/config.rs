// config.rs - Tunable camera choreography parameters

use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::animation::Easing;
use crate::error_handling::{read_to_string, Result, RigError};
use crate::geometry::MAX_DEDUP_PRECISION;
use crate::policy::ForbiddenArc;

/// Seconds spent rotating out of the forbidden arc.
pub const ROTATION_DURATION: f32 = 0.8;
/// Seconds spent zooming in or out.
pub const ZOOM_DURATION: f32 = 1.2;

/// Camera rig configuration. Every field has a default, so a JSON file only
/// needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RigConfig {
    pub rotation_duration_secs: f32,
    pub zoom_duration_secs: f32,
    pub forbidden_arc_start_deg: f32,
    pub forbidden_arc_end_deg: f32,
    /// Fraction of the screen height the zoom target is lowered by.
    pub vertical_offset_ratio: f32,
    pub autorotate: bool,
    /// Revolutions per minute, in orbit-control units (2 means one turn per 30s).
    pub autorotate_speed: f32,
    pub easing: Easing,
    /// Decimal places used when merging coincident screen vertices.
    pub dedup_precision: u32,
}

impl Default for RigConfig {
    fn default() -> Self {
        let arc = ForbiddenArc::default();
        Self {
            rotation_duration_secs: ROTATION_DURATION,
            zoom_duration_secs: ZOOM_DURATION,
            forbidden_arc_start_deg: arc.start_deg,
            forbidden_arc_end_deg: arc.end_deg,
            vertical_offset_ratio: 0.04,
            autorotate: true,
            autorotate_speed: 0.5,
            easing: Easing::SineInOut,
            dedup_precision: 6,
        }
    }
}

impl RigConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RigConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded rig config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(RigError::InvalidConfig { reason });

        for (name, value) in [
            ("rotation_duration_secs", self.rotation_duration_secs),
            ("zoom_duration_secs", self.zoom_duration_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{name} must be a positive number of seconds, got {value}"));
            }
        }

        let (start, end) = (self.forbidden_arc_start_deg, self.forbidden_arc_end_deg);
        if !(start.is_finite() && end.is_finite() && 0.0 <= start && start < end && end <= 360.0) {
            return invalid(format!("forbidden arc [{start}, {end}] must satisfy 0 <= start < end <= 360"));
        }

        if !(self.vertical_offset_ratio.is_finite() && (0.0..1.0).contains(&self.vertical_offset_ratio)) {
            return invalid(format!(
                "vertical_offset_ratio must lie in [0, 1), got {}",
                self.vertical_offset_ratio
            ));
        }

        if !self.autorotate_speed.is_finite() {
            return invalid("autorotate_speed must be finite".to_string());
        }

        if self.dedup_precision > MAX_DEDUP_PRECISION {
            return invalid(format!(
                "dedup_precision {} exceeds {MAX_DEDUP_PRECISION} decimal places",
                self.dedup_precision
            ));
        }

        Ok(())
    }

    pub fn forbidden_arc(&self) -> ForbiddenArc {
        ForbiddenArc {
            start_deg: self.forbidden_arc_start_deg,
            end_deg: self.forbidden_arc_end_deg,
        }
    }

    /// Autorotation rate in radians per second.
    pub fn autorotate_rate(&self) -> f32 {
        std::f32::consts::TAU / 60.0 * self.autorotate_speed
    }
}
