//! Fade-out curves for soundboard buttons
//!
//! A button with fade-out enabled ramps its output level from full volume
//! to silence over the last `fade_out_duration` seconds of the track.
//! Linear is the default; the other shapes are selectable through the
//! `fade_curve` runtime setting.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

/// Fade-out curve types
///
/// All curves map normalized fade progress 0.0 → 1.0 onto an output level
/// 1.0 → 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// Linear: v(t) = 1 - t
    #[default]
    Linear,

    /// Logarithmic: v(t) = (1-t)², fast start, slow finish
    Logarithmic,

    /// S-Curve: v(t) = 0.5 × (1 + cos(π × t))
    SCurve,

    /// Equal-Power: v(t) = cos(t × π/2)
    EqualPower,
}

impl FadeCurve {
    /// Output level at normalized position through the fade
    ///
    /// # Arguments
    /// * `position` - Normalized position through fade (0.0 to 1.0)
    ///
    /// # Returns
    /// Level multiplier (1.0 = full volume, 0.0 = silence)
    pub fn calculate_fade_out(&self, position: f32) -> f32 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => 1.0 - t,
            FadeCurve::Logarithmic => {
                let inv = 1.0 - t;
                inv * inv
            }
            FadeCurve::SCurve => 0.5 * (1.0 + (std::f32::consts::PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).cos(),
        }
    }

    /// Parse curve from a settings value
    ///
    /// Accepts 'linear', 'logarithmic', 'cosine'/'s_curve'/'scurve'/'s-curve',
    /// and 'equal_power'/'equalpower' (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(FadeCurve::Linear),
            "logarithmic" => Some(FadeCurve::Logarithmic),
            "cosine" | "scurve" | "s-curve" | "s_curve" => Some(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Some(FadeCurve::EqualPower),
            _ => None,
        }
    }

    /// Canonical settings string
    pub fn to_db_string(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Logarithmic => "logarithmic",
            FadeCurve::SCurve => "cosine",
            FadeCurve::EqualPower => "equal_power",
        }
    }

    /// Get all available fade curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Logarithmic,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::Logarithmic => "Logarithmic",
            FadeCurve::SCurve => "S-Curve",
            FadeCurve::EqualPower => "Equal Power",
        };
        write!(f, "{}", name)
    }
}

/// Step schedule for a fade-out ramp
///
/// The engine applies one level per step and re-checks its play token
/// between steps, so a ramp can be abandoned at any step boundary.
#[derive(Debug, Clone, Copy)]
pub struct FadeRamp {
    curve: FadeCurve,
    duration: Duration,
    step: Duration,
}

impl FadeRamp {
    /// Create a ramp; a zero step is bumped to 1ms
    pub fn new(curve: FadeCurve, duration: Duration, step: Duration) -> Self {
        Self {
            curve,
            duration,
            step: step.max(Duration::from_millis(1)),
        }
    }

    /// Total ramp length
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Interval between level updates
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Number of level updates including the final silent one
    pub fn step_count(&self) -> u32 {
        if self.duration.is_zero() {
            return 1;
        }
        let steps = self.duration.as_secs_f64() / self.step.as_secs_f64();
        (steps.ceil() as u32).max(1)
    }

    /// Output level after `index` steps (index == step_count → 0.0)
    pub fn level_at_step(&self, index: u32) -> f32 {
        let total = self.step_count();
        if index >= total {
            return 0.0;
        }
        self.curve
            .calculate_fade_out(index as f32 / total as f32)
    }
}
