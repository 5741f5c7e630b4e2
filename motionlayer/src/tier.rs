//! Quality tiers and the motion features they gate.
//!
//! A [`QualityTier`] is one of three discrete animation-richness levels.
//! The ordering `Low < Medium < High` is load-bearing: every transition in
//! the controller is expressed relative to it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Discrete animation-richness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Minimal motion: short durations, no decorative effects.
    Low,
    /// Moderate motion: the safe default when nothing is known.
    Medium,
    /// Full motion: every effect allowed.
    High,
}

impl QualityTier {
    /// All tiers in ascending order.
    pub const ALL: [QualityTier; 3] = [QualityTier::Low, QualityTier::Medium, QualityTier::High];

    /// Lowercase name used in logs, config and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(QualityTier::Low),
            "medium" => Ok(QualityTier::Medium),
            "high" => Ok(QualityTier::High),
            other => Err(format!("unknown quality tier '{}'", other)),
        }
    }
}

/// Why the stored tier last changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierReason {
    /// Set by the classifier from the device profile.
    Classified,
    /// Dropped to `Low` by a sub-threshold FPS window.
    FpsDowngrade,
    /// Raised from `Low` to `Medium` by a recovered FPS window.
    FpsRecovery,
    /// Dropped to `Low` by the heap-utilization safety valve.
    MemoryValve,
    /// Dropped to `Low` by a low, unplugged battery.
    BatteryLow,
    /// Re-classified after the battery recovered while charging.
    BatteryRecovered,
    /// Re-classified by an explicit reset.
    ManualReset,
}

impl TierReason {
    /// Short label for diagnostics output.
    pub fn label(&self) -> &'static str {
        match self {
            TierReason::Classified => "classified",
            TierReason::FpsDowngrade => "fps downgrade",
            TierReason::FpsRecovery => "fps recovery",
            TierReason::MemoryValve => "memory safety valve",
            TierReason::BatteryLow => "battery low",
            TierReason::BatteryRecovered => "battery recovered",
            TierReason::ManualReset => "manual reset",
        }
    }
}

impl fmt::Display for TierReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Motion features that call-sites ask permission for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Scroll-linked parallax layers.
    Parallax,
    /// Particle systems and cursor trails.
    Particles,
    /// Backdrop and filter blur.
    Blur,
    /// Multi-stage timelines, 3-D tilts and similar heavy effects.
    ComplexAnimations,
}

impl Feature {
    /// All features, in declaration order.
    pub const ALL: [Feature; 4] = [
        Feature::Parallax,
        Feature::Particles,
        Feature::Blur,
        Feature::ComplexAnimations,
    ];

    /// The camelCase name call-sites use.
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Parallax => "parallax",
            Feature::Particles => "particles",
            Feature::Blur => "blur",
            Feature::ComplexAnimations => "complexAnimations",
        }
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parallax" => Ok(Feature::Parallax),
            "particles" => Ok(Feature::Particles),
            "blur" => Ok(Feature::Blur),
            "complexAnimations" => Ok(Feature::ComplexAnimations),
            other => Err(format!("unknown motion feature '{}'", other)),
        }
    }
}
