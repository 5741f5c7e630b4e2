//! Translation of the tier into animation parameters.
//!
//! A [`MotionQuery`] is a consistent view over one [`TierSnapshot`]; every
//! answer it gives is derived from that snapshot, the device profile and the
//! motion settings. Nothing here can fail: unknown feature names are refused
//! and nonsense base values scale to zero.
//!
//! # Feature gates
//!
//! | Feature             | Requires                                         |
//! |---------------------|--------------------------------------------------|
//! | `particles`         | effective `High`, not handheld, no reduced motion |
//! | `parallax`          | effective `Medium` or better, not handheld       |
//! | `blur`              | effective `High`                                 |
//! | `complexAnimations` | effective `Medium` or better                     |

use crate::config::MotionSettings;
use crate::profile::DeviceProfile;
use crate::state::TierSnapshot;
use crate::tier::{Feature, QualityTier};

/// Read-only answers for animation call-sites.
#[derive(Debug, Clone, Copy)]
pub struct MotionQuery<'a> {
    snapshot: TierSnapshot,
    profile: &'a DeviceProfile,
    motion: &'a MotionSettings,
}

impl<'a> MotionQuery<'a> {
    pub fn new(
        snapshot: TierSnapshot,
        profile: &'a DeviceProfile,
        motion: &'a MotionSettings,
    ) -> Self {
        Self {
            snapshot,
            profile,
            motion,
        }
    }

    pub fn effective_tier(&self) -> QualityTier {
        self.snapshot.effective_tier()
    }

    /// Scale a base duration in seconds.
    ///
    /// The tier factor is applied first and the reduced-motion factor
    /// compounds on top of it.
    pub fn scaled_duration(&self, base_secs: f64) -> f64 {
        if !base_secs.is_finite() || base_secs <= 0.0 {
            return 0.0;
        }
        let scaled = base_secs * self.motion.factor(self.snapshot.performance_tier());
        if self.snapshot.reduced_motion {
            scaled * self.motion.reduced_motion_factor
        } else {
            scaled
        }
    }

    /// Scale a base stagger in seconds; always zero under reduced motion.
    pub fn scaled_stagger(&self, base_secs: f64) -> f64 {
        if self.snapshot.reduced_motion || !base_secs.is_finite() || base_secs <= 0.0 {
            return 0.0;
        }
        base_secs * self.motion.factor(self.snapshot.performance_tier())
    }

    pub fn allow(&self, feature: Feature) -> bool {
        let tier = self.effective_tier();
        let handheld = self.profile.is_handheld;
        match feature {
            Feature::Particles => {
                tier == QualityTier::High && !handheld && !self.snapshot.reduced_motion
            }
            Feature::Parallax => tier >= QualityTier::Medium && !handheld,
            Feature::Blur => tier == QualityTier::High,
            Feature::ComplexAnimations => tier >= QualityTier::Medium,
        }
    }

    /// Like [`allow`](Self::allow) for a camelCase feature name. Unknown
    /// names are refused.
    pub fn allow_named(&self, name: &str) -> bool {
        name.parse::<Feature>()
            .map(|feature| self.allow(feature))
            .unwrap_or(false)
    }

    /// Opaque easing identifier for the animation engine.
    pub fn easing_curve(&self) -> &'a str {
        self.motion.easing(self.effective_tier())
    }

    /// Multiplier for the global animation time base.
    ///
    /// Near zero under reduced motion, so animations are effectively off
    /// without call-sites branching.
    pub fn time_scale(&self) -> f64 {
        if self.snapshot.reduced_motion {
            self.motion.reduced_motion_time_scale
        } else {
            1.0
        }
    }
}
