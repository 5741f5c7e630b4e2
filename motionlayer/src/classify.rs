//! Initial quality tier from a device profile.
//!
//! The classifier is a deliberately coarse additive point score so that its
//! behaviour can be read off a table and tested by construction.
//!
//! # Scoring Rules
//!
//! | Signal                | Points                      |
//! |-----------------------|-----------------------------|
//! | Memory                | >= 8 GiB: 3, >= 4 GiB: 2, else 1 |
//! | Logical cores         | >= 8: 3, >= 4: 2, else 1    |
//! | Network               | 4g: 2, 3g: 1, else 0        |
//! | Handheld              | -2                          |
//! | Pixel ratio above 2   | -1                          |
//!
//! | Score | Tier   |
//! |-------|--------|
//! | >= 7  | High   |
//! | >= 4  | Medium |
//! | < 4   | Low    |

use std::fmt;

use serde::Serialize;

use crate::profile::{DeviceProfile, NetworkClass};
use crate::tier::QualityTier;

/// Minimum score for [`QualityTier::High`].
pub const HIGH_TIER_MIN_SCORE: i32 = 7;

/// Minimum score for [`QualityTier::Medium`].
pub const MEDIUM_TIER_MIN_SCORE: i32 = 4;

/// Per-signal contributions to the classification score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub memory: i32,
    pub cores: i32,
    pub network: i32,
    pub handheld: i32,
    pub pixel_density: i32,
}

impl ScoreBreakdown {
    /// Sum of all contributions.
    pub fn total(&self) -> i32 {
        self.memory + self.cores + self.network + self.handheld + self.pixel_density
    }

    /// Tier for this score.
    pub fn tier(&self) -> QualityTier {
        tier_for_score(self.total())
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "memory {:+}, cores {:+}, network {:+}, handheld {:+}, density {:+} = {}",
            self.memory,
            self.cores,
            self.network,
            self.handheld,
            self.pixel_density,
            self.total()
        )
    }
}

/// Score a profile, keeping each contribution visible.
pub fn score(profile: &DeviceProfile) -> ScoreBreakdown {
    ScoreBreakdown {
        memory: memory_points(profile.memory_gib),
        cores: core_points(profile.logical_cores),
        network: network_points(profile.network),
        handheld: if profile.is_handheld { -2 } else { 0 },
        pixel_density: if profile.pixel_ratio > 2.0 { -1 } else { 0 },
    }
}

/// Classify a profile into its initial tier.
///
/// # Example
///
/// ```
/// use motionlayer::classify::classify;
/// use motionlayer::profile::{DeviceProfile, NetworkClass};
/// use motionlayer::QualityTier;
///
/// let profile = DeviceProfile {
///     memory_gib: 8.0,
///     logical_cores: 8,
///     network: NetworkClass::Cellular4g,
///     ..DeviceProfile::default()
/// };
/// assert_eq!(classify(&profile), QualityTier::High);
/// ```
pub fn classify(profile: &DeviceProfile) -> QualityTier {
    score(profile).tier()
}

/// Map a total score onto a tier.
pub fn tier_for_score(score: i32) -> QualityTier {
    match score {
        s if s >= HIGH_TIER_MIN_SCORE => QualityTier::High,
        s if s >= MEDIUM_TIER_MIN_SCORE => QualityTier::Medium,
        _ => QualityTier::Low,
    }
}

fn memory_points(gib: f64) -> i32 {
    match gib {
        m if m >= 8.0 => 3,
        m if m >= 4.0 => 2,
        _ => 1,
    }
}

fn core_points(cores: usize) -> i32 {
    match cores {
        c if c >= 8 => 3,
        c if c >= 4 => 2,
        _ => 1,
    }
}

fn network_points(network: NetworkClass) -> i32 {
    match network {
        NetworkClass::Cellular4g => 2,
        NetworkClass::Cellular3g => 1,
        NetworkClass::Cellular2g | NetworkClass::Unknown => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn profile(memory: f64, cores: usize, network: NetworkClass) -> DeviceProfile {
        DeviceProfile {
            memory_gib: memory,
            logical_cores: cores,
            network,
            ..DeviceProfile::default()
        }
    }

    #[test]
    fn test_flagship_desktop_is_high() {
        let p = profile(8.0, 8, NetworkClass::Cellular4g);
        let s = score(&p);
        assert_eq!(s.total(), 8);
        assert_eq!(classify(&p), QualityTier::High);
    }

    #[test]
    fn test_budget_handheld_is_low() {
        let p = DeviceProfile {
            memory_gib: 2.0,
            logical_cores: 2,
            network: NetworkClass::Unknown,
            pixel_ratio: 3.0,
            is_handheld: true,
            battery: None,
        };
        let s = score(&p);
        assert_eq!(s.memory, 1);
        assert_eq!(s.cores, 1);
        assert_eq!(s.network, 0);
        assert_eq!(s.handheld, -2);
        assert_eq!(s.pixel_density, -1);
        assert_eq!(s.total(), -1);
        assert_eq!(classify(&p), QualityTier::Low);
    }

    #[test]
    fn test_unknown_device_is_medium() {
        let s = score(&DeviceProfile::default());
        assert_eq!(s.total(), 4);
        assert_eq!(s.tier(), QualityTier::Medium);
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(tier_for_score(7), QualityTier::High);
        assert_eq!(tier_for_score(6), QualityTier::Medium);
        assert_eq!(tier_for_score(4), QualityTier::Medium);
        assert_eq!(tier_for_score(3), QualityTier::Low);
        assert_eq!(tier_for_score(-3), QualityTier::Low);
    }

    #[test]
    fn test_memory_band_edges() {
        assert_eq!(memory_points(3.99), 1);
        assert_eq!(memory_points(4.0), 2);
        assert_eq!(memory_points(7.99), 2);
        assert_eq!(memory_points(8.0), 3);
    }

    #[test]
    fn test_pixel_ratio_penalty_is_strictly_above_two() {
        let mut p = DeviceProfile::default();
        p.pixel_ratio = 2.0;
        assert_eq!(score(&p).pixel_density, 0);
        p.pixel_ratio = 2.5;
        assert_eq!(score(&p).pixel_density, -1);
    }

    #[test]
    fn test_breakdown_display() {
        let s = score(&profile(8.0, 8, NetworkClass::Cellular4g));
        assert_eq!(
            s.to_string(),
            "memory +3, cores +3, network +2, handheld +0, density +0 = 8"
        );
    }

    fn network_strategy() -> impl Strategy<Value = NetworkClass> {
        prop_oneof![
            Just(NetworkClass::Unknown),
            Just(NetworkClass::Cellular2g),
            Just(NetworkClass::Cellular3g),
            Just(NetworkClass::Cellular4g),
        ]
    }

    fn profile_strategy() -> impl Strategy<Value = DeviceProfile> {
        (
            0.25f64..64.0f64,
            1usize..64usize,
            network_strategy(),
            0.5f64..4.0f64,
            any::<bool>(),
        )
            .prop_map(|(memory_gib, logical_cores, network, pixel_ratio, is_handheld)| {
                DeviceProfile {
                    memory_gib,
                    logical_cores,
                    network,
                    pixel_ratio,
                    is_handheld,
                    battery: None,
                }
            })
    }

    fn network_rank(network: NetworkClass) -> u8 {
        match network {
            NetworkClass::Unknown => 0,
            NetworkClass::Cellular2g => 1,
            NetworkClass::Cellular3g => 2,
            NetworkClass::Cellular4g => 3,
        }
    }

    proptest! {
        /// Property: classification is deterministic.
        #[test]
        fn prop_classify_is_deterministic(p in profile_strategy()) {
            prop_assert_eq!(classify(&p), classify(&p.clone()));
        }

        /// Property: more memory never lowers the tier.
        #[test]
        fn prop_more_memory_never_lowers_tier(p in profile_strategy(), extra in 0.0f64..64.0f64) {
            let richer = DeviceProfile { memory_gib: p.memory_gib + extra, ..p.clone() };
            prop_assert!(classify(&richer) >= classify(&p));
        }

        /// Property: more cores never lowers the tier.
        #[test]
        fn prop_more_cores_never_lowers_tier(p in profile_strategy(), extra in 0usize..64usize) {
            let richer = DeviceProfile { logical_cores: p.logical_cores + extra, ..p.clone() };
            prop_assert!(classify(&richer) >= classify(&p));
        }

        /// Property: a better network never lowers the tier.
        #[test]
        fn prop_better_network_never_lowers_tier(p in profile_strategy(), n in network_strategy()) {
            let other = DeviceProfile { network: n, ..p.clone() };
            if network_rank(n) >= network_rank(p.network) {
                prop_assert!(classify(&other) >= classify(&p));
            } else {
                prop_assert!(classify(&other) <= classify(&p));
            }
        }
    }
}
