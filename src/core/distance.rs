// distance.rs - Jukes-Cantor distance transform

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::stats::ComparisonStat;

/// Raw mismatch fraction at which the Jukes-Cantor logarithm is undefined
pub const SATURATION_LIMIT: f64 = 0.75;

/// Conventional "undefined distance" marker understood by phylogeny packages
pub const DEFAULT_SATURATED_DISTANCE: f64 = -1.0;

/// What to report when `raw >= 0.75`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SaturationPolicy {
    /// Report this fixed value instead
    Sentinel(f64),
    /// Treat as an error
    Fail,
}

impl Default for SaturationPolicy {
    fn default() -> Self {
        SaturationPolicy::Sentinel(DEFAULT_SATURATED_DISTANCE)
    }
}

impl SaturationPolicy {
    /// Parse the policy name; `value` only applies to `sentinel`
    pub fn from_name(name: &str, value: Option<f64>) -> Result<Self, String> {
        match name.to_lowercase().as_str() {
            "sentinel" => {
                let v = value.unwrap_or(DEFAULT_SATURATED_DISTANCE);
                if !v.is_finite() {
                    return Err(format!("Saturated distance must be finite, got {}", v));
                }
                Ok(SaturationPolicy::Sentinel(v))
            }
            "fail" | "error" => Ok(SaturationPolicy::Fail),
            _ => Err(format!(
                "Invalid saturation policy: {}. Use: sentinel, fail",
                name
            )),
        }
    }
}

impl FromStr for SaturationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s, None)
    }
}

/// Outcome of the transform for one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    /// A finite, non-negative corrected distance
    Value(f64),
    /// `raw >= 0.75`; the caller applies its saturation policy
    Saturated { raw: f64 },
}

impl Distance {
    /// Resolve to a number, or `None` when saturated under `Fail`
    pub fn resolve(self, policy: SaturationPolicy) -> Option<f64> {
        match (self, policy) {
            (Distance::Value(v), _) => Some(v),
            (Distance::Saturated { .. }, SaturationPolicy::Sentinel(v)) => Some(v),
            (Distance::Saturated { .. }, SaturationPolicy::Fail) => None,
        }
    }
}

/// Jukes-Cantor correction of a raw mismatch fraction.
///
/// Negative results caused by rounding near zero are clamped to 0.
pub fn jukes_cantor(raw: f64) -> Distance {
    if raw >= SATURATION_LIMIT {
        return Distance::Saturated { raw };
    }
    let dist = -0.75 * (1.0 - (4.0 / 3.0) * raw).ln();
    if dist > 0.0 {
        Distance::Value(dist)
    } else {
        Distance::Value(0.0)
    }
}

/// Distance for an accumulated statistic; no overlap means distance 0
pub fn corrected_distance(stat: &ComparisonStat) -> Distance {
    match stat.raw() {
        Some(raw) => jukes_cantor(raw),
        None => Distance::Value(0.0),
    }
}
