use crate::config::RiskThresholds;
use crate::location::Coordinate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLabel {
    /// Step function over the vegetation index. Lower vegetation means drier
    /// ground and a higher label. Missing or non-finite input is `Unknown`.
    pub fn from_vegetation_index(index: Option<f64>, thresholds: &RiskThresholds) -> Self {
        match index {
            Some(value) if value.is_finite() => {
                if value < thresholds.high_below {
                    RiskLabel::High
                } else if value < thresholds.medium_below {
                    RiskLabel::Medium
                } else {
                    RiskLabel::Low
                }
            }
            _ => RiskLabel::Unknown,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
            RiskLabel::Unknown => "Unknown",
        };
        f.write_str(text)
    }
}

pub trait RiskOracle: Send + Sync {
    /// Blocks for the duration of the remote query. Never fails: problems are
    /// reported as `RiskLabel::Unknown`.
    fn assess(&self, coordinate: Coordinate) -> RiskLabel;
}
