use serde::{Deserialize, Serialize};

use crate::aircraft::{EngineRating, FlightPhase};
use crate::trajectory_system::atmosphere::Speed;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelExtent {
    // Ground distance to fly (m).
    Distance(f64),
    // Duration (s).
    Time(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VerticalExtent {
    // Final pressure altitude (m).
    Altitude(f64),
    // Duration (s).
    Time(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AccelerationExtent {
    Speed,
    Time(f64),
}

// Control inputs for a speed change. When several vertical targets are
// given, slope wins over ROCD.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationTarget {
    pub rocd: Option<f64>,
    // deg
    pub slope: Option<f64>,
    pub acceleration: Option<f64>,
    pub esf: Option<f64>,
    pub rating: Option<EngineRating>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentTarget {
    Level {
        speed: Speed,
        extent: LevelExtent,
    },
    Rocd {
        speed: Speed,
        rocd: f64,
        extent: VerticalExtent,
    },
    Slope {
        speed: Speed,
        slope: f64,
        extent: VerticalExtent,
    },
    Rating {
        speed: Speed,
        rating: EngineRating,
        extent: VerticalExtent,
    },
    Acceleration {
        initial_speed: Speed,
        final_speed: Speed,
        target: AccelerationTarget,
        phase: FlightPhase,
        extent: AccelerationExtent,
    },
}
