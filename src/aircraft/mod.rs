pub mod electric;
pub mod fixed_wing;
pub mod high_fidelity;
pub mod rotorcraft;

use serde::{Deserialize, Serialize};

use crate::constants::{AIR_DENSITY_SEA_LEVEL, GRAVITY};
use crate::trajectory_system::atmosphere::AtmosphereState;
use crate::utils::conversions::{ft_to_m, kt_to_mps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AircraftFamily {
    FixedWingConventional,
    FixedWingHighFidelity,
    RotorcraftConventional,
    RotorcraftElectric,
}

impl AircraftFamily {
    pub fn is_rotorcraft(&self) -> bool {
        matches!(
            self,
            AircraftFamily::RotorcraftConventional | AircraftFamily::RotorcraftElectric
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineKind {
    Jet,
    Turboprop,
    Piston,
    Turboshaft,
    Electric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineRating {
    Takeoff,
    MaxClimb,
    MaxCruise,
    MaxContinuous,
    Idle,
}

impl EngineRating {
    pub fn label(&self) -> &'static str {
        match self {
            EngineRating::Takeoff => "MTKF",
            EngineRating::MaxClimb => "MCMB",
            EngineRating::MaxCruise => "MCRZ",
            EngineRating::MaxContinuous => "MCNT",
            EngineRating::Idle => "LIDL",
        }
    }
}

pub const ADAPTED_SETTING: &str = "ADAPTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AeroConfig {
    Clean,
    Approach,
    Landing,
}

impl AeroConfig {
    pub fn label(&self) -> &'static str {
        match self {
            AeroConfig::Clean => "CR",
            AeroConfig::Approach => "AP",
            AeroConfig::Landing => "LD",
        }
    }

    pub fn from_label(label: &str) -> Option<AeroConfig> {
        match label.trim().to_ascii_uppercase().as_str() {
            "CR" | "CLEAN" | "CRUISE" => Some(AeroConfig::Clean),
            "AP" | "APPROACH" => Some(AeroConfig::Approach),
            "LD" | "LANDING" => Some(AeroConfig::Landing),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum FlightPhase {
    Climb,
    Cruise,
    Descent,
}

#[derive(Debug, Clone, Copy)]
pub struct FlightCondition {
    pub atmosphere: AtmosphereState,
    pub tas: f64,
    pub cas: f64,
    pub mach: f64,
    pub mass: f64,
    pub load_factor: f64,
    pub bank_angle: f64,
    pub config: AeroConfig,
    pub phase: FlightPhase,
    pub speed_brake: Option<f64>,
    pub soc: Option<f64>,
}

impl FlightCondition {
    pub fn weight(&self) -> f64 {
        self.mass * GRAVITY
    }

    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.atmosphere.density * self.tas * self.tas
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aerodynamics {
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
    // Power needed to sustain steady level flight at this condition (W).
    pub power_required: f64,
}

pub trait AircraftModel {
    fn name(&self) -> &str;

    fn family(&self) -> AircraftFamily;

    fn engine(&self) -> EngineKind;

    fn supports_config(&self, config: AeroConfig) -> bool {
        config == AeroConfig::Clean
    }

    fn select_config(&self, _condition: &FlightCondition) -> AeroConfig {
        AeroConfig::Clean
    }

    fn aerodynamics(&self, condition: &FlightCondition) -> Aerodynamics;

    // Shaft or thrust power available at the rating (W).
    fn available_power(&self, condition: &FlightCondition, rating: EngineRating) -> f64;

    // Fuel flow (kg/s) for the delivered engine power. `rating` is `None` when
    // the power setting was adapted to a control law.
    fn fuel_flow(
        &self,
        condition: &FlightCondition,
        engine_power: f64,
        rating: Option<EngineRating>,
    ) -> f64;

    // Battery discharge rate in %/s, for electric aircraft only.
    fn battery_rate(&self, _condition: &FlightCondition, _engine_power: f64) -> Option<f64> {
        None
    }

    fn requires_battery(&self) -> bool {
        false
    }

    fn thrust(&self, condition: &FlightCondition, engine_power: f64) -> f64 {
        if condition.tas > f64::EPSILON {
            engine_power / condition.tas
        } else {
            0.0
        }
    }
}

pub(crate) fn lift_coefficient(condition: &FlightCondition, wing_area: f64) -> f64 {
    let q = condition.dynamic_pressure();
    if q <= f64::EPSILON {
        return 0.0;
    }
    condition.weight() * condition.load_factor / (q * wing_area)
}

pub(crate) fn stall_speed(mass: f64, wing_area: f64, cl_max: f64) -> f64 {
    (2.0 * mass * GRAVITY / (AIR_DENSITY_SEA_LEVEL * wing_area * cl_max)).sqrt()
}

// Descent configuration schedule for fixed-wing aircraft: flaps come out
// below the approach/landing altitude gates once the aircraft is slow
// enough for the next configuration.
pub(crate) fn fixed_wing_config(
    condition: &FlightCondition,
    vmin_clean: f64,
    vmin_approach: f64,
) -> AeroConfig {
    let approach_gate = ft_to_m(8_000.0);
    let landing_gate = ft_to_m(3_000.0);
    let margin = kt_to_mps(10.0);
    let h = condition.atmosphere.altitude;

    if condition.phase != FlightPhase::Descent {
        return AeroConfig::Clean;
    }
    if h < landing_gate && condition.cas < vmin_approach + margin {
        AeroConfig::Landing
    } else if h < approach_gate && condition.cas < vmin_clean + margin {
        AeroConfig::Approach
    } else {
        AeroConfig::Clean
    }
}
