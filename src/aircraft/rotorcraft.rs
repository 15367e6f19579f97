use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{
    AeroConfig, Aerodynamics, AircraftFamily, AircraftModel, EngineKind, EngineRating,
    FlightCondition,
};
use crate::constants::AIR_DENSITY_SEA_LEVEL;

// Power required is `P_ref · CP` where the power coefficient is built from
// the advance ratio `μ = tas / ΩR` and thrust coefficient `CT`:
// `CP = c0 + c1·μ² + c2·CT·sqrt(sqrt(μ⁴ + CT²) − μ²) + c3·μ³ + c4·CT²·μ³`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotorModel {
    pub radius: f64,
    pub tip_speed: f64,
    pub power_coefficients: [f64; 5],
}

impl RotorModel {
    pub fn disk_area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    // `ρ·A·(ΩR)³`, the power scale at the given density.
    pub fn reference_power(&self, density: f64) -> f64 {
        density * self.disk_area() * self.tip_speed.powi(3)
    }

    pub fn advance_ratio(&self, tas: f64) -> f64 {
        tas / self.tip_speed
    }

    pub fn thrust_coefficient(&self, condition: &FlightCondition) -> f64 {
        condition.weight() * condition.load_factor
            / (condition.atmosphere.density * self.disk_area() * self.tip_speed.powi(2))
    }

    pub fn power_coefficient(&self, condition: &FlightCondition) -> f64 {
        let [c0, c1, c2, c3, c4] = self.power_coefficients;
        let mu = self.advance_ratio(condition.tas);
        let ct = self.thrust_coefficient(condition);
        let mu2 = mu * mu;
        let induced = ((mu2 * mu2 + ct * ct).sqrt() - mu2).max(0.0).sqrt();

        c0 + c1 * mu2 + c2 * ct * induced + c3 * mu2 * mu + c4 * ct * ct * mu2 * mu
    }

    pub fn power_required(&self, condition: &FlightCondition) -> f64 {
        self.reference_power(condition.atmosphere.density) * self.power_coefficient(condition)
    }

    pub(crate) fn aerodynamics(&self, condition: &FlightCondition) -> Aerodynamics {
        let power_required = self.power_required(condition);
        // Rotorcraft have no wing polar; report the rotor thrust and power
        // coefficients in their place.
        Aerodynamics {
            lift_coefficient: self.thrust_coefficient(condition),
            drag_coefficient: self.power_coefficient(condition),
            power_required,
        }
    }

    pub(crate) fn rotor_thrust(&self, condition: &FlightCondition) -> f64 {
        condition.weight() * condition.load_factor
    }
}

// Maximum shaft power per rating at sea level ISA (W).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRatings {
    pub takeoff: f64,
    pub max_continuous: f64,
    pub max_cruise: f64,
    pub idle_fraction: f64,
}

impl PowerRatings {
    pub fn get(&self, rating: EngineRating) -> f64 {
        match rating {
            EngineRating::Takeoff => self.takeoff,
            EngineRating::MaxClimb | EngineRating::MaxContinuous => self.max_continuous,
            EngineRating::MaxCruise => self.max_cruise,
            EngineRating::Idle => self.max_continuous * self.idle_fraction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConventionalRotorcraft {
    pub name: String,
    pub rotor: RotorModel,
    pub max_altitude: f64,
    pub power: PowerRatings,
    // Fuel flow coefficients in kg/h: `cf0 + cf1·δ + cf2·CP + cf3·δ·CP`.
    pub fuel: [f64; 4],
}

impl ConventionalRotorcraft {
    pub fn light_twin() -> Self {
        ConventionalRotorcraft {
            name: String::from("Light twin helicopter"),
            rotor: RotorModel {
                radius: 5.35,
                tip_speed: 220.0,
                power_coefficients: [1.0e-4, 1.5e-3, 0.8, 5.0e-3, 0.0],
            },
            max_altitude: 6_096.0,
            power: PowerRatings {
                takeoff: 750_000.0,
                max_continuous: 650_000.0,
                max_cruise: 600_000.0,
                idle_fraction: 0.1,
            },
            fuel: [40.0, 30.0, 4.0e5, 0.0],
        }
    }

    fn engine_power_coefficient(&self, engine_power: f64) -> f64 {
        engine_power / self.rotor.reference_power(AIR_DENSITY_SEA_LEVEL)
    }
}

impl AircraftModel for ConventionalRotorcraft {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> AircraftFamily {
        AircraftFamily::RotorcraftConventional
    }

    fn engine(&self) -> EngineKind {
        EngineKind::Turboshaft
    }

    fn select_config(&self, _condition: &FlightCondition) -> AeroConfig {
        AeroConfig::Clean
    }

    fn aerodynamics(&self, condition: &FlightCondition) -> Aerodynamics {
        self.rotor.aerodynamics(condition)
    }

    fn available_power(&self, condition: &FlightCondition, rating: EngineRating) -> f64 {
        let atm = &condition.atmosphere;
        let max = self.power.get(rating);
        (max * atm.delta / atm.theta.sqrt()).min(max)
    }

    fn fuel_flow(
        &self,
        condition: &FlightCondition,
        engine_power: f64,
        _rating: Option<EngineRating>,
    ) -> f64 {
        let [cf0, cf1, cf2, cf3] = self.fuel;
        let delta = condition.atmosphere.delta;
        let cp = self.engine_power_coefficient(engine_power.max(0.0));
        let per_hour = cf0 + cf1 * delta + cf2 * cp + cf3 * delta * cp;
        per_hour.max(0.0) / 3600.0
    }

    fn thrust(&self, condition: &FlightCondition, _engine_power: f64) -> f64 {
        self.rotor.rotor_thrust(condition)
    }
}
