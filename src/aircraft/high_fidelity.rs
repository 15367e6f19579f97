use serde::{Deserialize, Serialize};

use super::{
    fixed_wing_config, lift_coefficient, stall_speed, AeroConfig, Aerodynamics, AircraftFamily,
    AircraftModel, EngineKind, EngineRating, FlightCondition,
};
use crate::constants::{FUEL_LOWER_HEATING_VALUE, GRAVITY, SPEED_OF_SOUND_SEA_LEVEL};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighFidelityAirplane {
    pub name: String,
    pub wing_area: f64,
    pub reference_mass: f64,
    pub max_altitude: f64,
    // Drag polynomial coefficients: CD = d0 + d2·CL² + d4·CL⁴.
    pub drag: [f64; 3],
    pub drag_divergence_mach: f64,
    pub wave_drag_factor: f64,
    pub approach_cd0: f64,
    pub landing_cd0: f64,
    pub cl_max_clean: f64,
    pub cl_max_approach: f64,
    // Thrust coefficient polynomial in Mach at the max-climb rating.
    pub thrust: [f64; 3],
    pub takeoff_factor: f64,
    pub cruise_factor: f64,
    pub idle_thrust_coefficient: f64,
    // Fuel coefficient polynomial in thrust coefficient.
    pub fuel: [f64; 3],
    pub min_fuel_coefficient: f64,
}

impl HighFidelityAirplane {
    pub fn medium_twin_jet() -> Self {
        HighFidelityAirplane {
            name: String::from("Medium twin jet (high fidelity)"),
            wing_area: 122.6,
            reference_mass: 64_000.0,
            max_altitude: 12_131.0,
            drag: [0.025, 0.035, 0.002],
            drag_divergence_mach: 0.75,
            wave_drag_factor: 2.0,
            approach_cd0: 0.015,
            landing_cd0: 0.06,
            cl_max_clean: 1.5,
            cl_max_approach: 2.0,
            thrust: [0.45, -0.1, 0.0],
            takeoff_factor: 1.1,
            cruise_factor: 0.92,
            idle_thrust_coefficient: 0.03,
            fuel: [0.02, 1.9, 0.3],
            min_fuel_coefficient: 0.05,
        }
    }

    fn reference_weight(&self) -> f64 {
        self.reference_mass * GRAVITY
    }

    fn thrust_coefficient(&self, mach: f64, rating: EngineRating) -> f64 {
        let [c0, c1, c2] = self.thrust;
        let max_climb = (c0 + c1 * mach + c2 * mach * mach).max(0.0);
        match rating {
            EngineRating::Takeoff => max_climb * self.takeoff_factor,
            EngineRating::MaxClimb | EngineRating::MaxContinuous => max_climb,
            EngineRating::MaxCruise => max_climb * self.cruise_factor,
            EngineRating::Idle => self.idle_thrust_coefficient,
        }
    }

    fn wave_drag(&self, mach: f64) -> f64 {
        let excess = mach - self.drag_divergence_mach;
        if excess > 0.0 {
            self.wave_drag_factor * excess * excess
        } else {
            0.0
        }
    }
}

impl AircraftModel for HighFidelityAirplane {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> AircraftFamily {
        AircraftFamily::FixedWingHighFidelity
    }

    fn engine(&self) -> EngineKind {
        EngineKind::Jet
    }

    fn supports_config(&self, _config: AeroConfig) -> bool {
        true
    }

    fn select_config(&self, condition: &FlightCondition) -> AeroConfig {
        let vmin_clean = 1.3 * stall_speed(condition.mass, self.wing_area, self.cl_max_clean);
        let vmin_approach = 1.3 * stall_speed(condition.mass, self.wing_area, self.cl_max_approach);
        fixed_wing_config(condition, vmin_clean, vmin_approach)
    }

    fn aerodynamics(&self, condition: &FlightCondition) -> Aerodynamics {
        let [d0, d2, d4] = self.drag;
        let cl = lift_coefficient(condition, self.wing_area);
        let cl2 = cl * cl;

        let mut cd = d0 + d2 * cl2 + d4 * cl2 * cl2 + self.wave_drag(condition.mach);
        cd += match condition.config {
            AeroConfig::Clean => 0.0,
            AeroConfig::Approach => self.approach_cd0,
            AeroConfig::Landing => self.landing_cd0,
        };
        if let Some(increment) = condition.speed_brake {
            cd += increment;
        }

        let drag = condition.dynamic_pressure() * self.wing_area * cd;
        Aerodynamics {
            lift_coefficient: cl,
            drag_coefficient: cd,
            power_required: drag * condition.tas,
        }
    }

    fn available_power(&self, condition: &FlightCondition, rating: EngineRating) -> f64 {
        let ct = self.thrust_coefficient(condition.mach, rating);
        condition.atmosphere.delta * self.reference_weight() * ct * condition.tas
    }

    fn fuel_flow(
        &self,
        condition: &FlightCondition,
        engine_power: f64,
        _rating: Option<EngineRating>,
    ) -> f64 {
        let atm = &condition.atmosphere;
        let normaliser = atm.delta * self.reference_weight();
        let ct = self.thrust(condition, engine_power).max(0.0) / normaliser;

        let [f0, f1, f2] = self.fuel;
        let cf = (f0 + f1 * ct + f2 * ct * ct).max(self.min_fuel_coefficient);

        normaliser * atm.theta.sqrt() * SPEED_OF_SOUND_SEA_LEVEL / FUEL_LOWER_HEATING_VALUE * cf
    }
}
