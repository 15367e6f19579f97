use serde::{Deserialize, Serialize};

use super::{
    fixed_wing_config, lift_coefficient, stall_speed, AeroConfig, Aerodynamics, AircraftFamily,
    AircraftModel, EngineKind, EngineRating, FlightCondition, FlightPhase,
};
use crate::utils::conversions::{m_to_ft, mps_to_kt};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragPolar {
    pub cd0: f64,
    pub cd2: f64,
    pub cl_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPolars {
    pub clean: DragPolar,
    pub approach: DragPolar,
    pub landing: DragPolar,
    // Parasitic drag added with the landing gear extended.
    pub gear_cd0: f64,
}

impl DragPolars {
    pub fn get(&self, config: AeroConfig) -> &DragPolar {
        match config {
            AeroConfig::Clean => &self.clean,
            AeroConfig::Approach => &self.approach,
            AeroConfig::Landing => &self.landing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrustCoefficients {
    pub ct1: f64,
    pub ct2: f64,
    pub ct3: f64,
    // Temperature deviation above which thrust starts to lapse (K).
    pub temp_reference: f64,
    pub temp_slope: f64,
    pub idle_high: f64,
    pub idle_low: f64,
    pub idle_approach: f64,
    pub idle_landing: f64,
    // Pressure altitude separating the high and low idle settings (m).
    pub idle_transition_altitude: f64,
    pub cruise_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelCoefficients {
    pub cf1: f64,
    pub cf2: f64,
    pub idle1: f64,
    pub idle2: f64,
    pub cruise_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConventionalAirplane {
    pub name: String,
    pub engine: EngineKind,
    pub wing_area: f64,
    pub max_altitude: f64,
    pub drag: DragPolars,
    pub thrust: ThrustCoefficients,
    pub fuel: FuelCoefficients,
}

impl ConventionalAirplane {
    pub fn medium_twin_jet() -> Self {
        ConventionalAirplane {
            name: String::from("Medium twin jet"),
            engine: EngineKind::Jet,
            wing_area: 122.6,
            max_altitude: 12_131.0,
            drag: DragPolars {
                clean: DragPolar {
                    cd0: 0.024,
                    cd2: 0.0375,
                    cl_max: 1.5,
                },
                approach: DragPolar {
                    cd0: 0.035,
                    cd2: 0.037,
                    cl_max: 2.0,
                },
                landing: DragPolar {
                    cd0: 0.08,
                    cd2: 0.035,
                    cl_max: 2.6,
                },
                gear_cd0: 0.02,
            },
            thrust: ThrustCoefficients {
                ct1: 136_500.0,
                ct2: 52_238.0,
                ct3: 1.0457e-10,
                temp_reference: 10.0,
                temp_slope: 0.008,
                idle_high: 0.0505,
                idle_low: 0.0404,
                idle_approach: 0.071,
                idle_landing: 0.12,
                idle_transition_altitude: 3_048.0,
                cruise_factor: 0.95,
            },
            fuel: FuelCoefficients {
                cf1: 0.94,
                cf2: 100_000.0,
                idle1: 12.256,
                idle2: 50_000.0,
                cruise_factor: 0.95,
            },
        }
    }

    // Maximum climb thrust in ISA, corrected for temperature deviation (N).
    pub fn max_climb_thrust(&self, condition: &FlightCondition) -> f64 {
        let ct = &self.thrust;
        let h_ft = m_to_ft(condition.atmosphere.altitude);
        let v_kt = mps_to_kt(condition.tas).max(1.0);

        let isa_thrust = match self.engine {
            EngineKind::Turboprop => ct.ct1 / v_kt * (1.0 - h_ft / ct.ct2) + ct.ct3,
            EngineKind::Piston => ct.ct1 * (1.0 - h_ft / ct.ct2) + ct.ct3 / v_kt,
            _ => ct.ct1 * (1.0 - h_ft / ct.ct2 + ct.ct3 * h_ft * h_ft),
        };

        let lapse = (ct.temp_slope * (condition.atmosphere.delta_temp - ct.temp_reference))
            .clamp(0.0, 0.4);
        (isa_thrust * (1.0 - lapse)).max(0.0)
    }

    fn idle_fraction(&self, condition: &FlightCondition) -> f64 {
        let ct = &self.thrust;
        if condition.atmosphere.altitude > ct.idle_transition_altitude {
            return ct.idle_high;
        }
        match condition.config {
            AeroConfig::Clean => ct.idle_low,
            AeroConfig::Approach => ct.idle_approach,
            AeroConfig::Landing => ct.idle_landing,
        }
    }

    fn nominal_fuel_flow(&self, condition: &FlightCondition, thrust: f64) -> f64 {
        let cf = &self.fuel;
        let v_kt = mps_to_kt(condition.tas);
        // Coefficients are per minute and per kN.
        match self.engine {
            EngineKind::Piston => cf.cf1 / 60.0,
            EngineKind::Turboprop => {
                let eta = cf.cf1 * (1.0 - v_kt / cf.cf2) * (v_kt / 1000.0);
                eta * thrust / 60_000.0
            }
            _ => {
                let eta = cf.cf1 * (1.0 + v_kt / cf.cf2);
                eta * thrust / 60_000.0
            }
        }
    }

    fn minimum_fuel_flow(&self, condition: &FlightCondition) -> f64 {
        let cf = &self.fuel;
        match self.engine {
            EngineKind::Piston => cf.idle1 / 60.0,
            _ => {
                let h_ft = m_to_ft(condition.atmosphere.altitude);
                (cf.idle1 * (1.0 - h_ft / cf.idle2) / 60.0).max(0.0)
            }
        }
    }
}

impl AircraftModel for ConventionalAirplane {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> AircraftFamily {
        AircraftFamily::FixedWingConventional
    }

    fn engine(&self) -> EngineKind {
        self.engine
    }

    fn supports_config(&self, _config: AeroConfig) -> bool {
        true
    }

    fn select_config(&self, condition: &FlightCondition) -> AeroConfig {
        let vmin_clean = 1.3 * stall_speed(condition.mass, self.wing_area, self.drag.clean.cl_max);
        let vmin_approach =
            1.3 * stall_speed(condition.mass, self.wing_area, self.drag.approach.cl_max);
        fixed_wing_config(condition, vmin_clean, vmin_approach)
    }

    fn aerodynamics(&self, condition: &FlightCondition) -> Aerodynamics {
        let polar = self.drag.get(condition.config);
        let cl = lift_coefficient(condition, self.wing_area);

        let mut cd = polar.cd0 + polar.cd2 * cl * cl;
        if condition.config == AeroConfig::Landing {
            cd += self.drag.gear_cd0;
        }
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
        let max_thrust = self.max_climb_thrust(condition);
        let thrust = match rating {
            EngineRating::Takeoff | EngineRating::MaxClimb | EngineRating::MaxContinuous => {
                max_thrust
            }
            EngineRating::MaxCruise => max_thrust * self.thrust.cruise_factor,
            EngineRating::Idle => max_thrust * self.idle_fraction(condition),
        };
        thrust * condition.tas
    }

    fn fuel_flow(
        &self,
        condition: &FlightCondition,
        engine_power: f64,
        rating: Option<EngineRating>,
    ) -> f64 {
        let thrust = self.thrust(condition, engine_power).max(0.0);
        let nominal = self.nominal_fuel_flow(condition, thrust);
        let minimum = self.minimum_fuel_flow(condition);

        match rating {
            Some(EngineRating::Idle) if condition.config == AeroConfig::Clean => minimum,
            Some(EngineRating::Idle) => nominal.max(minimum),
            Some(EngineRating::MaxCruise) => nominal * self.fuel.cruise_factor,
            None if condition.phase == FlightPhase::Cruise => nominal * self.fuel.cruise_factor,
            _ => nominal.max(minimum),
        }
    }
}
