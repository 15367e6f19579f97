use serde::{Deserialize, Serialize};

use super::rotorcraft::{PowerRatings, RotorModel};
use super::{
    Aerodynamics, AircraftFamily, AircraftModel, EngineKind, EngineRating, FlightCondition,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    // Usable energy (Wh).
    pub capacity: f64,
    pub voltage_full: f64,
    pub voltage_empty: f64,
    pub internal_resistance: f64,
    pub max_current: f64,
}

impl Battery {
    pub fn open_circuit_voltage(&self, soc: f64) -> f64 {
        let fraction = (soc / 100.0).clamp(0.0, 1.0);
        self.voltage_empty + (self.voltage_full - self.voltage_empty) * fraction
    }

    // Maximum power the pack can deliver at its terminals (W).
    pub fn available_power(&self, soc: f64) -> f64 {
        let voc = self.open_circuit_voltage(soc);
        let r = self.internal_resistance;
        let current_limited = self.max_current * (voc - r * self.max_current);
        let matched_load = voc * voc / (4.0 * r);
        current_limited.min(matched_load).max(0.0)
    }

    // Current drawn to deliver `terminal_power` (A).
    pub fn current(&self, soc: f64, terminal_power: f64) -> f64 {
        let voc = self.open_circuit_voltage(soc);
        let r = self.internal_resistance;
        let discriminant = voc * voc - 4.0 * r * terminal_power;
        if discriminant <= 0.0 {
            voc / (2.0 * r)
        } else {
            (voc - discriminant.sqrt()) / (2.0 * r)
        }
    }

    // Chemical power drained from the cells, resistive losses included (W).
    pub fn drain_power(&self, soc: f64, terminal_power: f64) -> f64 {
        self.open_circuit_voltage(soc) * self.current(soc, terminal_power.max(0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricRotorcraft {
    pub name: String,
    pub rotor: RotorModel,
    pub max_altitude: f64,
    pub motor: PowerRatings,
    pub motor_efficiency: f64,
    pub battery: Battery,
}

impl ElectricRotorcraft {
    pub fn light_electric() -> Self {
        ElectricRotorcraft {
            name: String::from("Light electric helicopter"),
            rotor: RotorModel {
                radius: 3.5,
                tip_speed: 200.0,
                power_coefficients: [1.0e-4, 1.5e-3, 0.8, 5.0e-3, 0.0],
            },
            max_altitude: 3_048.0,
            motor: PowerRatings {
                takeoff: 150_000.0,
                max_continuous: 120_000.0,
                max_cruise: 110_000.0,
                idle_fraction: 0.1,
            },
            motor_efficiency: 0.9,
            battery: Battery {
                capacity: 40_000.0,
                voltage_full: 400.0,
                voltage_empty: 300.0,
                internal_resistance: 0.05,
                max_current: 500.0,
            },
        }
    }

    fn soc(condition: &FlightCondition) -> f64 {
        condition.soc.unwrap_or(100.0)
    }
}

impl AircraftModel for ElectricRotorcraft {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> AircraftFamily {
        AircraftFamily::RotorcraftElectric
    }

    fn engine(&self) -> EngineKind {
        EngineKind::Electric
    }

    fn aerodynamics(&self, condition: &FlightCondition) -> Aerodynamics {
        self.rotor.aerodynamics(condition)
    }

    fn available_power(&self, condition: &FlightCondition, rating: EngineRating) -> f64 {
        let battery_limited =
            self.battery.available_power(Self::soc(condition)) * self.motor_efficiency;
        self.motor.get(rating).min(battery_limited)
    }

    fn fuel_flow(
        &self,
        _condition: &FlightCondition,
        _engine_power: f64,
        _rating: Option<EngineRating>,
    ) -> f64 {
        0.0
    }

    fn battery_rate(&self, condition: &FlightCondition, engine_power: f64) -> Option<f64> {
        let terminal = engine_power.max(0.0) / self.motor_efficiency;
        let drain = self.battery.drain_power(Self::soc(condition), terminal);
        Some(100.0 * drain / (self.battery.capacity * 3600.0))
    }

    fn requires_battery(&self) -> bool {
        true
    }

    fn thrust(&self, condition: &FlightCondition, _engine_power: f64) -> f64 {
        self.rotor.rotor_thrust(condition)
    }
}
