use serde::{Deserialize, Serialize};

use crate::constants::{
    ADIABATIC_INDEX, AIR_DENSITY_SEA_LEVEL, GAS_CONSTANT_AIR, GRAVITY, SEA_LEVEL_PRESSURE,
    SEA_LEVEL_TEMPERATURE, TROPOPAUSE_PRESSURE, TROPOPAUSE_TEMPERATURE, TROPOSPHERE_HEIGHT,
    TROPOSPHERE_TEMP_GRADIENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Atmosphere {
    // Deviation from ISA temperature (K).
    pub delta_temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereState {
    pub altitude: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub density: f64,
    pub speed_of_sound: f64,
    pub theta: f64,
    pub delta: f64,
    pub sigma: f64,
    pub delta_temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Speed {
    Cas(f64),
    Tas(f64),
    Mach(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Airspeeds {
    pub tas: f64,
    pub cas: f64,
    pub mach: f64,
}

impl Atmosphere {
    pub fn new(delta_temp: f64) -> Self {
        Atmosphere { delta_temp }
    }

    pub fn isa() -> Self {
        Atmosphere { delta_temp: 0.0 }
    }

    pub fn state(&self, altitude: f64) -> AtmosphereState {
        let (temperature, pressure) = if altitude < TROPOSPHERE_HEIGHT {
            let isa_temperature = SEA_LEVEL_TEMPERATURE + TROPOSPHERE_TEMP_GRADIENT * altitude;
            let exponent = -GRAVITY / (TROPOSPHERE_TEMP_GRADIENT * GAS_CONSTANT_AIR);
            (
                isa_temperature + self.delta_temp,
                SEA_LEVEL_PRESSURE * (isa_temperature / SEA_LEVEL_TEMPERATURE).powf(exponent),
            )
        } else {
            (
                TROPOPAUSE_TEMPERATURE + self.delta_temp,
                TROPOPAUSE_PRESSURE
                    * (-GRAVITY / (GAS_CONSTANT_AIR * TROPOPAUSE_TEMPERATURE)
                        * (altitude - TROPOSPHERE_HEIGHT))
                        .exp(),
            )
        };

        let density = pressure / (GAS_CONSTANT_AIR * temperature);

        AtmosphereState {
            altitude,
            temperature,
            pressure,
            density,
            speed_of_sound: (ADIABATIC_INDEX * GAS_CONSTANT_AIR * temperature).sqrt(),
            theta: temperature / SEA_LEVEL_TEMPERATURE,
            delta: pressure / SEA_LEVEL_PRESSURE,
            sigma: density / AIR_DENSITY_SEA_LEVEL,
            delta_temp: self.delta_temp,
        }
    }
}

impl AtmosphereState {
    pub fn is_below_tropopause(&self) -> bool {
        self.altitude < TROPOSPHERE_HEIGHT
    }

    // Ratio between pressure-altitude rate and geometric climb rate, (T - ΔT) / T.
    pub fn temperature_correction(&self) -> f64 {
        (self.temperature - self.delta_temp) / self.temperature
    }

    pub fn cas_to_tas(&self, cas: f64) -> f64 {
        let mu = (ADIABATIC_INDEX - 1.0) / ADIABATIC_INDEX;
        let impact = SEA_LEVEL_PRESSURE
            * ((1.0 + mu / 2.0 * AIR_DENSITY_SEA_LEVEL / SEA_LEVEL_PRESSURE * cas * cas)
                .powf(1.0 / mu)
                - 1.0);
        let ratio = (1.0 + impact / self.pressure).powf(mu) - 1.0;
        (2.0 / mu * self.pressure / self.density * ratio).max(0.0).sqrt()
    }

    pub fn tas_to_cas(&self, tas: f64) -> f64 {
        let mu = (ADIABATIC_INDEX - 1.0) / ADIABATIC_INDEX;
        let impact = self.pressure
            * ((1.0 + mu / 2.0 * self.density / self.pressure * tas * tas).powf(1.0 / mu) - 1.0);
        let ratio = (1.0 + impact / SEA_LEVEL_PRESSURE).powf(mu) - 1.0;
        (2.0 / mu * SEA_LEVEL_PRESSURE / AIR_DENSITY_SEA_LEVEL * ratio)
            .max(0.0)
            .sqrt()
    }

    pub fn mach_to_tas(&self, mach: f64) -> f64 {
        mach * self.speed_of_sound
    }

    pub fn tas_to_mach(&self, tas: f64) -> f64 {
        tas / self.speed_of_sound
    }

    pub fn airspeeds(&self, speed: Speed) -> Airspeeds {
        let tas = match speed {
            Speed::Cas(cas) => self.cas_to_tas(cas),
            Speed::Tas(tas) => tas,
            Speed::Mach(mach) => self.mach_to_tas(mach),
        };
        Airspeeds {
            tas,
            cas: self.tas_to_cas(tas),
            mach: self.tas_to_mach(tas),
        }
    }

    pub fn constant_speed_esf(&self, speed: Speed, mach: f64) -> f64 {
        let lapse_term = ADIABATIC_INDEX * GAS_CONSTANT_AIR * TROPOSPHERE_TEMP_GRADIENT
            / (2.0 * GRAVITY)
            * mach
            * mach
            * self.temperature_correction();
        let below = self.is_below_tropopause();

        match speed {
            Speed::Tas(_) => 1.0,
            Speed::Mach(_) => {
                if below {
                    1.0 / (1.0 + lapse_term)
                } else {
                    1.0
                }
            }
            Speed::Cas(_) => {
                let k = ADIABATIC_INDEX;
                let base = 1.0 + (k - 1.0) / 2.0 * mach * mach;
                let phi = base.powf(-1.0 / (k - 1.0)) * (base.powf(k / (k - 1.0)) - 1.0);
                if below {
                    1.0 / (1.0 + lapse_term + phi)
                } else {
                    1.0 / (1.0 + phi)
                }
            }
        }
    }
}

impl Speed {
    pub fn value(&self) -> f64 {
        match *self {
            Speed::Cas(v) | Speed::Tas(v) | Speed::Mach(v) => v,
        }
    }

    pub fn with_value(&self, value: f64) -> Speed {
        match self {
            Speed::Cas(_) => Speed::Cas(value),
            Speed::Tas(_) => Speed::Tas(value),
            Speed::Mach(_) => Speed::Mach(value),
        }
    }

    pub fn same_kind(&self, other: &Speed) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn component_of(&self, speeds: &Airspeeds) -> f64 {
        match self {
            Speed::Cas(_) => speeds.cas,
            Speed::Tas(_) => speeds.tas,
            Speed::Mach(_) => speeds.mach,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Speed::Cas(_) => "CAS",
            Speed::Tas(_) => "TAS",
            Speed::Mach(_) => "M",
        }
    }
}
