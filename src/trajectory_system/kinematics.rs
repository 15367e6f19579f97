use tracing::trace;

use super::atmosphere::{Airspeeds, Atmosphere, AtmosphereState, Speed};
use crate::aircraft::{
    AeroConfig, AircraftModel, EngineRating, FlightCondition, FlightPhase, ADAPTED_SETTING,
};
use crate::constants::{MIN_TAS_FOR_ACCELERATION, STEP_TOLERANCE};
use crate::control::config::{MassMode, ResolvedConfig};

pub fn slope_from_rocd(tas: f64, rocd: f64, temperature_correction: f64) -> f64 {
    if tas <= f64::EPSILON {
        if rocd > 0.0 {
            90.0
        } else if rocd < 0.0 {
            -90.0
        } else {
            0.0
        }
    } else {
        (rocd / (tas * temperature_correction))
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
    }
}

pub fn rocd_from_slope(tas: f64, slope: f64, temperature_correction: f64) -> f64 {
    tas * slope.to_radians().sin() * temperature_correction
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSetting {
    Rating(EngineRating),
    Adapted,
}

impl PowerSetting {
    pub fn label(&self) -> &'static str {
        match self {
            PowerSetting::Rating(rating) => rating.label(),
            PowerSetting::Adapted => ADAPTED_SETTING,
        }
    }

    fn rating(&self) -> Option<EngineRating> {
        match self {
            PowerSetting::Rating(rating) => Some(*rating),
            PowerSetting::Adapted => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalTarget {
    Rocd(f64),
    // deg
    Slope(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyAllocation {
    // Rating power; the vertical rate is held and acceleration takes the rest.
    Vertical(VerticalTarget),
    // With a vertical target the power is adapted, otherwise the rating
    // power is flown and the vertical rate takes the rest.
    Acceleration {
        value: f64,
        vertical: Option<VerticalTarget>,
    },
    Esf(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlLaw {
    Level,
    Rocd(f64),
    // deg
    Slope(f64),
    Rating(EngineRating),
    Energy {
        allocation: EnergyAllocation,
        rating: EngineRating,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    Distance(f64),
    Time(f64),
    Altitude(f64),
    Speed(Speed),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    pub altitude: f64,
    pub speed: Speed,
    pub mass: f64,
    pub soc: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopReason {
    Ceiling { altitude: f64, rocd: f64 },
    WrongDirection { altitude: f64, rocd: f64 },
    Unreachable { altitude: f64, rate: f64 },
    BatteryDepleted { altitude: f64 },
}

impl StopReason {
    pub fn describe(&self) -> String {
        match self {
            StopReason::Ceiling { altitude, rocd } => format!(
                "service ceiling reached at {:.1} m: ROCD {:.3} m/s below threshold",
                altitude, rocd
            ),
            StopReason::WrongDirection { altitude, rocd } => format!(
                "vertical rate {:.3} m/s at {:.1} m opposes the flight phase",
                rocd, altitude
            ),
            StopReason::Unreachable { altitude, rate } => format!(
                "target unreachable from {:.1} m: average rate {:.4}",
                altitude, rate
            ),
            StopReason::BatteryDepleted { altitude } => {
                format!("battery depleted at {:.1} m", altitude)
            }
        }
    }

    pub fn is_ceiling(&self) -> bool {
        matches!(self, StopReason::Ceiling { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepFrame {
    pub altitude: f64,
    pub atmosphere: AtmosphereState,
    pub speed: Speed,
    pub speeds: Airspeeds,
    pub mass: f64,
    pub soc: Option<f64>,
    pub config: AeroConfig,
    pub bank_angle: f64,
    pub rate_of_turn: f64,
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
    pub drag: f64,
    pub power_required: f64,
    pub engine_power: f64,
    pub thrust: f64,
    pub fuel_flow: f64,
    pub soc_rate: Option<f64>,
    pub rocd: f64,
    pub slope: f64,
    pub acceleration: f64,
    pub esf: f64,
    pub ground_speed: f64,
    pub setting: PowerSetting,
    pub clamped: bool,
    pub over_cruise_rating: bool,
    pub stop: Option<StopReason>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepIncrement {
    // Rates of the last pass with the integrated end state written back.
    pub frame: StepFrame,
    pub time: f64,
    pub distance: f64,
    pub fuel_burn: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Commit(StepIncrement),
    Stop {
        reason: StopReason,
        increment: Option<StepIncrement>,
    },
}

pub struct StepSolver<'a> {
    aircraft: &'a dyn AircraftModel,
    atmosphere: Atmosphere,
    config: &'a ResolvedConfig,
    law: ControlLaw,
    phase: FlightPhase,
}

impl<'a> StepSolver<'a> {
    pub fn new(
        aircraft: &'a dyn AircraftModel,
        atmosphere: Atmosphere,
        config: &'a ResolvedConfig,
        law: ControlLaw,
        phase: FlightPhase,
    ) -> Self {
        StepSolver {
            aircraft,
            atmosphere,
            config,
            law,
            phase,
        }
    }

    fn upper_rating(&self) -> EngineRating {
        match self.law {
            ControlLaw::Energy { rating, .. } if rating != EngineRating::Idle => rating,
            _ => EngineRating::MaxClimb,
        }
    }

    fn ceiling_check(&self, altitude: f64, rocd: f64) -> Option<StopReason> {
        match self.phase {
            FlightPhase::Climb if rocd < self.config.min_rocd => {
                Some(StopReason::Ceiling { altitude, rocd })
            }
            FlightPhase::Descent if rocd > 0.0 => {
                Some(StopReason::WrongDirection { altitude, rocd })
            }
            _ => None,
        }
    }

    pub fn evaluate(&self, trial: &Trial) -> StepFrame {
        let atm = self.atmosphere.state(trial.altitude);
        let speeds = atm.airspeeds(trial.speed);
        let tas = speeds.tas;

        let (bank_angle, rate_of_turn) = match &self.config.turn {
            Some(turn) => (turn.bank_angle(tas), turn.rate_of_turn(tas)),
            None => (0.0, 0.0),
        };

        let mut fc = FlightCondition {
            atmosphere: atm,
            tas,
            cas: speeds.cas,
            mach: speeds.mach,
            mass: trial.mass,
            load_factor: 1.0 / bank_angle.to_radians().cos(),
            bank_angle,
            config: AeroConfig::Clean,
            phase: self.phase,
            speed_brake: self.config.speed_brake,
            soc: trial.soc,
        };
        fc.config = match self.config.forced_config {
            Some(config) => config,
            None => self.aircraft.select_config(&fc),
        };

        let aero = self.aircraft.aerodynamics(&fc);
        let p_req = aero.power_required;
        let weight = fc.weight();
        let corr = atm.temperature_correction();
        let constant_speed_esf = atm.constant_speed_esf(trial.speed, speeds.mach);
        let inertia = trial.mass * tas.max(MIN_TAS_FOR_ACCELERATION);

        let idle = self.aircraft.available_power(&fc, EngineRating::Idle);
        let upper_rating = self.upper_rating();
        let upper = self.aircraft.available_power(&fc, upper_rating).max(idle);
        let clamp = |power: f64| -> (f64, PowerSetting, bool) {
            if power > upper {
                (upper, PowerSetting::Rating(upper_rating), true)
            } else if power < idle {
                (idle, PowerSetting::Rating(EngineRating::Idle), true)
            } else {
                (power, PowerSetting::Adapted, false)
            }
        };
        let vertical_rocd = |target: VerticalTarget| match target {
            VerticalTarget::Rocd(rocd) => rocd,
            VerticalTarget::Slope(slope) => rocd_from_slope(tas, slope, corr),
        };
        let split = |vertical_power: f64, excess: f64| -> f64 {
            if vertical_power.abs() <= f64::EPSILON {
                0.0
            } else if excess.abs() <= f64::EPSILON {
                1.0
            } else {
                vertical_power / excess
            }
        };

        let mut over_cruise_rating = false;
        let mut stop = None;

        let (engine_power, setting, clamped, rocd, acceleration, esf) = match self.law {
            ControlLaw::Level => {
                let cruise = self.aircraft.available_power(&fc, EngineRating::MaxCruise);
                over_cruise_rating = p_req > cruise;
                (p_req, PowerSetting::Adapted, false, 0.0, 0.0, constant_speed_esf)
            }
            ControlLaw::Rocd(_) | ControlLaw::Slope(_) => {
                let target = match self.law {
                    ControlLaw::Slope(slope) => rocd_from_slope(tas, slope, corr),
                    ControlLaw::Rocd(rocd) => rocd,
                    _ => 0.0,
                };
                let wanted = p_req + weight * target / (corr * constant_speed_esf);
                let (power, setting, clamped) = clamp(wanted);
                let rocd = if clamped {
                    corr * (power - p_req) * constant_speed_esf / weight
                } else {
                    target
                };
                if clamped && target.abs() > STEP_TOLERANCE {
                    stop = self.ceiling_check(trial.altitude, rocd);
                }
                let acceleration = (power - p_req) * (1.0 - constant_speed_esf) / inertia;
                (power, setting, clamped, rocd, acceleration, constant_speed_esf)
            }
            ControlLaw::Rating(rating) => {
                let power = self.aircraft.available_power(&fc, rating);
                let rocd = corr * (power - p_req) * constant_speed_esf / weight;
                stop = self.ceiling_check(trial.altitude, rocd);
                let acceleration = (power - p_req) * (1.0 - constant_speed_esf) / inertia;
                (
                    power,
                    PowerSetting::Rating(rating),
                    false,
                    rocd,
                    acceleration,
                    constant_speed_esf,
                )
            }
            ControlLaw::Energy { allocation, rating } => match allocation {
                EnergyAllocation::Vertical(target) => {
                    let power = self.aircraft.available_power(&fc, rating);
                    let rocd = vertical_rocd(target);
                    let vertical_power = weight * rocd / corr;
                    let acceleration = (power - p_req - vertical_power) / inertia;
                    let esf = split(vertical_power, power - p_req);
                    (power, PowerSetting::Rating(rating), false, rocd, acceleration, esf)
                }
                EnergyAllocation::Acceleration {
                    value,
                    vertical: Some(target),
                } => {
                    let rocd = vertical_rocd(target);
                    let vertical_power = weight * rocd / corr;
                    let wanted = p_req + vertical_power + inertia * value;
                    let (power, setting, clamped) = clamp(wanted);
                    let acceleration = if clamped {
                        (power - p_req - vertical_power) / inertia
                    } else {
                        value
                    };
                    let esf = split(vertical_power, power - p_req);
                    (power, setting, clamped, rocd, acceleration, esf)
                }
                EnergyAllocation::Acceleration {
                    value,
                    vertical: None,
                } => {
                    let power = self.aircraft.available_power(&fc, rating);
                    let rocd = corr * (power - p_req - inertia * value) / weight;
                    stop = self.ceiling_check(trial.altitude, rocd);
                    let esf = split(weight * rocd / corr, power - p_req);
                    (power, PowerSetting::Rating(rating), false, rocd, value, esf)
                }
                EnergyAllocation::Esf(esf) => {
                    let power = self.aircraft.available_power(&fc, rating);
                    let excess = power - p_req;
                    let rocd = corr * excess * esf / weight;
                    stop = self.ceiling_check(trial.altitude, rocd);
                    let acceleration = excess * (1.0 - esf) / inertia;
                    (power, PowerSetting::Rating(rating), false, rocd, acceleration, esf)
                }
            },
        };

        let slope = slope_from_rocd(tas, rocd, corr);
        let fuel_flow = self
            .aircraft
            .fuel_flow(&fc, engine_power, setting.rating());
        let soc_rate = self.aircraft.battery_rate(&fc, engine_power);
        let drag = if tas > f64::EPSILON { p_req / tas } else { 0.0 };

        StepFrame {
            altitude: trial.altitude,
            atmosphere: atm,
            speed: trial.speed,
            speeds,
            mass: trial.mass,
            soc: trial.soc,
            config: fc.config,
            bank_angle,
            rate_of_turn,
            lift_coefficient: aero.lift_coefficient,
            drag_coefficient: aero.drag_coefficient,
            drag,
            power_required: p_req,
            engine_power,
            thrust: self.aircraft.thrust(&fc, engine_power),
            fuel_flow,
            soc_rate,
            rocd,
            slope,
            acceleration,
            esf,
            ground_speed: tas * slope.to_radians().cos() + self.config.wind,
            setting,
            clamped,
            over_cruise_rating,
            stop,
        }
    }

    pub fn step(&self, prev: &StepFrame, advance: Advance) -> StepOutcome {
        let mut trial = Trial {
            altitude: match advance {
                Advance::Altitude(altitude) => altitude,
                _ => prev.altitude,
            },
            speed: match advance {
                Advance::Speed(speed) => speed,
                _ => prev.speed,
            },
            mass: prev.mass,
            soc: prev.soc,
        };
        let energy_law = matches!(self.law, ControlLaw::Energy { .. });
        let mut last: Option<(StepFrame, f64, f64, f64)> = None;

        for pass in 0..self.config.mass_passes {
            let frame = self.evaluate(&trial);
            let avg_rocd = 0.5 * (prev.rocd + frame.rocd);
            let avg_gs = 0.5 * (prev.ground_speed + frame.ground_speed);
            let avg_acceleration = 0.5 * (prev.acceleration + frame.acceleration);

            let stop_unreachable = |rate: f64| StepOutcome::Stop {
                reason: StopReason::Unreachable {
                    altitude: prev.altitude,
                    rate,
                },
                increment: None,
            };

            let dt = match advance {
                Advance::Time(dt) => dt,
                Advance::Distance(ds) => {
                    if avg_gs <= f64::EPSILON {
                        return stop_unreachable(avg_gs);
                    }
                    ds / avg_gs
                }
                Advance::Altitude(altitude) => {
                    let dh = altitude - prev.altitude;
                    if avg_rocd * dh <= 0.0 || avg_rocd.abs() <= f64::EPSILON {
                        return match frame.stop {
                            Some(reason) => StepOutcome::Stop {
                                reason,
                                increment: None,
                            },
                            None => stop_unreachable(avg_rocd),
                        };
                    }
                    dh / avg_rocd
                }
                Advance::Speed(_) => {
                    let dv = frame.speeds.tas - prev.speeds.tas;
                    if avg_acceleration * dv <= 0.0 || avg_acceleration.abs() <= f64::EPSILON {
                        return stop_unreachable(avg_acceleration);
                    }
                    dv / avg_acceleration
                }
            };
            if !dt.is_finite() || dt < 0.0 {
                return stop_unreachable(dt);
            }

            let distance = match advance {
                Advance::Distance(ds) => ds,
                _ => avg_gs * dt,
            };
            let altitude = match advance {
                Advance::Altitude(altitude) => altitude,
                _ => prev.altitude + avg_rocd * dt,
            };
            let speed = match advance {
                Advance::Speed(speed) => speed,
                _ if energy_law => {
                    let tas = prev.speeds.tas + avg_acceleration * dt;
                    let speeds = self.atmosphere.state(altitude).airspeeds(Speed::Tas(tas));
                    prev.speed.with_value(prev.speed.component_of(&speeds))
                }
                _ => prev.speed,
            };

            let fuel_burn = 0.5 * (prev.fuel_flow + frame.fuel_flow) * dt;
            let mass = match self.config.mass_mode {
                MassMode::Integrated => prev.mass - fuel_burn,
                MassMode::Constant => prev.mass,
            };
            let soc = match (prev.soc, prev.soc_rate, frame.soc_rate) {
                (Some(soc), Some(r0), Some(r1)) => Some(soc - 0.5 * (r0 + r1) * dt),
                (soc, _, _) => soc,
            };

            trace!(pass, dt, altitude, mass, "step pass");
            trial = Trial {
                altitude,
                speed,
                mass,
                soc,
            };
            last = Some((frame, dt, distance, fuel_burn));
        }

        let Some((mut frame, time, distance, fuel_burn)) = last else {
            return StepOutcome::Stop {
                reason: StopReason::Unreachable {
                    altitude: prev.altitude,
                    rate: 0.0,
                },
                increment: None,
            };
        };

        // The committed state is the integrated one; rates come from the last pass.
        frame.altitude = trial.altitude;
        frame.speed = trial.speed;
        frame.atmosphere = self.atmosphere.state(trial.altitude);
        frame.speeds = frame.atmosphere.airspeeds(trial.speed);
        frame.mass = trial.mass;
        frame.soc = trial.soc;

        let increment = StepIncrement {
            frame,
            time,
            distance,
            fuel_burn,
        };

        if let Some(soc) = trial.soc {
            if soc < 0.0 {
                return StepOutcome::Stop {
                    reason: StopReason::BatteryDepleted {
                        altitude: prev.altitude,
                    },
                    increment: None,
                };
            }
        }
        match frame.stop {
            Some(reason) => StepOutcome::Stop {
                reason,
                increment: Some(increment),
            },
            None => StepOutcome::Commit(increment),
        }
    }
}
