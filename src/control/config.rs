use serde::{Deserialize, Serialize};

use crate::aircraft::{AeroConfig, AircraftFamily, AircraftModel, EngineKind};
use crate::constants::*;
use crate::errors::TrajectoryError;
use crate::telemetry_system::diagnostics::{DiagnosticKind, Diagnostics};
use crate::trajectory_system::navigation::{NavigationSetup, TurnMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MassMode {
    #[default]
    Integrated,
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBrakes {
    pub deployed: bool,
    pub drag_increment: f64,
}

impl Default for SpeedBrakes {
    fn default() -> Self {
        SpeedBrakes {
            deployed: false,
            drag_increment: SPEED_BRAKE_DRAG_INCREMENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepClimbSettings {
    pub increment: f64,
    pub max_altitude: Option<f64>,
}

impl Default for StepClimbSettings {
    fn default() -> Self {
        StepClimbSettings {
            increment: STEP_CLIMB_INCREMENT,
            max_altitude: None,
        }
    }
}

// Unset fields fall back to per-family defaults in `resolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SegmentConfig {
    pub distance_step: Option<f64>,
    pub time_step: Option<f64>,
    pub altitude_step: Option<f64>,
    pub speed_step: Option<f64>,
    pub mach_step: Option<f64>,
    pub mass_passes: Option<usize>,
    pub min_rocd: Option<f64>,
    // CR, AP or LD; auto-selected when unset
    pub config: Option<String>,
    pub speed_brakes: SpeedBrakes,
    // along-track, positive for a tailwind (m/s)
    pub wind: f64,
    pub turn: Option<TurnMetrics>,
    pub navigation: Option<NavigationSetup>,
    pub mass_mode: MassMode,
    pub initial_soc: Option<f64>,
    pub step_climb: Option<StepClimbSettings>,
    pub commit_stop_point: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStepClimb {
    pub increment: f64,
    pub max_altitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub distance_step: f64,
    pub time_step: f64,
    pub altitude_step: f64,
    pub speed_step: f64,
    pub mach_step: f64,
    pub mass_passes: usize,
    pub min_rocd: f64,
    pub forced_config: Option<AeroConfig>,
    pub speed_brake: Option<f64>,
    pub wind: f64,
    pub turn: Option<TurnMetrics>,
    pub mass_mode: MassMode,
    pub step_climb: Option<ResolvedStepClimb>,
    pub commit_stop_point: bool,
}

fn finite_setting(name: &str, value: f64) -> Result<f64, TrajectoryError> {
    TrajectoryError::require_finite(name, value).map_err(TrajectoryError::in_config)
}

fn positive_setting(name: &str, value: f64) -> Result<f64, TrajectoryError> {
    TrajectoryError::require_positive(name, value).map_err(TrajectoryError::in_config)
}

fn positive_or(name: &str, value: Option<f64>, default: f64) -> Result<f64, TrajectoryError> {
    match value {
        Some(v) => positive_setting(name, v),
        None => Ok(default),
    }
}

impl SegmentConfig {
    pub fn resolve(
        &self,
        aircraft: &dyn AircraftModel,
        diagnostics: &mut Diagnostics,
    ) -> Result<ResolvedConfig, TrajectoryError> {
        let rotorcraft = aircraft.family().is_rotorcraft();
        let (distance, time, altitude, speed, mach) = if rotorcraft {
            (
                ROTORCRAFT_DISTANCE_STEP,
                ROTORCRAFT_TIME_STEP,
                ROTORCRAFT_ALTITUDE_STEP,
                ROTORCRAFT_SPEED_STEP,
                ROTORCRAFT_MACH_STEP,
            )
        } else {
            (
                FIXED_WING_DISTANCE_STEP,
                FIXED_WING_TIME_STEP,
                FIXED_WING_ALTITUDE_STEP,
                FIXED_WING_SPEED_STEP,
                FIXED_WING_MACH_STEP,
            )
        };

        let default_passes = match aircraft.family() {
            AircraftFamily::FixedWingConventional => CONVENTIONAL_MASS_PASSES,
            AircraftFamily::FixedWingHighFidelity => HIGH_FIDELITY_MASS_PASSES,
            AircraftFamily::RotorcraftConventional | AircraftFamily::RotorcraftElectric => {
                ROTORCRAFT_MASS_PASSES
            }
        };
        let mass_passes = match self.mass_passes {
            Some(0) => {
                return Err(TrajectoryError::Configuration(String::from(
                    "mass_passes must be at least 1",
                )))
            }
            Some(n) => n,
            None => default_passes,
        };

        let default_min_rocd = match aircraft.engine() {
            EngineKind::Jet => MIN_ROCD_JET,
            _ => MIN_ROCD_PROPELLER,
        };
        let min_rocd = match self.min_rocd {
            Some(v) => finite_setting("min_rocd", v)?,
            None => default_min_rocd,
        };

        let forced_config = match self.config.as_deref() {
            None => None,
            Some(label) => match AeroConfig::from_label(label) {
                Some(config) if aircraft.supports_config(config) => Some(config),
                _ => {
                    diagnostics.warn(
                        DiagnosticKind::UnknownConfiguration,
                        format!(
                            "configuration '{}' not available for {}, selecting automatically",
                            label,
                            aircraft.name()
                        ),
                    );
                    None
                }
            },
        };

        let speed_brake = if self.speed_brakes.deployed {
            Some(finite_setting(
                "speed brake drag increment",
                self.speed_brakes.drag_increment,
            )?)
        } else {
            None
        };

        let step_climb = match self.step_climb {
            Some(settings) => Some(ResolvedStepClimb {
                increment: positive_setting("step-climb increment", settings.increment)?,
                max_altitude: finite_setting(
                    "step-climb maximum altitude",
                    settings.max_altitude.unwrap_or(MAX_CRUISE_ALTITUDE),
                )?,
            }),
            None => None,
        };

        Ok(ResolvedConfig {
            distance_step: positive_or("distance_step", self.distance_step, distance)?,
            time_step: positive_or("time_step", self.time_step, time)?,
            altitude_step: positive_or("altitude_step", self.altitude_step, altitude)?,
            speed_step: positive_or("speed_step", self.speed_step, speed)?,
            mach_step: positive_or("mach_step", self.mach_step, mach)?,
            mass_passes,
            min_rocd,
            forced_config,
            speed_brake,
            wind: finite_setting("wind", self.wind)?,
            turn: self.turn,
            mass_mode: self.mass_mode,
            step_climb,
            commit_stop_point: self.commit_stop_point,
        })
    }
}
