pub mod acceleration;
pub mod config;
pub mod level;
pub mod rating;
pub mod step_climb;
pub mod target;
pub mod vertical;

use serde::Serialize;
use tracing::debug;

use crate::aircraft::AircraftModel;
use crate::constants::STEP_TOLERANCE;
use crate::errors::TrajectoryError;
use crate::telemetry_system::diagnostics::{DiagnosticKind, Diagnostics};
use crate::telemetry_system::telemetry::{AircraftState, Trajectory, TrajectoryPoint};
use crate::trajectory_system::atmosphere::{Atmosphere, Speed};
use crate::trajectory_system::kinematics::{
    Advance, StepFrame, StepIncrement, StepOutcome, StepSolver, StopReason, Trial,
};
use crate::trajectory_system::navigation::{
    MagneticDeclination, Navigator, Position, ZeroDeclination,
};
use config::{ResolvedConfig, SegmentConfig};
use target::SegmentTarget;

pub struct SegmentContext<'a> {
    pub aircraft: &'a dyn AircraftModel,
    pub atmosphere: Atmosphere,
    pub config: SegmentConfig,
    pub declination: &'a dyn MagneticDeclination,
}

impl<'a> SegmentContext<'a> {
    pub fn new(aircraft: &'a dyn AircraftModel) -> Self {
        SegmentContext {
            aircraft,
            atmosphere: Atmosphere::isa(),
            config: SegmentConfig::default(),
            declination: &ZeroDeclination,
        }
    }

    pub fn with_atmosphere(mut self, atmosphere: Atmosphere) -> Self {
        self.atmosphere = atmosphere;
        self
    }

    pub fn with_config(mut self, config: SegmentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_declination(mut self, declination: &'a dyn MagneticDeclination) -> Self {
        self.declination = declination;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    TargetReached,
    // service ceiling or wrong-direction rate
    Ceiling,
    // unreachable target or depleted battery
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepClimbRecord {
    pub start_index: usize,
    pub end_index: usize,
    pub from_altitude: f64,
    pub to_altitude: f64,
    pub distance: f64,
    pub time: f64,
}

#[derive(Debug, Clone)]
pub struct SegmentResult {
    pub trajectory: Trajectory,
    pub diagnostics: Diagnostics,
    pub termination: Termination,
    pub step_climbs: Vec<StepClimbRecord>,
}

impl SegmentResult {
    pub fn last_state(&self) -> Option<AircraftState> {
        self.trajectory.last().map(TrajectoryPoint::state)
    }
}

pub fn fly_segment(
    ctx: &SegmentContext<'_>,
    state: AircraftState,
    target: &SegmentTarget,
) -> Result<SegmentResult, TrajectoryError> {
    match *target {
        SegmentTarget::Level { speed, extent } => {
            level::constant_speed_level(ctx, state, speed, extent)
        }
        SegmentTarget::Rocd {
            speed,
            rocd,
            extent,
        } => vertical::constant_rocd(ctx, state, speed, rocd, extent),
        SegmentTarget::Slope {
            speed,
            slope,
            extent,
        } => vertical::constant_slope(ctx, state, speed, slope, extent),
        SegmentTarget::Rating {
            speed,
            rating,
            extent,
        } => rating::constant_rating(ctx, state, speed, rating, extent),
        SegmentTarget::Acceleration {
            initial_speed,
            final_speed,
            target,
            phase,
            extent,
        } => acceleration::accelerate(
            ctx,
            state,
            initial_speed,
            final_speed,
            target,
            phase,
            extent,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Progress {
    Distance(f64),
    Time {
        duration: f64,
        speed_cap: Option<Speed>,
    },
    Altitude(f64),
    Speed(Speed),
}

pub(crate) fn validate_speed(speed: Speed) -> Result<Speed, TrajectoryError> {
    let value = TrajectoryError::require_finite("speed", speed.value())?;
    if value < 0.0 {
        return Err(TrajectoryError::InvalidInput(format!(
            "{} must not be negative, got {}",
            speed.label(),
            value
        )));
    }
    Ok(speed)
}

pub(crate) fn validate_extent(name: &str, value: f64) -> Result<f64, TrajectoryError> {
    let value = TrajectoryError::require_finite(name, value)?;
    if value < 0.0 {
        return Err(TrajectoryError::InvalidInput(format!(
            "{} must not be negative, got {}",
            name, value
        )));
    }
    Ok(value)
}

pub(crate) struct SegmentRun<'a> {
    pub ctx: &'a SegmentContext<'a>,
    pub config: &'a ResolvedConfig,
    pub trajectory: Trajectory,
    pub diagnostics: Diagnostics,
    pub step_climbs: Vec<StepClimbRecord>,
    pub start: AircraftState,
    pub last_frame: StepFrame,
    navigator: Option<Navigator<'a>>,
    comment: &'static str,
    envelope_reported: bool,
}

impl<'a> SegmentRun<'a> {
    pub fn start(
        ctx: &'a SegmentContext<'a>,
        config: &'a ResolvedConfig,
        diagnostics: Diagnostics,
        state: AircraftState,
        speed: Speed,
        solver: &StepSolver<'_>,
        comment: &'static str,
    ) -> Result<Self, TrajectoryError> {
        TrajectoryError::require_finite("altitude", state.altitude)?;
        TrajectoryError::require_positive("mass", state.mass)?;
        TrajectoryError::require_finite("time", state.time)?;
        TrajectoryError::require_finite("distance", state.distance)?;
        validate_speed(speed)?;

        let soc = if ctx.aircraft.requires_battery() {
            let soc = state.soc.or(ctx.config.initial_soc).ok_or_else(|| {
                TrajectoryError::InvalidInput(format!(
                    "{} needs an initial battery state of charge",
                    ctx.aircraft.name()
                ))
            })?;
            let soc = TrajectoryError::require_finite("state of charge", soc)?;
            if !(0.0..=100.0).contains(&soc) {
                return Err(TrajectoryError::InvalidInput(format!(
                    "state of charge {} outside [0, 100] %",
                    soc
                )));
            }
            Some(soc)
        } else {
            None
        };

        let navigator = match ctx.config.navigation {
            Some(setup) => Navigator::new(setup, ctx.declination)?,
            None => None,
        };
        if ctx.config.navigation.is_some() && navigator.is_none() {
            debug!("no initial heading given, position is not propagated");
        }
        let position = match (&navigator, state.position) {
            (Some(_), Some(position)) => Some(position),
            (Some(navigator), None) => Some(navigator.start()),
            (None, _) => None,
        };

        let frame = solver.evaluate(&Trial {
            altitude: state.altitude,
            speed,
            mass: state.mass,
            soc,
        });

        let mut run = SegmentRun {
            ctx,
            config,
            trajectory: Trajectory::new(),
            diagnostics,
            step_climbs: Vec::new(),
            start: state,
            last_frame: frame,
            navigator,
            comment,
            envelope_reported: false,
        };
        let point = run.point(
            &frame,
            state.time,
            state.distance,
            state.fuel_consumed,
            position,
            comment,
        );
        run.check_envelope(&frame);
        run.trajectory.push(point);
        Ok(run)
    }

    pub fn last_point(&self) -> &TrajectoryPoint {
        // `start` always commits the initial point.
        &self.trajectory.points()[self.trajectory.len() - 1]
    }

    pub fn comment(&self) -> &'static str {
        self.comment
    }

    pub(crate) fn point(
        &self,
        frame: &StepFrame,
        time: f64,
        distance: f64,
        fuel_consumed: f64,
        position: Option<Position>,
        comment: &str,
    ) -> TrajectoryPoint {
        let mut point = TrajectoryPoint {
            time,
            distance,
            altitude: frame.altitude,
            tas: frame.speeds.tas,
            cas: frame.speeds.cas,
            mach: frame.speeds.mach,
            mass: frame.mass,
            fuel_consumed,
            fuel_flow: frame.fuel_flow,
            soc: frame.soc,
            soc_rate: frame.soc_rate,
            rocd: frame.rocd,
            slope: frame.slope,
            acceleration: frame.acceleration,
            esf: frame.esf,
            ground_speed: frame.ground_speed,
            thrust: frame.thrust,
            drag: frame.drag,
            engine_power: frame.engine_power,
            power_required: frame.power_required,
            lift_coefficient: frame.lift_coefficient,
            drag_coefficient: frame.drag_coefficient,
            config: frame.config,
            engine_setting: String::from(frame.setting.label()),
            bank_angle: frame.bank_angle,
            rate_of_turn: frame.rate_of_turn,
            latitude: None,
            longitude: None,
            true_heading: None,
            magnetic_heading: None,
            comment: String::from(comment),
        };
        point.set_position(position);
        point
    }

    fn check_envelope(&mut self, frame: &StepFrame) {
        if self.envelope_reported {
            return;
        }
        if frame.clamped && !frame.over_cruise_rating {
            debug!(
                altitude = frame.altitude,
                setting = frame.setting.label(),
                engine_power = frame.engine_power,
                "requested power limited to the available envelope"
            );
            return;
        }
        if !frame.over_cruise_rating {
            return;
        }
        self.envelope_reported = true;
        self.diagnostics.warn(
            DiagnosticKind::EnvelopeExceeded,
            format!(
                "{} needs {:.0} W for level flight at {:.0} m, above the cruise rating",
                self.ctx.aircraft.name(),
                frame.power_required,
                frame.altitude
            ),
        );
    }

    pub fn commit(&mut self, increment: &StepIncrement) {
        let last = self.last_point();
        let time = last.time + increment.time;
        let distance = last.distance + increment.distance;
        let fuel_consumed = last.fuel_consumed + increment.fuel_burn;
        let position = match (&self.navigator, last.position()) {
            (Some(navigator), Some(from)) => Some(navigator.advance(
                &from,
                increment.distance,
                increment.time,
                self.config.turn.as_ref(),
                increment.frame.speeds.tas,
            )),
            _ => None,
        };

        let frame = increment.frame;
        let point = self.point(&frame, time, distance, fuel_consumed, position, self.comment);
        debug!(
            time,
            distance,
            altitude = frame.altitude,
            mass = frame.mass,
            "committed point"
        );
        self.check_envelope(&frame);
        self.trajectory.push(point);
        self.last_frame = frame;
    }

    fn next_advance(&self, progress: &Progress) -> Option<(Advance, bool)> {
        let last = self.last_point();
        let config = self.config;
        match *progress {
            Progress::Distance(length) => {
                let remaining = length - (last.distance - self.start.distance);
                if remaining <= STEP_TOLERANCE {
                    None
                } else if remaining <= config.distance_step {
                    Some((Advance::Distance(remaining), true))
                } else {
                    Some((Advance::Distance(config.distance_step), false))
                }
            }
            Progress::Time { duration, .. } => {
                let remaining = duration - (last.time - self.start.time);
                if remaining <= STEP_TOLERANCE {
                    None
                } else if remaining <= config.time_step {
                    Some((Advance::Time(remaining), true))
                } else {
                    Some((Advance::Time(config.time_step), false))
                }
            }
            Progress::Altitude(target) => {
                let remaining = target - last.altitude;
                if remaining.abs() <= STEP_TOLERANCE {
                    None
                } else if remaining.abs() <= config.altitude_step {
                    Some((Advance::Altitude(target), true))
                } else {
                    Some((
                        Advance::Altitude(
                            last.altitude + remaining.signum() * config.altitude_step,
                        ),
                        false,
                    ))
                }
            }
            Progress::Speed(target) => {
                let current = self.last_frame.speed.value();
                let step = match target {
                    Speed::Mach(_) => config.mach_step,
                    _ => config.speed_step,
                };
                let remaining = target.value() - current;
                if remaining.abs() <= STEP_TOLERANCE {
                    None
                } else if remaining.abs() <= step {
                    Some((Advance::Speed(target), true))
                } else {
                    Some((
                        Advance::Speed(target.with_value(current + remaining.signum() * step)),
                        false,
                    ))
                }
            }
        }
    }

    // Keeps rounding from overshooting the extent.
    fn snap_final(&mut self, progress: &Progress) {
        let start = self.start;
        if let Some(point) = self.trajectory.points_mut().last_mut() {
            match *progress {
                Progress::Distance(length) => point.distance = start.distance + length,
                Progress::Time { duration, .. } => point.time = start.time + duration,
                _ => {}
            }
        }
    }

    fn speed_passed(&self, cap: Speed, increment: &StepIncrement) -> bool {
        let before = cap.value() - self.last_frame.speed.value();
        let after = cap.value() - increment.frame.speed.value();
        before.abs() > STEP_TOLERANCE && before * after <= 0.0
    }

    fn report_stop(&mut self, reason: StopReason) -> Termination {
        match reason {
            StopReason::Ceiling { .. } | StopReason::WrongDirection { .. } => {
                self.diagnostics
                    .warn(DiagnosticKind::CeilingReached, reason.describe());
                Termination::Ceiling
            }
            StopReason::Unreachable { .. } | StopReason::BatteryDepleted { .. } => {
                self.diagnostics
                    .warn(DiagnosticKind::SegmentInterrupted, reason.describe());
                Termination::Interrupted
            }
        }
    }

    // `after_commit` runs after every committed non-final step.
    pub fn drive<F>(
        &mut self,
        solver: &StepSolver<'_>,
        progress: Progress,
        mut after_commit: F,
    ) -> Result<Termination, TrajectoryError>
    where
        F: FnMut(&mut SegmentRun<'a>, &Progress) -> Result<(), TrajectoryError>,
    {
        if let Some(reason) = self.last_frame.stop {
            return Ok(self.report_stop(reason));
        }
        if let Progress::Time {
            speed_cap: Some(cap),
            ..
        } = progress
        {
            if (cap.value() - self.last_frame.speed.value()).abs() <= STEP_TOLERANCE {
                return Ok(Termination::TargetReached);
            }
        }

        while let Some((advance, is_final)) = self.next_advance(&progress) {
            match solver.step(&self.last_frame, advance) {
                StepOutcome::Commit(increment) => {
                    if let Progress::Time {
                        speed_cap: Some(cap),
                        ..
                    } = progress
                    {
                        if self.speed_passed(cap, &increment) {
                            return self.finish_at_speed(solver, cap);
                        }
                    }
                    self.commit(&increment);
                    if is_final {
                        self.snap_final(&progress);
                    } else {
                        after_commit(self, &progress)?;
                    }
                }
                StepOutcome::Stop { reason, increment } => {
                    if self.config.commit_stop_point {
                        if let Some(increment) = increment {
                            self.commit(&increment);
                        }
                    }
                    return Ok(self.report_stop(reason));
                }
            }
        }
        Ok(Termination::TargetReached)
    }

    fn finish_at_speed(
        &mut self,
        solver: &StepSolver<'_>,
        cap: Speed,
    ) -> Result<Termination, TrajectoryError> {
        match solver.step(&self.last_frame, Advance::Speed(cap)) {
            StepOutcome::Commit(increment) => {
                self.commit(&increment);
                Ok(Termination::TargetReached)
            }
            StepOutcome::Stop { reason, .. } => Ok(self.report_stop(reason)),
        }
    }

    pub fn finish(self, termination: Termination) -> SegmentResult {
        SegmentResult {
            trajectory: self.trajectory,
            diagnostics: self.diagnostics,
            termination,
            step_climbs: self.step_climbs,
        }
    }
}
