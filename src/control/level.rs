use super::config::SegmentConfig;
use super::step_climb;
use super::target::LevelExtent;
use super::{validate_extent, Progress, SegmentContext, SegmentResult, SegmentRun};
use crate::aircraft::FlightPhase;
use crate::errors::TrajectoryError;
use crate::telemetry_system::diagnostics::Diagnostics;
use crate::telemetry_system::telemetry::AircraftState;
use crate::trajectory_system::atmosphere::Speed;
use crate::trajectory_system::kinematics::{ControlLaw, StepSolver};

pub fn constant_speed_level(
    ctx: &SegmentContext<'_>,
    state: AircraftState,
    speed: Speed,
    extent: LevelExtent,
) -> Result<SegmentResult, TrajectoryError> {
    let progress = match extent {
        LevelExtent::Distance(length) => Progress::Distance(validate_extent("length", length)?),
        LevelExtent::Time(duration) => Progress::Time {
            duration: validate_extent("duration", duration)?,
            speed_cap: None,
        },
    };

    let mut diagnostics = Diagnostics::new();
    let config = ctx.config.resolve(ctx.aircraft, &mut diagnostics)?;
    let solver = StepSolver::new(
        ctx.aircraft,
        ctx.atmosphere,
        &config,
        ControlLaw::Level,
        FlightPhase::Cruise,
    );

    let mut run = SegmentRun::start(ctx, &config, diagnostics, state, speed, &solver, "cruise")?;
    let termination = match config.step_climb {
        Some(settings) => run.drive(&solver, progress, |run, progress| {
            step_climb::try_step_climb(run, &solver, settings, progress)
        })?,
        None => run.drive(&solver, progress, |_, _| Ok(()))?,
    };
    Ok(run.finish(termination))
}

pub(crate) fn step_climb_config(config: &SegmentConfig) -> SegmentConfig {
    SegmentConfig {
        step_climb: None,
        commit_stop_point: false,
        ..config.clone()
    }
}
