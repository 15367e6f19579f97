use super::target::VerticalExtent;
use super::{validate_extent, Progress, SegmentContext, SegmentResult, SegmentRun};
use crate::aircraft::FlightPhase;
use crate::constants::STEP_TOLERANCE;
use crate::errors::TrajectoryError;
use crate::telemetry_system::diagnostics::{DiagnosticKind, Diagnostics};
use crate::telemetry_system::telemetry::AircraftState;
use crate::trajectory_system::atmosphere::Speed;
use crate::trajectory_system::kinematics::{ControlLaw, StepSolver};

#[derive(Debug, Clone, Copy)]
enum Held {
    Rocd(f64),
    Slope(f64),
}

impl Held {
    fn value(&self) -> f64 {
        match *self {
            Held::Rocd(value) | Held::Slope(value) => value,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Held::Rocd(_) => "rate of climb/descent",
            Held::Slope(_) => "slope",
        }
    }

    fn with_value(&self, value: f64) -> Held {
        match self {
            Held::Rocd(_) => Held::Rocd(value),
            Held::Slope(_) => Held::Slope(value),
        }
    }

    fn law(&self) -> ControlLaw {
        match *self {
            Held::Rocd(rocd) => ControlLaw::Rocd(rocd),
            Held::Slope(slope) => ControlLaw::Slope(slope),
        }
    }
}

pub fn constant_rocd(
    ctx: &SegmentContext<'_>,
    state: AircraftState,
    speed: Speed,
    rocd: f64,
    extent: VerticalExtent,
) -> Result<SegmentResult, TrajectoryError> {
    fly_vertical(ctx, state, speed, Held::Rocd(rocd), extent)
}

pub fn constant_slope(
    ctx: &SegmentContext<'_>,
    state: AircraftState,
    speed: Speed,
    slope: f64,
    extent: VerticalExtent,
) -> Result<SegmentResult, TrajectoryError> {
    if slope.abs() >= 90.0 {
        return Err(TrajectoryError::InvalidInput(format!(
            "slope must lie in (-90, 90) deg, got {}",
            slope
        )));
    }
    fly_vertical(ctx, state, speed, Held::Slope(slope), extent)
}

fn fly_vertical(
    ctx: &SegmentContext<'_>,
    state: AircraftState,
    speed: Speed,
    held: Held,
    extent: VerticalExtent,
) -> Result<SegmentResult, TrajectoryError> {
    let value = TrajectoryError::require_finite(held.name(), held.value())?;
    let mut diagnostics = Diagnostics::new();

    let (progress, phase, held) = match extent {
        VerticalExtent::Altitude(target) => {
            let target = TrajectoryError::require_finite("target altitude", target)?;
            let delta = target - state.altitude;
            if delta.abs() > STEP_TOLERANCE && value == 0.0 {
                return Err(TrajectoryError::InvalidInput(format!(
                    "{} of 0 never reaches {:.1} m from {:.1} m",
                    held.name(),
                    target,
                    state.altitude
                )));
            }
            let phase = if delta >= 0.0 {
                FlightPhase::Climb
            } else {
                FlightPhase::Descent
            };
            let held = if value != 0.0 && value.signum() != delta.signum() && delta != 0.0 {
                diagnostics.warn(
                    DiagnosticKind::InputCorrected,
                    format!(
                        "{} sign flipped to {} to reach {:.0} m",
                        held.name(),
                        -value,
                        target
                    ),
                );
                held.with_value(-value)
            } else {
                held
            };
            (Progress::Altitude(target), phase, held)
        }
        VerticalExtent::Time(duration) => {
            let phase = if value > 0.0 {
                FlightPhase::Climb
            } else if value < 0.0 {
                FlightPhase::Descent
            } else {
                FlightPhase::Cruise
            };
            let progress = Progress::Time {
                duration: validate_extent("duration", duration)?,
                speed_cap: None,
            };
            (progress, phase, held)
        }
    };

    let config = ctx.config.resolve(ctx.aircraft, &mut diagnostics)?;
    let solver = StepSolver::new(ctx.aircraft, ctx.atmosphere, &config, held.law(), phase);

    let comment = match phase {
        FlightPhase::Descent => "descent",
        FlightPhase::Climb => "climb",
        FlightPhase::Cruise => "cruise",
    };
    let mut run = SegmentRun::start(ctx, &config, diagnostics, state, speed, &solver, comment)?;
    let termination = run.drive(&solver, progress, |_, _| Ok(()))?;
    Ok(run.finish(termination))
}
