use super::target::VerticalExtent;
use super::{validate_extent, Progress, SegmentContext, SegmentResult, SegmentRun};
use crate::aircraft::{EngineRating, FlightPhase};
use crate::errors::TrajectoryError;
use crate::telemetry_system::diagnostics::Diagnostics;
use crate::telemetry_system::telemetry::AircraftState;
use crate::trajectory_system::atmosphere::Speed;
use crate::trajectory_system::kinematics::{ControlLaw, StepSolver};

pub fn constant_rating(
    ctx: &SegmentContext<'_>,
    state: AircraftState,
    speed: Speed,
    rating: EngineRating,
    extent: VerticalExtent,
) -> Result<SegmentResult, TrajectoryError> {
    let (progress, phase) = match extent {
        VerticalExtent::Altitude(target) => {
            let target = TrajectoryError::require_finite("target altitude", target)?;
            let phase = if target >= state.altitude {
                FlightPhase::Climb
            } else {
                FlightPhase::Descent
            };
            (Progress::Altitude(target), phase)
        }
        VerticalExtent::Time(duration) => {
            let phase = if rating == EngineRating::Idle {
                FlightPhase::Descent
            } else {
                FlightPhase::Climb
            };
            let progress = Progress::Time {
                duration: validate_extent("duration", duration)?,
                speed_cap: None,
            };
            (progress, phase)
        }
    };

    let mut diagnostics = Diagnostics::new();
    let config = ctx.config.resolve(ctx.aircraft, &mut diagnostics)?;
    let solver = StepSolver::new(
        ctx.aircraft,
        ctx.atmosphere,
        &config,
        ControlLaw::Rating(rating),
        phase,
    );

    let comment = match phase {
        FlightPhase::Descent => "descent",
        _ => "climb",
    };
    let mut run = SegmentRun::start(ctx, &config, diagnostics, state, speed, &solver, comment)?;
    let termination = run.drive(&solver, progress, |_, _| Ok(()))?;
    Ok(run.finish(termination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::fixed_wing::ConventionalAirplane;
    use crate::aircraft::high_fidelity::HighFidelityAirplane;
    use crate::control::Termination;
    use crate::telemetry_system::diagnostics::DiagnosticKind;

    #[test]
    fn test_max_climb_reaches_target() {
        let aircraft = ConventionalAirplane::medium_twin_jet();
        let ctx = SegmentContext::new(&aircraft);

        let result = constant_rating(
            &ctx,
            AircraftState::new(3_000.0, 65_000.0),
            Speed::Cas(145.0),
            EngineRating::MaxClimb,
            VerticalExtent::Altitude(6_000.0),
        )
        .unwrap();

        assert_eq!(result.termination, Termination::TargetReached);
        let last = result.trajectory.last().unwrap();
        assert_eq!(last.altitude, 6_000.0);
        assert!(result.trajectory.iter().all(|p| p.engine_setting == "MCMB"));
        assert!(result
            .trajectory
            .points()
            .windows(2)
            .all(|w| w[1].altitude - w[0].altitude <= 304.8 + 1e-9));
    }

    #[test]
    fn test_idle_descent_is_monotonic() {
        let aircraft = HighFidelityAirplane::medium_twin_jet();
        let ctx = SegmentContext::new(&aircraft);

        let result = constant_rating(
            &ctx,
            AircraftState::new(9_000.0, 60_000.0),
            Speed::Cas(140.0),
            EngineRating::Idle,
            VerticalExtent::Altitude(5_000.0),
        )
        .unwrap();

        assert_eq!(result.termination, Termination::TargetReached);
        assert!(result
            .trajectory
            .points()
            .windows(2)
            .all(|w| w[1].altitude <= w[0].altitude && w[1].time >= w[0].time));
        assert!(result.trajectory.iter().all(|p| p.rocd < 0.0));
    }

    #[test]
    fn test_heavy_climb_stops_at_ceiling() {
        let aircraft = ConventionalAirplane::medium_twin_jet();
        let ctx = SegmentContext::new(&aircraft);

        let result = constant_rating(
            &ctx,
            AircraftState::new(11_000.0, 78_000.0),
            Speed::Mach(0.78),
            EngineRating::MaxClimb,
            VerticalExtent::Altitude(14_000.0),
        )
        .unwrap();

        assert_eq!(result.termination, Termination::Ceiling);
        assert!(result.trajectory.last().unwrap().altitude < 14_000.0);
        assert!(result.diagnostics.has(DiagnosticKind::CeilingReached));
    }
}
