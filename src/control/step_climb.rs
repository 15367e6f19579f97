use tracing::debug;

use super::config::ResolvedStepClimb;
use super::level::step_climb_config;
use super::rating::constant_rating;
use super::target::VerticalExtent;
use super::{Progress, SegmentContext, SegmentRun, StepClimbRecord, Termination};
use crate::aircraft::{EngineRating, FlightPhase};
use crate::constants::STEP_TOLERANCE;
use crate::errors::TrajectoryError;
use crate::telemetry_system::diagnostics::DiagnosticKind;
use crate::trajectory_system::kinematics::{ControlLaw, StepSolver, Trial};

pub const STEP_CLIMB_TAG: &str = "step-climb";

// Splices a climb to the next level in after the last point when it pays off
// and fits in the rest of the segment.
pub(crate) fn try_step_climb(
    run: &mut SegmentRun<'_>,
    level: &StepSolver<'_>,
    settings: ResolvedStepClimb,
    progress: &Progress,
) -> Result<(), TrajectoryError> {
    let current = run.last_point().clone();
    let candidate = (current.altitude + settings.increment).min(settings.max_altitude);
    if candidate - current.altitude <= STEP_TOLERANCE {
        return Ok(());
    }
    let Some(range_here) = current.specific_range() else {
        return Ok(());
    };

    let speed = run.last_frame.speed;
    let trial = Trial {
        altitude: candidate,
        speed,
        mass: current.mass,
        soc: current.soc,
    };
    let cruise_there = level.evaluate(&trial);
    if cruise_there.fuel_flow <= 0.0 {
        return Ok(());
    }
    let range_there = cruise_there.ground_speed / cruise_there.fuel_flow;
    if range_there <= range_here {
        return Ok(());
    }

    let climb_solver = StepSolver::new(
        run.ctx.aircraft,
        run.ctx.atmosphere,
        run.config,
        ControlLaw::Rating(EngineRating::MaxClimb),
        FlightPhase::Climb,
    );
    let climb_rocd = climb_solver.evaluate(&trial).rocd;
    if climb_rocd <= run.config.min_rocd {
        debug!(candidate, climb_rocd, "step-climb rejected, climb rate too low");
        return Ok(());
    }

    let sub_ctx = SegmentContext {
        aircraft: run.ctx.aircraft,
        atmosphere: run.ctx.atmosphere,
        config: step_climb_config(&run.ctx.config),
        declination: run.ctx.declination,
    };
    let climb = constant_rating(
        &sub_ctx,
        current.state(),
        speed,
        EngineRating::MaxClimb,
        VerticalExtent::Altitude(candidate),
    )?;
    if climb.termination != Termination::TargetReached {
        return Ok(());
    }
    let Some(top) = climb.trajectory.last().cloned() else {
        return Ok(());
    };

    let fits = match *progress {
        Progress::Distance(length) => {
            top.distance <= run.start.distance + length - run.config.distance_step
        }
        Progress::Time { duration, .. } => {
            top.time <= run.start.time + duration - run.config.time_step
        }
        _ => false,
    };
    if !fits {
        debug!(candidate, "step-climb does not fit in the remaining segment");
        return Ok(());
    }

    let start_index = run.trajectory.len();
    for point in climb.trajectory.iter().skip(1) {
        let mut point = point.clone();
        point.comment = String::from(STEP_CLIMB_TAG);
        run.trajectory.push(point);
    }
    let end_index = run.trajectory.len() - 1;
    run.diagnostics.extend(climb.diagnostics);

    let record = StepClimbRecord {
        start_index,
        end_index,
        from_altitude: current.altitude,
        to_altitude: top.altitude,
        distance: top.distance - current.distance,
        time: top.time - current.time,
    };
    run.diagnostics.note(
        DiagnosticKind::StepClimb,
        format!(
            "step-climb from {:.0} m to {:.0} m over {:.0} m in {:.0} s",
            record.from_altitude, record.to_altitude, record.distance, record.time
        ),
    );
    run.step_climbs.push(record);

    // Resume level flight at the new altitude with the spliced totals.
    let frame = level.evaluate(&Trial {
        altitude: top.altitude,
        speed,
        mass: top.mass,
        soc: top.soc,
    });
    let point = run.point(
        &frame,
        top.time,
        top.distance,
        top.fuel_consumed,
        top.position(),
        run.comment(),
    );
    run.trajectory.push(point);
    run.last_frame = frame;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::fixed_wing::ConventionalAirplane;
    use crate::control::config::{SegmentConfig, StepClimbSettings};
    use crate::control::level::constant_speed_level;
    use crate::control::SegmentResult;
    use crate::control::target::LevelExtent;
    use crate::telemetry_system::telemetry::AircraftState;
    use crate::trajectory_system::atmosphere::Speed;

    fn cruise(length: f64, max_altitude: f64) -> SegmentResult {
        let aircraft = ConventionalAirplane::medium_twin_jet();
        let ctx = SegmentContext::new(&aircraft).with_config(SegmentConfig {
            distance_step: Some(20_000.0),
            step_climb: Some(StepClimbSettings {
                increment: 600.0,
                max_altitude: Some(max_altitude),
            }),
            ..SegmentConfig::default()
        });
        constant_speed_level(
            &ctx,
            AircraftState::new(7_500.0, 60_000.0),
            Speed::Mach(0.78),
            LevelExtent::Distance(length),
        )
        .unwrap()
    }

    #[test]
    fn test_step_climb_is_spliced() {
        let result = cruise(400_000.0, 9_000.0);

        assert!(!result.step_climbs.is_empty());
        let record = result.step_climbs[0];
        let points = result.trajectory.points();
        assert!(points[record.start_index..=record.end_index]
            .iter()
            .all(|p| p.comment == STEP_CLIMB_TAG));
        assert!(result.diagnostics.has(DiagnosticKind::StepClimb));

        // The level-off point follows the block at the new altitude.
        let resumed = &points[record.end_index + 1];
        assert_eq!(resumed.comment, "cruise");
        assert_eq!(resumed.rocd, 0.0);
        assert!((resumed.altitude - record.to_altitude).abs() < 1e-9);
    }

    #[test]
    fn test_step_climb_totals_carry_into_cruise() {
        let result = cruise(600_000.0, 9_500.0);
        let points = result.trajectory.points();

        assert!(!result.step_climbs.is_empty());
        for record in &result.step_climbs {
            let before = &points[record.start_index - 1];
            let top = &points[record.end_index];
            let resumed = &points[record.end_index + 1];

            assert!((top.distance - (before.distance + record.distance)).abs() < 1e-6);
            assert!((top.time - (before.time + record.time)).abs() < 1e-6);
            assert_eq!(resumed.distance, top.distance);
            assert_eq!(resumed.time, top.time);
            assert_eq!(resumed.fuel_consumed, top.fuel_consumed);
        }
    }

    #[test]
    fn test_no_step_climb_at_ceiling_altitude() {
        let result = cruise(200_000.0, 7_500.0);

        assert!(result.step_climbs.is_empty());
        assert!(result.trajectory.iter().all(|p| p.altitude == 7_500.0));
    }

    #[test]
    fn test_no_step_climb_when_segment_too_short() {
        let result = cruise(30_000.0, 9_000.0);

        assert!(result.step_climbs.is_empty());
    }
}
