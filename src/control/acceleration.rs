use super::target::{AccelerationExtent, AccelerationTarget};
use super::{validate_extent, validate_speed, Progress, SegmentContext, SegmentResult, SegmentRun};
use crate::aircraft::{EngineRating, FlightPhase};
use crate::constants::{ESF_OPPOSITE_DIRECTION, ESF_SAME_DIRECTION};
use crate::errors::TrajectoryError;
use crate::telemetry_system::diagnostics::{DiagnosticKind, Diagnostics};
use crate::telemetry_system::telemetry::AircraftState;
use crate::trajectory_system::atmosphere::Speed;
use crate::trajectory_system::kinematics::{
    ControlLaw, EnergyAllocation, StepSolver, VerticalTarget,
};

// Excess power is split between vertical rate and acceleration per `target`.
pub fn accelerate(
    ctx: &SegmentContext<'_>,
    state: AircraftState,
    initial_speed: Speed,
    final_speed: Speed,
    target: AccelerationTarget,
    phase: FlightPhase,
    extent: AccelerationExtent,
) -> Result<SegmentResult, TrajectoryError> {
    validate_speed(initial_speed)?;
    validate_speed(final_speed)?;
    if !initial_speed.same_kind(&final_speed) {
        return Err(TrajectoryError::InvalidInput(format!(
            "initial speed is {} but final speed is {}",
            initial_speed.label(),
            final_speed.label()
        )));
    }
    let accelerating = final_speed.value() >= initial_speed.value();

    let progress = match extent {
        AccelerationExtent::Speed => Progress::Speed(final_speed),
        AccelerationExtent::Time(duration) => Progress::Time {
            duration: validate_extent("duration", duration)?,
            speed_cap: Some(final_speed),
        },
    };

    let mut diagnostics = Diagnostics::new();
    let allocation = allocation(&target, phase, accelerating, &mut diagnostics)?;
    let rating = target.rating.unwrap_or(match phase {
        FlightPhase::Climb => EngineRating::MaxClimb,
        FlightPhase::Descent => EngineRating::Idle,
        FlightPhase::Cruise if accelerating => EngineRating::MaxClimb,
        FlightPhase::Cruise => EngineRating::Idle,
    });

    let config = ctx.config.resolve(ctx.aircraft, &mut diagnostics)?;
    let solver = StepSolver::new(
        ctx.aircraft,
        ctx.atmosphere,
        &config,
        ControlLaw::Energy { allocation, rating },
        phase,
    );

    let comment = if accelerating {
        "acceleration"
    } else {
        "deceleration"
    };
    let mut run = SegmentRun::start(
        ctx,
        &config,
        diagnostics,
        state,
        initial_speed,
        &solver,
        comment,
    )?;
    let termination = run.drive(&solver, progress, |_, _| Ok(()))?;
    Ok(run.finish(termination))
}

fn default_esf(phase: FlightPhase, accelerating: bool) -> f64 {
    match (phase, accelerating) {
        (FlightPhase::Cruise, _) => 0.0,
        (FlightPhase::Climb, true) | (FlightPhase::Descent, false) => ESF_SAME_DIRECTION,
        (FlightPhase::Climb, false) | (FlightPhase::Descent, true) => ESF_OPPOSITE_DIRECTION,
    }
}

fn esf_allowed(esf: f64, phase: FlightPhase, accelerating: bool) -> bool {
    match (phase, accelerating) {
        (FlightPhase::Cruise, _) => esf == 0.0,
        (FlightPhase::Climb, true) | (FlightPhase::Descent, false) => esf > 0.0 && esf <= 1.0,
        (FlightPhase::Climb, false) | (FlightPhase::Descent, true) => esf >= 1.0,
    }
}

fn vertical_target(
    target: &AccelerationTarget,
    phase: FlightPhase,
    diagnostics: &mut Diagnostics,
) -> Result<Option<VerticalTarget>, TrajectoryError> {
    let (name, value, is_slope) = match (target.slope, target.rocd) {
        (Some(slope), _) => ("slope", slope, true),
        (None, Some(rocd)) => ("rate of climb/descent", rocd, false),
        (None, None) => return Ok(None),
    };
    let make = |value: f64| {
        if is_slope {
            VerticalTarget::Slope(value)
        } else {
            VerticalTarget::Rocd(value)
        }
    };
    let value = TrajectoryError::require_finite(name, value)?;

    let corrected = match phase {
        FlightPhase::Cruise if value != 0.0 => Some(0.0),
        FlightPhase::Climb if value < 0.0 => Some(-value),
        FlightPhase::Descent if value > 0.0 => Some(-value),
        _ => None,
    };
    match corrected {
        Some(fixed) => {
            diagnostics.warn(
                DiagnosticKind::InputCorrected,
                format!("{} {} changed to {} for {:?} phase", name, value, fixed, phase),
            );
            Ok(Some(make(fixed)))
        }
        None => Ok(Some(make(value))),
    }
}

fn allocation(
    target: &AccelerationTarget,
    phase: FlightPhase,
    accelerating: bool,
    diagnostics: &mut Diagnostics,
) -> Result<EnergyAllocation, TrajectoryError> {
    let vertical = vertical_target(target, phase, diagnostics)?;

    if let Some(value) = target.acceleration {
        let value = TrajectoryError::require_finite("acceleration", value)?;
        if value == 0.0 {
            return Err(TrajectoryError::InvalidInput(String::from(
                "acceleration of 0 never changes the speed",
            )));
        }
        let value = if (value > 0.0) != accelerating {
            diagnostics.warn(
                DiagnosticKind::InputCorrected,
                format!("acceleration sign flipped to {} to match the speed change", -value),
            );
            -value
        } else {
            value
        };
        let vertical = match (vertical, phase) {
            (None, FlightPhase::Cruise) => Some(VerticalTarget::Rocd(0.0)),
            (vertical, _) => vertical,
        };
        return Ok(EnergyAllocation::Acceleration { value, vertical });
    }

    if let Some(vertical) = vertical {
        return Ok(EnergyAllocation::Vertical(vertical));
    }

    let fallback = default_esf(phase, accelerating);
    let esf = match target.esf {
        Some(esf) if esf.is_finite() && esf_allowed(esf, phase, accelerating) => esf,
        Some(esf) => {
            diagnostics.warn(
                DiagnosticKind::InputCorrected,
                format!(
                    "energy share factor {} not valid for {:?} phase, using {}",
                    esf, phase, fallback
                ),
            );
            fallback
        }
        None => fallback,
    };
    Ok(EnergyAllocation::Esf(esf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::fixed_wing::ConventionalAirplane;
    use crate::aircraft::rotorcraft::ConventionalRotorcraft;
    use crate::control::Termination;
    use approx::assert_relative_eq;

    fn jet_acceleration(
        target: AccelerationTarget,
        phase: FlightPhase,
        from: f64,
        to: f64,
    ) -> SegmentResult {
        let aircraft = ConventionalAirplane::medium_twin_jet();
        let ctx = SegmentContext::new(&aircraft);
        accelerate(
            &ctx,
            AircraftState::new(3_000.0, 60_000.0),
            Speed::Cas(from),
            Speed::Cas(to),
            target,
            phase,
            AccelerationExtent::Speed,
        )
        .unwrap()
    }

    #[test]
    fn test_level_acceleration_reaches_final_speed() {
        let result = jet_acceleration(
            AccelerationTarget::default(),
            FlightPhase::Cruise,
            130.0,
            150.0,
        );

        assert_eq!(result.termination, Termination::TargetReached);
        let last = result.trajectory.last().unwrap();
        assert_relative_eq!(last.cas, 150.0, epsilon = 1e-6);
        assert!(result.trajectory.iter().all(|p| p.altitude == 3_000.0));
        assert!(result.trajectory.iter().all(|p| p.acceleration > 0.0));
        assert!(result
            .trajectory
            .points()
            .windows(2)
            .all(|w| w[1].time > w[0].time));
    }

    #[test]
    fn test_climbing_acceleration_shares_energy() {
        let result = jet_acceleration(
            AccelerationTarget::default(),
            FlightPhase::Climb,
            130.0,
            150.0,
        );

        let points = result.trajectory.points();
        assert!(points.iter().all(|p| p.rocd > 0.0 && p.acceleration > 0.0));
        assert!(points.iter().all(|p| p.esf == ESF_SAME_DIRECTION));
        assert!(points.last().unwrap().altitude > 3_000.0);
    }

    #[test]
    fn test_explicit_acceleration_adapts_power() {
        let target = AccelerationTarget {
            acceleration: Some(0.5),
            rocd: Some(0.0),
            ..AccelerationTarget::default()
        };
        let result = jet_acceleration(target, FlightPhase::Cruise, 130.0, 140.0);

        for point in result.trajectory.iter() {
            assert!(point.esf.is_finite());
            assert_relative_eq!(point.acceleration, 0.5);
            assert_eq!(point.engine_setting, "ADAPTED");
        }
    }

    #[test]
    fn test_wrong_acceleration_sign_is_corrected() {
        let target = AccelerationTarget {
            acceleration: Some(0.5),
            ..AccelerationTarget::default()
        };
        let result = jet_acceleration(target, FlightPhase::Cruise, 150.0, 140.0);

        assert!(result.diagnostics.has(DiagnosticKind::InputCorrected));
        assert!(result.trajectory.iter().all(|p| p.acceleration < 0.0));
        assert_eq!(result.trajectory.first().unwrap().comment, "deceleration");
    }

    #[test]
    fn test_invalid_esf_falls_back_to_default() {
        let target = AccelerationTarget {
            esf: Some(0.4),
            ..AccelerationTarget::default()
        };
        let result = jet_acceleration(target, FlightPhase::Descent, 130.0, 150.0);

        assert!(result.diagnostics.has(DiagnosticKind::InputCorrected));
        assert!(result
            .trajectory
            .iter()
            .all(|p| p.esf == ESF_OPPOSITE_DIRECTION));
    }

    #[test]
    fn test_time_extent_stops_at_final_speed() {
        let helicopter = ConventionalRotorcraft::light_twin();
        let ctx = SegmentContext::new(&helicopter);

        let result = accelerate(
            &ctx,
            AircraftState::new(300.0, 3_000.0),
            Speed::Tas(30.0),
            Speed::Tas(35.0),
            AccelerationTarget {
                acceleration: Some(0.25),
                ..AccelerationTarget::default()
            },
            FlightPhase::Cruise,
            AccelerationExtent::Time(600.0),
        )
        .unwrap();

        let last = result.trajectory.last().unwrap();
        assert_relative_eq!(last.tas, 35.0, epsilon = 1e-9);
        assert_relative_eq!(last.time, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_time_extent_at_final_speed_ends_at_once() {
        let aircraft = ConventionalAirplane::medium_twin_jet();
        let ctx = SegmentContext::new(&aircraft);

        let result = accelerate(
            &ctx,
            AircraftState::new(3_000.0, 60_000.0),
            Speed::Cas(140.0),
            Speed::Cas(140.0),
            AccelerationTarget::default(),
            FlightPhase::Cruise,
            AccelerationExtent::Time(300.0),
        )
        .unwrap();

        assert_eq!(result.termination, Termination::TargetReached);
        assert_eq!(result.trajectory.len(), 1);
        assert!(!result.diagnostics.has(DiagnosticKind::EnvelopeExceeded));
        assert!(!result.diagnostics.has(DiagnosticKind::SegmentInterrupted));
    }

    #[test]
    fn test_mixed_speed_kinds_are_rejected() {
        let aircraft = ConventionalAirplane::medium_twin_jet();
        let ctx = SegmentContext::new(&aircraft);

        let result = accelerate(
            &ctx,
            AircraftState::new(3_000.0, 60_000.0),
            Speed::Cas(130.0),
            Speed::Mach(0.5),
            AccelerationTarget::default(),
            FlightPhase::Cruise,
            AccelerationExtent::Speed,
        );
        assert!(matches!(result, Err(TrajectoryError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_acceleration_is_rejected() {
        let aircraft = ConventionalAirplane::medium_twin_jet();
        let ctx = SegmentContext::new(&aircraft);

        let result = accelerate(
            &ctx,
            AircraftState::new(3_000.0, 60_000.0),
            Speed::Cas(130.0),
            Speed::Cas(140.0),
            AccelerationTarget {
                acceleration: Some(0.0),
                ..AccelerationTarget::default()
            },
            FlightPhase::Cruise,
            AccelerationExtent::Speed,
        );
        assert!(matches!(result, Err(TrajectoryError::InvalidInput(_))));
    }
}
