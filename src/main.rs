use std::fs;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trajectory_segments::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trajectory_segments=info".parse()?),
        )
        .init();

    // Optional JSON segment config as the first argument.
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)?;
            let config: SegmentConfig = serde_json::from_str(&text)?;
            tracing::info!(path = %path, "loaded segment config");
            config
        }
        None => SegmentConfig::default(),
    };

    let aircraft = ConventionalAirplane::medium_twin_jet();
    let mut trajectory = Trajectory::new();
    let mut state = AircraftState::new(1_000.0, 68_000.0);

    let profile = [
        SegmentTarget::Rating {
            speed: Speed::Cas(145.0),
            rating: EngineRating::MaxClimb,
            extent: VerticalExtent::Altitude(9_000.0),
        },
        SegmentTarget::Acceleration {
            initial_speed: Speed::Mach(0.70),
            final_speed: Speed::Mach(0.78),
            target: AccelerationTarget::default(),
            phase: FlightPhase::Cruise,
            extent: AccelerationExtent::Speed,
        },
        SegmentTarget::Level {
            speed: Speed::Mach(0.78),
            extent: LevelExtent::Distance(1_500_000.0),
        },
        SegmentTarget::Rating {
            speed: Speed::Cas(140.0),
            rating: EngineRating::Idle,
            extent: VerticalExtent::Altitude(3_000.0),
        },
    ];

    for target in &profile {
        let segment_config = match target {
            SegmentTarget::Level { .. } => SegmentConfig {
                step_climb: Some(StepClimbSettings::default()),
                ..config.clone()
            },
            _ => config.clone(),
        };
        let ctx = SegmentContext::new(&aircraft).with_config(segment_config);
        let result = fly_segment(&ctx, state, target)?;
        for diagnostic in result.diagnostics.entries() {
            println!("[{:?}] {}", diagnostic.kind, diagnostic.message);
        }
        if let Some(next) = result.last_state() {
            state = next;
        }
        let termination = result.termination;
        trajectory.append(result.trajectory);
        if termination != Termination::TargetReached {
            println!("Segment ended early: {:?}", termination);
            break;
        }
    }

    println!("{}", trajectory);

    Ok(())
}
