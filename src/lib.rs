pub mod aircraft;
pub mod constants;
pub mod control;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use constants::*;
pub use errors::TrajectoryError;

// Aircraft models
pub use aircraft::electric::ElectricRotorcraft;
pub use aircraft::fixed_wing::ConventionalAirplane;
pub use aircraft::high_fidelity::HighFidelityAirplane;
pub use aircraft::rotorcraft::ConventionalRotorcraft;
pub use aircraft::{AeroConfig, AircraftModel, EngineRating, FlightPhase};

// Segment drivers
pub use control::acceleration::accelerate;
pub use control::config::{MassMode, SegmentConfig, StepClimbSettings};
pub use control::level::constant_speed_level;
pub use control::rating::constant_rating;
pub use control::target::{
    AccelerationExtent, AccelerationTarget, LevelExtent, SegmentTarget, VerticalExtent,
};
pub use control::vertical::{constant_rocd, constant_slope};
pub use control::{fly_segment, SegmentContext, SegmentResult, Termination};

// Re-export commonly used items from trajectory_system
pub use trajectory_system::atmosphere::{Atmosphere, Speed};
pub use trajectory_system::navigation::{HeadingReference, NavigationSetup, PathKind, Position};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::diagnostics::{DiagnosticKind, Diagnostics};
pub use telemetry_system::telemetry::{AircraftState, Trajectory, TrajectoryPoint};
