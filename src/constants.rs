// Physical Constants
pub const GRAVITY: f64 = 9.80665; // m/s²
pub const EARTH_RADIUS: f64 = 6_371_000.0; // meters (mean spherical radius)
pub const GAS_CONSTANT_AIR: f64 = 287.05287; // J/(kg·K)
pub const ADIABATIC_INDEX: f64 = 1.4;

// Environmental Constants (ISA)
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15; // K
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0; // Pa
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³
pub const SPEED_OF_SOUND_SEA_LEVEL: f64 = 340.294; // m/s
pub const TROPOSPHERE_TEMP_GRADIENT: f64 = -0.0065; // K per meter
pub const TROPOSPHERE_HEIGHT: f64 = 11_000.0; // m
pub const TROPOPAUSE_TEMPERATURE: f64 = 216.65; // K (ISA)
pub const TROPOPAUSE_PRESSURE: f64 = 22_632.04; // Pa (ISA)

// Fuel
pub const FUEL_LOWER_HEATING_VALUE: f64 = 43.13e6; // J/kg (Jet A)

// Step defaults, fixed-wing
pub const FIXED_WING_DISTANCE_STEP: f64 = 18_520.0; // m (10 NM)
pub const FIXED_WING_TIME_STEP: f64 = 60.0; // s
pub const FIXED_WING_ALTITUDE_STEP: f64 = 304.8; // m (1000 ft)
pub const FIXED_WING_SPEED_STEP: f64 = 2.572; // m/s (5 kt)
pub const FIXED_WING_MACH_STEP: f64 = 0.01;

// Step defaults, rotorcraft
pub const ROTORCRAFT_DISTANCE_STEP: f64 = 1_852.0; // m (1 NM)
pub const ROTORCRAFT_TIME_STEP: f64 = 10.0; // s
pub const ROTORCRAFT_ALTITUDE_STEP: f64 = 30.48; // m (100 ft)
pub const ROTORCRAFT_SPEED_STEP: f64 = 1.0; // m/s
pub const ROTORCRAFT_MACH_STEP: f64 = 0.005;

// Mass-convergence passes per step
pub const CONVENTIONAL_MASS_PASSES: usize = 5;
pub const HIGH_FIDELITY_MASS_PASSES: usize = 10;
pub const ROTORCRAFT_MASS_PASSES: usize = 10;

// Service ceiling thresholds
pub const MIN_ROCD_JET: f64 = 1.524; // m/s (300 ft/min)
pub const MIN_ROCD_PROPELLER: f64 = 0.508; // m/s (100 ft/min)

// Energy share factor defaults for acceleration segments
pub const ESF_SAME_DIRECTION: f64 = 0.3;
pub const ESF_OPPOSITE_DIRECTION: f64 = 1.7;

// Step-climb defaults
pub const STEP_CLIMB_INCREMENT: f64 = 609.6; // m (2000 ft)
pub const MAX_CRUISE_ALTITUDE: f64 = 12_496.8; // m (FL410)

// Numerical guards
pub const STEP_TOLERANCE: f64 = 1e-9;
pub const MIN_TAS_FOR_ACCELERATION: f64 = 1.0; // m/s
pub const SPEED_BRAKE_DRAG_INCREMENT: f64 = 0.03;
