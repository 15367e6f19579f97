pub mod diagnostics;
pub mod telemetry;
