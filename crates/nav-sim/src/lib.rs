pub mod config;
pub mod fleet;
pub mod loops;
pub mod payload;
pub mod telemetry;
pub mod vehicle;

pub use config::SimConfig;
pub use fleet::{CommandError, Fleet, VehicleCommand};
pub use telemetry::TelemetrySnapshot;
pub use vehicle::{FlightMode, ModeLabel, ModeTransition, Vehicle};
