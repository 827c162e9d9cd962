//! Read-only telemetry snapshots for the transport layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vehicle::{ModeLabel, Vehicle};

/// Point-in-time view of a vehicle, safe to ship outward while the
/// vehicle itself keeps mutating under its lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub vehicle_id: String,
    pub lat: f64,
    pub lon: f64,
    pub heading_deg: f64,
    pub altitude_ft: f64,
    pub speed_kts: f64,
    pub target_lat: f64,
    pub target_lon: f64,
    pub payload_pitch_deg: f64,
    pub payload_yaw_deg: f64,
    pub mode: ModeLabel,
    pub timestamp: DateTime<Utc>,
}

impl TelemetrySnapshot {
    pub fn capture(vehicle_id: &str, vehicle: &Vehicle) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            lat: vehicle.lat,
            lon: vehicle.lon,
            heading_deg: vehicle.heading_deg(),
            altitude_ft: vehicle.current_altitude_ft,
            speed_kts: vehicle.current_speed_kts,
            target_lat: vehicle.target[0],
            target_lon: vehicle.target[1],
            payload_pitch_deg: vehicle.payload.pitch_deg,
            payload_yaw_deg: vehicle.payload.yaw_deg,
            mode: vehicle.mode_label(),
            timestamp: Utc::now(),
        }
    }
}
