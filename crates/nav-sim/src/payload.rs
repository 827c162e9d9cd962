//! Sensor gimbal slaving.
//!
//! The payload tracks an explicit lock point when one is set, falls
//! back to the nav target while transiting, and rides along with the
//! vehicle heading in a fixed forward/down pose while orbiting
//! unlocked.

use nav_core::spatial::{haversine_distance, FT_TO_M};
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::vehicle::{FlightMode, Vehicle};

/// Floor on the horizontal range used for pitch, in meters. Keeps the
/// pitch solution away from the overhead singularity.
const MIN_HORIZONTAL_M: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadState {
    /// Explicit track point as [lat, lon, altitude_ft], if commanded.
    pub lock: Option<[f64; 3]>,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
}

impl PayloadState {
    pub fn new(rest_pitch_deg: f64) -> Self {
        Self {
            lock: None,
            pitch_deg: rest_pitch_deg,
            yaw_deg: 0.0,
        }
    }
}

/// Recompute gimbal yaw/pitch for the current tick.
pub fn slave_payload(vehicle: &mut Vehicle, config: &SimConfig) {
    let tracked = match (&vehicle.payload.lock, &vehicle.mode) {
        (Some(lock), _) => Some(*lock),
        (None, FlightMode::Transiting { .. }) => {
            Some([vehicle.target[0], vehicle.target[1], 0.0])
        }
        (None, FlightMode::Orbiting { .. }) => None,
    };

    match tracked {
        Some([track_lat, track_lon, track_alt_ft]) => {
            // Flat-earth bearing with the longitude axis shortened by
            // cos(latitude) so azimuth stays true away from the equator.
            let dlat = track_lat - vehicle.lat;
            let dlon = (track_lon - vehicle.lon) * vehicle.lat.to_radians().cos();
            vehicle.payload.yaw_deg = dlon.atan2(dlat).to_degrees().rem_euclid(360.0);

            let horizontal_m =
                haversine_distance(vehicle.lat, vehicle.lon, track_lat, track_lon)
                    .max(MIN_HORIZONTAL_M);
            let height_m = (vehicle.current_altitude_ft - track_alt_ft) * FT_TO_M;
            vehicle.payload.pitch_deg = -height_m.atan2(horizontal_m).to_degrees();
        }
        None => {
            vehicle.payload.yaw_deg = vehicle.heading_deg();
            vehicle.payload.pitch_deg = config.payload_rest_pitch_deg;
        }
    }
}
