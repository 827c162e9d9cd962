//! Simulator configuration from environment.
//!
//! Arrival and capture thresholds are derived from the tick rate and
//! the speed envelope instead of being free-standing constants; the
//! easing steps and positional interpolation are only meaningful
//! relative to the tick cadence, and the derivation keeps that
//! coupling explicit when the cadence is retuned.

use std::env;
use std::time::Duration;

use nav_core::spatial::{KNOT_MPS, meters_per_deg_lat};

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Physics tick rate in Hz.
    pub tick_hz: f64,
    /// Speed easing step per tick, in knots.
    pub speed_step_kts: f64,
    /// Altitude easing step per tick, in feet.
    pub altitude_step_ft: f64,
    /// Holding-pattern radius in degrees (~3 km at mid latitudes).
    pub orbit_radius_deg: f64,
    /// Upper speed bound enforced by the command layer, in knots.
    pub max_speed_kts: f64,
    /// Default pitch of the payload's forward/down resting pose.
    pub payload_rest_pitch_deg: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hz: 20.0,
            speed_step_kts: 0.1,
            altitude_step_ft: 0.5,
            orbit_radius_deg: 0.027,
            max_speed_kts: 500.0,
            payload_rest_pitch_deg: -15.0,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_hz: env_f64("NAVSIM_TICK_HZ", defaults.tick_hz),
            speed_step_kts: env_f64("NAVSIM_SPEED_STEP_KTS", defaults.speed_step_kts),
            altitude_step_ft: env_f64("NAVSIM_ALTITUDE_STEP_FT", defaults.altitude_step_ft),
            orbit_radius_deg: env_f64("NAVSIM_ORBIT_RADIUS_DEG", defaults.orbit_radius_deg),
            max_speed_kts: env_f64("NAVSIM_MAX_SPEED_KTS", defaults.max_speed_kts),
            payload_rest_pitch_deg: defaults.payload_rest_pitch_deg,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz)
    }

    /// Degrees of ground track covered in one tick at one knot.
    ///
    /// Uses the equatorial meters-per-degree scale; the simulator moves
    /// in degree space, matching the planner's coordinate convention.
    pub fn deg_per_knot_tick(&self) -> f64 {
        KNOT_MPS / (meters_per_deg_lat(0.0) * self.tick_hz)
    }

    /// Snap window around a waypoint, in degrees.
    ///
    /// One tick of travel at the speed ceiling: a vehicle inside this
    /// window cannot cross it in a single tick, so arrival snapping
    /// never oscillates.
    pub fn arrival_epsilon_deg(&self) -> f64 {
        self.deg_per_knot_tick() * self.max_speed_kts
    }

    /// Distance from the nav target at which a transiting vehicle with
    /// an empty queue is captured into its holding orbit. Capture at
    /// the perimeter keeps the orbit entry tangential.
    pub fn capture_radius_deg(&self) -> f64 {
        self.orbit_radius_deg
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
