//! Vehicle kinematic state machine.
//!
//! A vehicle is always in one of two modes: holding in a circular
//! orbit around a fixed center, or transiting a straight line toward
//! the head of its waypoint queue. The physics update runs at a fixed
//! tick cadence and eases speed and altitude toward their commanded
//! targets; movement happens in degree space using the planner's
//! coordinate convention.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use nav_core::models::PathPoint;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::payload::{self, PayloadState};

/// Active flight mode. Matched exhaustively in the tick so neither
/// branch can be silently skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightMode {
    /// Circling a fixed center at a fixed radius.
    Orbiting {
        center: [f64; 2],
        radius_deg: f64,
        angle_rad: f64,
    },
    /// Flying straight toward the current nav target; the queue holds
    /// the not-yet-visited waypoints after it.
    Transiting { queue: VecDeque<PathPoint> },
}

/// Wire label for the active mode, for telemetry consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeLabel {
    Orbiting,
    Transiting,
}

/// Mode flip observed during a physics tick, surfaced so the tick loop
/// can log it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeTransition {
    OrbitCaptured { center: [f64; 2] },
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub lat: f64,
    pub lon: f64,
    /// Current nav target; orbit center once captured.
    pub target: [f64; 2],
    pub mode: FlightMode,
    /// Candidate route staged by the planner, not yet flown.
    pub pending_path: Option<Vec<PathPoint>>,
    pub current_speed_kts: f64,
    pub target_speed_kts: f64,
    pub current_altitude_ft: f64,
    pub target_altitude_ft: f64,
    pub payload: PayloadState,
}

const DEFAULT_SPEED_KTS: f64 = 120.0;
const DEFAULT_ALTITUDE_FT: f64 = 3000.0;

impl Vehicle {
    /// Create a vehicle holding at its home position.
    pub fn new(lat: f64, lon: f64, config: &SimConfig) -> Self {
        let radius_deg = config.orbit_radius_deg;
        Self {
            // Start on the orbit ring at angle zero.
            lat: lat + radius_deg,
            lon,
            target: [lat, lon],
            mode: FlightMode::Orbiting {
                center: [lat, lon],
                radius_deg,
                angle_rad: 0.0,
            },
            pending_path: None,
            current_speed_kts: DEFAULT_SPEED_KTS,
            target_speed_kts: DEFAULT_SPEED_KTS,
            current_altitude_ft: DEFAULT_ALTITUDE_FT,
            target_altitude_ft: DEFAULT_ALTITUDE_FT,
            payload: PayloadState::new(config.payload_rest_pitch_deg),
        }
    }

    pub fn mode_label(&self) -> ModeLabel {
        match self.mode {
            FlightMode::Orbiting { .. } => ModeLabel::Orbiting,
            FlightMode::Transiting { .. } => ModeLabel::Transiting,
        }
    }

    /// Travel direction in degrees, 0 = north, normalized to [0, 360).
    pub fn heading_deg(&self) -> f64 {
        let raw = match &self.mode {
            FlightMode::Transiting { .. } => {
                let dlat = self.target[0] - self.lat;
                let dlon = self.target[1] - self.lon;
                dlon.atan2(dlat).to_degrees()
            }
            // Counter-clockwise orbit: travel direction leads the
            // radial angle by 90 degrees.
            FlightMode::Orbiting { angle_rad, .. } => angle_rad.to_degrees() + 90.0,
        };
        raw.rem_euclid(360.0)
    }

    /// Advance the vehicle by one physics tick.
    pub fn update_physics(&mut self, config: &SimConfig) -> Option<ModeTransition> {
        self.current_speed_kts = ease(
            self.current_speed_kts,
            self.target_speed_kts,
            config.speed_step_kts,
        );
        self.current_altitude_ft = ease(
            self.current_altitude_ft,
            self.target_altitude_ft,
            config.altitude_step_ft,
        );

        let step_deg = self.current_speed_kts * config.deg_per_knot_tick();
        let transition = match &mut self.mode {
            FlightMode::Transiting { queue } => {
                let dlat = self.target[0] - self.lat;
                let dlon = self.target[1] - self.lon;
                let dist = (dlat * dlat + dlon * dlon).sqrt();

                if dist <= config.capture_radius_deg() && queue.is_empty() {
                    // Perimeter capture: seed the orbit angle with the
                    // bearing from center to current position so entry
                    // is tangential instead of teleporting inward.
                    let angle_rad = (self.lon - self.target[1])
                        .atan2(self.lat - self.target[0])
                        .rem_euclid(TAU);
                    let center = self.target;
                    self.mode = FlightMode::Orbiting {
                        center,
                        radius_deg: config.orbit_radius_deg,
                        angle_rad,
                    };
                    Some(ModeTransition::OrbitCaptured { center })
                } else if dist <= config.arrival_epsilon_deg() {
                    // Snap exactly onto the waypoint to kill the
                    // floating-point residue, then pull the next one.
                    self.lat = self.target[0];
                    self.lon = self.target[1];
                    if let Some(next) = queue.pop_front() {
                        self.target = [next.lat, next.lon];
                        self.target_altitude_ft = next.altitude_ft;
                    }
                    None
                } else {
                    // Fractional interpolation toward the target. The
                    // clamp stops a single extreme tick from flying
                    // past the waypoint; speeds that large still skip
                    // the smooth approach, which is a known limit of
                    // the per-tick model.
                    let fraction = (step_deg / dist).min(1.0);
                    self.lat += dlat * fraction;
                    self.lon += dlon * fraction;
                    None
                }
            }
            FlightMode::Orbiting {
                center,
                radius_deg,
                angle_rad,
            } => {
                // Angular velocity = linear velocity / radius.
                *angle_rad = (*angle_rad + step_deg / *radius_deg).rem_euclid(TAU);
                self.lat = center[0] + *radius_deg * angle_rad.cos();
                self.lon = center[1] + *radius_deg * angle_rad.sin();
                None
            }
        };

        payload::slave_payload(self, config);
        transition
    }

    /// Fly directly to a point, discarding any queued waypoints.
    /// The commanded altitude is left untouched.
    pub fn set_destination(&mut self, lat: f64, lon: f64) {
        self.target = [lat, lon];
        self.mode = FlightMode::Transiting {
            queue: VecDeque::new(),
        };
    }

    pub fn set_speed(&mut self, kts: f64) {
        self.target_speed_kts = kts;
    }

    pub fn set_altitude(&mut self, ft: f64) {
        self.target_altitude_ft = ft;
    }

    /// Store a candidate route without affecting current flight.
    pub fn stage_pending_path(&mut self, points: Vec<PathPoint>) {
        self.pending_path = Some(points);
    }

    /// Commit the staged route: load its waypoints and start flying.
    /// Returns false (and changes nothing) when nothing usable is
    /// staged.
    pub fn execute_pending_path(&mut self) -> bool {
        if self.pending_path.as_ref().map_or(true, |p| p.is_empty()) {
            return false;
        }
        let points = self.pending_path.take().unwrap_or_default();
        let mut queue: VecDeque<PathPoint> = points.into();
        let Some(first) = queue.pop_front() else {
            return false;
        };

        self.target = [first.lat, first.lon];
        self.target_altitude_ft = first.altitude_ft;
        self.mode = FlightMode::Transiting { queue };
        true
    }

    /// Lock the payload onto an explicit ground point, overriding the
    /// implicit nav-target tracking.
    pub fn point_payload(&mut self, lat: f64, lon: f64, altitude_ft: Option<f64>) {
        self.payload.lock = Some([lat, lon, altitude_ft.unwrap_or(0.0)]);
    }

    /// Clear the lock and return the payload to its resting pose.
    pub fn reset_payload(&mut self, config: &SimConfig) {
        self.payload.lock = None;
        self.payload.pitch_deg = config.payload_rest_pitch_deg;
        self.payload.yaw_deg = self.heading_deg();
    }
}

/// Move `current` toward `target` by at most `step`, landing exactly
/// on the target when within one step.
fn ease(current: f64, target: f64, step: f64) -> f64 {
    let delta = target - current;
    if delta.abs() <= step {
        target
    } else {
        current + step.copysign(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: [f64; 2] = [31.80, 34.64];

    fn vehicle() -> (Vehicle, SimConfig) {
        let config = SimConfig::default();
        (Vehicle::new(HOME[0], HOME[1], &config), config)
    }

    fn distance_to_target(v: &Vehicle) -> f64 {
        let dlat = v.target[0] - v.lat;
        let dlon = v.target[1] - v.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    #[test]
    fn new_vehicle_is_orbiting_home() {
        let (v, config) = vehicle();
        assert_eq!(v.mode_label(), ModeLabel::Orbiting);
        assert!((distance_to_target(&v) - config.orbit_radius_deg).abs() < 1e-12);
    }

    #[test]
    fn set_destination_switches_to_transit_with_empty_queue() {
        let (mut v, _) = vehicle();
        let alt_before = v.target_altitude_ft;
        v.set_destination(31.85, 34.70);
        match &v.mode {
            FlightMode::Transiting { queue } => assert!(queue.is_empty()),
            other => panic!("expected transit, got {other:?}"),
        }
        assert_eq!(v.target, [31.85, 34.70]);
        assert_eq!(v.target_altitude_ft, alt_before);
    }

    #[test]
    fn speed_eases_in_bounded_steps() {
        let (mut v, config) = vehicle();
        v.set_speed(v.current_speed_kts + 50.0);
        let before = v.current_speed_kts;
        v.update_physics(&config);
        assert!((v.current_speed_kts - before - config.speed_step_kts).abs() < 1e-12);

        // Converges without overshooting.
        v.set_speed(before + 0.05);
        for _ in 0..10 {
            v.update_physics(&config);
            assert!(v.current_speed_kts <= before + config.speed_step_kts + 0.05 + 1e-12);
        }
    }

    #[test]
    fn altitude_eases_toward_target() {
        let (mut v, config) = vehicle();
        v.set_altitude(v.current_altitude_ft + 100.0);
        let before = v.current_altitude_ft;
        v.update_physics(&config);
        assert!((v.current_altitude_ft - before - config.altitude_step_ft).abs() < 1e-12);
    }

    #[test]
    fn transit_closes_on_target_and_captures_once() {
        let (mut v, config) = vehicle();
        v.set_destination(31.90, 34.75);

        let mut captures = 0;
        let mut last_dist = distance_to_target(&v);
        for _ in 0..200_000 {
            let transition = v.update_physics(&config);
            if let Some(ModeTransition::OrbitCaptured { center }) = transition {
                captures += 1;
                assert_eq!(center, [31.90, 34.75]);
            }
            if matches!(v.mode, FlightMode::Orbiting { .. }) {
                break;
            }
            let dist = distance_to_target(&v);
            assert!(dist <= last_dist + 1e-15, "distance must not grow in transit");
            last_dist = dist;
        }
        assert_eq!(captures, 1);

        // Further ticks never produce a second capture.
        for _ in 0..1000 {
            assert!(v.update_physics(&config).is_none());
        }
        assert_eq!(v.mode_label(), ModeLabel::Orbiting);
    }

    #[test]
    fn orbit_holds_the_ring_radius() {
        let (mut v, config) = vehicle();
        for _ in 0..5000 {
            v.update_physics(&config);
            let FlightMode::Orbiting {
                center, radius_deg, ..
            } = &v.mode
            else {
                panic!("vehicle left orbit");
            };
            let dlat = v.lat - center[0];
            let dlon = v.lon - center[1];
            let r = (dlat * dlat + dlon * dlon).sqrt();
            assert!((r - radius_deg).abs() < 1e-9);
        }
    }

    #[test]
    fn full_orbit_period_returns_to_start() {
        let (mut v, config) = vehicle();
        let angle_step = v.current_speed_kts * config.deg_per_knot_tick() / config.orbit_radius_deg;
        let ticks = (TAU / angle_step).round() as usize;

        let start = (v.lat, v.lon);
        for _ in 0..ticks {
            v.update_physics(&config);
        }
        let FlightMode::Orbiting { angle_rad, .. } = v.mode else {
            panic!("vehicle left orbit");
        };
        let angle_err = angle_rad.min(TAU - angle_rad);
        assert!(angle_err < 1e-3, "angle residual {angle_err}");
        assert!((v.lat - start.0).abs() < 1e-4);
        assert!((v.lon - start.1).abs() < 1e-4);
    }

    #[test]
    fn orbit_angle_stays_wrapped() {
        let (mut v, config) = vehicle();
        for _ in 0..50_000 {
            v.update_physics(&config);
            let FlightMode::Orbiting { angle_rad, .. } = v.mode else {
                panic!("vehicle left orbit");
            };
            assert!((0.0..TAU).contains(&angle_rad));
        }
    }

    #[test]
    fn arrival_snaps_and_dequeues_with_altitude() {
        let (mut v, config) = vehicle();
        let mut queue = VecDeque::new();
        queue.push_back(PathPoint::new(31.86, 34.71, 4500.0));
        v.mode = FlightMode::Transiting { queue };
        // Park the vehicle just inside the snap window.
        v.target = [v.lat + config.arrival_epsilon_deg() * 0.5, v.lon];

        v.update_physics(&config);
        assert_eq!(v.target, [31.86, 34.71]);
        assert_eq!(v.target_altitude_ft, 4500.0);
        match &v.mode {
            FlightMode::Transiting { queue } => assert!(queue.is_empty()),
            other => panic!("expected transit, got {other:?}"),
        }
    }

    #[test]
    fn single_tick_never_flies_past_the_target() {
        let (mut v, config) = vehicle();
        let mut queue = VecDeque::new();
        queue.push_back(PathPoint::new(31.86, 34.71, 4500.0));
        v.mode = FlightMode::Transiting { queue };
        // Target further than the snap window but closer than one tick
        // of travel: the interpolation clamp lands exactly on it.
        let dist = config.arrival_epsilon_deg() * 2.0;
        let target = [v.lat + dist, v.lon];
        v.target = target;
        v.current_speed_kts = config.max_speed_kts * 4.0;
        v.target_speed_kts = v.current_speed_kts;

        v.update_physics(&config);
        assert!((v.lat - target[0]).abs() < 1e-12);
        assert!((v.lon - target[1]).abs() < 1e-12);
    }

    #[test]
    fn execute_without_stage_is_rejected_and_state_unchanged() {
        let (mut v, _) = vehicle();
        let mode_before = v.mode.clone();
        let target_before = v.target;
        assert!(!v.execute_pending_path());
        assert_eq!(v.mode, mode_before);
        assert_eq!(v.target, target_before);

        // An empty staged path is as good as nothing staged.
        v.stage_pending_path(Vec::new());
        assert!(!v.execute_pending_path());
        assert_eq!(v.mode, mode_before);
    }

    #[test]
    fn execute_commits_staged_route_and_clears_stage() {
        let (mut v, _) = vehicle();
        v.stage_pending_path(vec![
            PathPoint::new(31.82, 34.66, 3500.0),
            PathPoint::new(31.84, 34.68, 3500.0),
            PathPoint::new(31.85, 34.70, 3500.0),
        ]);
        assert!(v.execute_pending_path());
        assert!(v.pending_path.is_none());
        assert_eq!(v.target, [31.82, 34.66]);
        assert_eq!(v.target_altitude_ft, 3500.0);
        match &v.mode {
            FlightMode::Transiting { queue } => {
                assert_eq!(queue.len(), 2);
                assert_eq!(queue[0].lat, 31.84);
            }
            other => panic!("expected transit, got {other:?}"),
        }

        // The stage is one-shot.
        assert!(!v.execute_pending_path());
    }

    #[test]
    fn heading_in_transit_points_at_target() {
        let (mut v, _) = vehicle();
        v.set_destination(v.lat + 1.0, v.lon); // due north
        assert!(v.heading_deg().abs() < 1e-9);
        v.set_destination(v.lat, v.lon + 1.0); // due east
        assert!((v.heading_deg() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn heading_in_orbit_is_tangential() {
        let (mut v, config) = vehicle();
        v.update_physics(&config);
        let FlightMode::Orbiting { angle_rad, .. } = v.mode else {
            panic!("vehicle left orbit");
        };
        let expected = (angle_rad.to_degrees() + 90.0).rem_euclid(360.0);
        assert!((v.heading_deg() - expected).abs() < 1e-9);
    }
}
