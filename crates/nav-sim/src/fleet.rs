//! Fleet registry: explicitly owned vehicle map keyed by vehicle id.
//!
//! Each vehicle sits behind its own mutex; the physics tick and the
//! command surface both go through it, so a command is never observed
//! half-applied against a tick. Planning never touches this state.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use nav_core::models::PathPoint;
use thiserror::Error;

use crate::config::SimConfig;
use crate::telemetry::TelemetrySnapshot;
use crate::vehicle::{ModeTransition, Vehicle};

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown vehicle '{0}'")]
    VehicleNotFound(String),
    #[error("no staged path to execute")]
    NothingStaged,
}

/// External command surface of the simulator. Range validation
/// (speed/altitude bounds, coordinate sanity) belongs to the caller.
#[derive(Debug, Clone)]
pub enum VehicleCommand {
    SetDestination { lat: f64, lon: f64 },
    SetSpeed { kts: f64 },
    SetAltitude { ft: f64 },
    StagePendingPath { points: Vec<PathPoint> },
    ExecutePendingPath,
    PointPayload { lat: f64, lon: f64, altitude_ft: Option<f64> },
    ResetPayload,
}

pub struct Fleet {
    vehicles: DashMap<String, Arc<Mutex<Vehicle>>>,
    config: SimConfig,
}

impl Fleet {
    pub fn new(config: SimConfig) -> Self {
        Self {
            vehicles: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Register a vehicle holding at the given home position.
    pub fn spawn(&self, vehicle_id: &str, lat: f64, lon: f64) {
        let vehicle = Vehicle::new(lat, lon, &self.config);
        self.vehicles
            .insert(vehicle_id.to_string(), Arc::new(Mutex::new(vehicle)));
    }

    pub fn vehicle_ids(&self) -> Vec<String> {
        self.vehicles.iter().map(|r| r.key().clone()).collect()
    }

    /// Run a closure against a vehicle under its lock.
    pub fn with_vehicle<T>(
        &self,
        vehicle_id: &str,
        f: impl FnOnce(&mut Vehicle, &SimConfig) -> T,
    ) -> Result<T, CommandError> {
        let entry = self
            .vehicles
            .get(vehicle_id)
            .ok_or_else(|| CommandError::VehicleNotFound(vehicle_id.to_string()))?;
        let handle = entry.value().clone();
        drop(entry);
        let mut vehicle = handle.lock().expect("vehicle lock poisoned");
        Ok(f(&mut vehicle, &self.config))
    }

    /// Apply an external command to a vehicle.
    pub fn apply(&self, vehicle_id: &str, command: VehicleCommand) -> Result<(), CommandError> {
        self.with_vehicle(vehicle_id, |vehicle, config| match command {
            VehicleCommand::SetDestination { lat, lon } => {
                vehicle.set_destination(lat, lon);
                Ok(())
            }
            VehicleCommand::SetSpeed { kts } => {
                vehicle.set_speed(kts);
                Ok(())
            }
            VehicleCommand::SetAltitude { ft } => {
                vehicle.set_altitude(ft);
                Ok(())
            }
            VehicleCommand::StagePendingPath { points } => {
                vehicle.stage_pending_path(points);
                Ok(())
            }
            VehicleCommand::ExecutePendingPath => {
                if vehicle.execute_pending_path() {
                    Ok(())
                } else {
                    Err(CommandError::NothingStaged)
                }
            }
            VehicleCommand::PointPayload {
                lat,
                lon,
                altitude_ft,
            } => {
                vehicle.point_payload(lat, lon, altitude_ft);
                Ok(())
            }
            VehicleCommand::ResetPayload => {
                vehicle.reset_payload(config);
                Ok(())
            }
        })?
    }

    /// Advance every vehicle by one physics tick, returning any mode
    /// transitions for the caller to log.
    pub fn tick(&self) -> Vec<(String, ModeTransition)> {
        let mut transitions = Vec::new();
        for entry in self.vehicles.iter() {
            let mut vehicle = entry.value().lock().expect("vehicle lock poisoned");
            if let Some(transition) = vehicle.update_physics(&self.config) {
                transitions.push((entry.key().clone(), transition));
            }
        }
        transitions
    }

    pub fn snapshot(&self, vehicle_id: &str) -> Result<TelemetrySnapshot, CommandError> {
        self.with_vehicle(vehicle_id, |vehicle, _| {
            TelemetrySnapshot::capture(vehicle_id, vehicle)
        })
    }

    pub fn snapshots(&self) -> Vec<TelemetrySnapshot> {
        self.vehicles
            .iter()
            .map(|r| {
                let vehicle = r.value().lock().expect("vehicle lock poisoned");
                TelemetrySnapshot::capture(r.key(), &vehicle)
            })
            .collect()
    }
}
