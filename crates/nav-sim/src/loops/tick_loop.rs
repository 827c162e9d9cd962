//! Fixed-cadence physics loop.
//!
//! Runs in the background and advances every registered vehicle at the
//! configured tick rate. This task is the only writer of vehicle
//! kinematics; external commands interleave through each vehicle's
//! mutex between ticks.

use std::sync::Arc;

use tokio::time::interval;

use crate::fleet::Fleet;
use crate::vehicle::ModeTransition;

/// Start the physics loop. Never returns; spawn it.
pub async fn run_tick_loop(fleet: Arc<Fleet>) {
    let mut ticker = interval(fleet.config().tick_interval());

    loop {
        ticker.tick().await;

        for (vehicle_id, transition) in fleet.tick() {
            match transition {
                ModeTransition::OrbitCaptured { center } => {
                    tracing::info!(
                        vehicle_id = %vehicle_id,
                        center_lat = center[0],
                        center_lon = center[1],
                        "orbit capture: holding at destination"
                    );
                }
            }
        }
    }
}
