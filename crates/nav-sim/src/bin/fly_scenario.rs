//! Demo scenario: plan around a restricted zone and fly the route.
//!
//! Spawns a single vehicle holding at its home point, plans a route
//! past a rectangular no-fly zone sitting on the direct line, commits
//! the route and runs the physics loop until the vehicle is captured
//! into its destination orbit.
//!
//! Usage:
//!   cargo run -p nav-sim --bin fly_scenario

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use nav_core::models::RestrictedZone;
use nav_core::planner::{plan_route, PlannerConfig};
use nav_sim::{Fleet, ModeLabel, SimConfig, VehicleCommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan around a no-fly zone and fly the route")]
struct Args {
    /// Start latitude
    #[arg(long, default_value_t = 31.80)]
    start_lat: f64,

    /// Start longitude
    #[arg(long, default_value_t = 34.64)]
    start_lon: f64,

    /// Destination latitude
    #[arg(long, default_value_t = 31.85)]
    end_lat: f64,

    /// Destination longitude
    #[arg(long, default_value_t = 34.70)]
    end_lon: f64,

    /// Cruise altitude in feet
    #[arg(long, default_value_t = 3000.0)]
    altitude_ft: f64,

    /// Give up after this many seconds of simulated flight
    #[arg(long, default_value_t = 600)]
    max_secs: u64,
}

fn demo_zone() -> RestrictedZone {
    RestrictedZone {
        id: "nfz-demo".to_string(),
        name: "Demo Range".to_string(),
        polygon: vec![
            [31.805, 34.655],
            [31.805, 34.685],
            [31.845, 34.685],
            [31.845, 34.655],
            [31.805, 34.655],
        ],
        min_altitude_ft: 0.0,
        max_altitude_ft: 10_000.0,
        active: true,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nav_sim=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = SimConfig::from_env();
    let zones = vec![demo_zone()];

    let route = plan_route(
        [args.start_lat, args.start_lon],
        [args.end_lat, args.end_lon],
        args.altitude_ft,
        &zones,
        &PlannerConfig::default(),
    );
    if route.is_blocked() {
        anyhow::bail!("no route exists between start and destination");
    }
    tracing::info!(
        waypoints = route.points.len(),
        distance_m = route.total_distance_m as i64,
        "route planned"
    );

    let fleet = Arc::new(Fleet::new(config));
    fleet.spawn("uav-1", args.start_lat, args.start_lon);
    fleet.apply(
        "uav-1",
        VehicleCommand::StagePendingPath {
            points: route.points.clone(),
        },
    )?;
    fleet.apply("uav-1", VehicleCommand::ExecutePendingPath)?;

    tokio::spawn(nav_sim::loops::tick_loop::run_tick_loop(fleet.clone()));

    let mut status = tokio::time::interval(Duration::from_secs(1));
    for _ in 0..args.max_secs {
        status.tick().await;
        let snap = fleet.snapshot("uav-1")?;
        tracing::info!(
            lat = snap.lat,
            lon = snap.lon,
            heading = snap.heading_deg as i64,
            alt_ft = snap.altitude_ft as i64,
            speed_kts = snap.speed_kts as i64,
            mode = ?snap.mode,
            "telemetry"
        );
        if snap.mode == ModeLabel::Orbiting {
            tracing::info!("destination reached, holding");
            return Ok(());
        }
    }

    anyhow::bail!("vehicle did not reach the destination in time")
}
