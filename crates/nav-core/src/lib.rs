pub mod geometry;
pub mod models;
pub mod planner;
pub mod spatial;
pub mod visibility;

pub use geometry::{buffer_zones, BufferedZone, Envelope};
pub use models::{PathPoint, RestrictedZone, Route, RouteRequest};
pub use planner::{plan_route, plan_route_request, PlannerConfig};
pub use spatial::{bearing, haversine_distance};
pub use visibility::VisibilityGraph;
