//! Restricted-zone geometry: outward buffering and segment clearance.
//!
//! All tests run in degree space. Latitude/longitude scaling is
//! anisotropic but affine, so incidence (crossings, containment) is
//! preserved; metric quantities (the buffer margin) are computed in a
//! local meters-per-degree frame around the ring.

use crate::models::RestrictedZone;
use crate::spatial::{meters_to_lat, meters_to_lon};

/// Orientation epsilon for degree-space cross products.
const EPS_DEG: f64 = 1e-12;

/// Distance (in degrees) under which a point counts as on the boundary
/// rather than strictly interior. Roughly a tenth of a millimeter.
const BOUNDARY_EPS_DEG: f64 = 1e-9;

/// Lat/lon bounding box used to pre-filter segment tests.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Envelope {
    fn of_ring(ring: &[[f64; 2]]) -> Self {
        let mut env = Envelope {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        };
        for vertex in ring {
            env.min_lat = env.min_lat.min(vertex[0]);
            env.max_lat = env.max_lat.max(vertex[0]);
            env.min_lon = env.min_lon.min(vertex[1]);
            env.max_lon = env.max_lon.max(vertex[1]);
        }
        env
    }

    /// Whether the bounding box of segment a-b overlaps this envelope.
    pub fn intersects_segment_bbox(&self, a: [f64; 2], b: [f64; 2]) -> bool {
        let seg_min_lat = a[0].min(b[0]);
        let seg_max_lat = a[0].max(b[0]);
        let seg_min_lon = a[1].min(b[1]);
        let seg_max_lon = a[1].max(b[1]);
        seg_min_lat <= self.max_lat
            && seg_max_lat >= self.min_lat
            && seg_min_lon <= self.max_lon
            && seg_max_lon >= self.min_lon
    }
}

/// A restricted zone expanded outward by the safety margin, ready for
/// clearance tests. The buffered ring is open (no closing duplicate).
#[derive(Debug, Clone)]
pub struct BufferedZone {
    pub ring: Vec<[f64; 2]>,
    pub envelope: Envelope,
}

impl BufferedZone {
    /// Buffer a zone's polygon outward by `margin_m` meters.
    ///
    /// Uses a chamfered offset: each edge is pushed out along its
    /// outward normal and adjacent offset edges are joined by a single
    /// straight corner cut, giving two vertices per original vertex
    /// instead of an arc fan. Returns `None` when the ring degenerates
    /// below 3 usable vertices; callers treat such zones as absent.
    pub fn from_zone(zone: &RestrictedZone, margin_m: f64) -> Option<Self> {
        let ring = open_ring(&zone.polygon);
        if ring.len() < 3 {
            return None;
        }

        let ref_lat = ring.iter().map(|v| v[0]).sum::<f64>() / ring.len() as f64;
        let margin_lat = meters_to_lat(margin_m, ref_lat);
        let margin_lon = meters_to_lon(margin_m, ref_lat);

        // Signed area decides which side of each edge faces outward.
        let ccw = signed_area(&ring) > 0.0;

        let n = ring.len();
        let mut buffered = Vec::with_capacity(2 * n);
        for i in 0..n {
            let p = ring[i];
            let q = ring[(i + 1) % n];
            let dlat = q[0] - p[0];
            let dlon = q[1] - p[1];
            let len = (dlat * dlat + dlon * dlon).sqrt();
            if len < EPS_DEG {
                continue;
            }
            // Unit normal in degree space, pointing away from the interior.
            // For a counter-clockwise ring (in lon/lat axes) the outward
            // side is the right-hand normal of the edge direction.
            let (mut nlat, mut nlon) = (-dlon / len, dlat / len);
            if !ccw {
                nlat = -nlat;
                nlon = -nlon;
            }
            let off = [nlat * margin_lat, nlon * margin_lon];
            buffered.push([p[0] + off[0], p[1] + off[1]]);
            buffered.push([q[0] + off[0], q[1] + off[1]]);
        }

        if buffered.len() < 3 {
            return None;
        }

        let envelope = Envelope::of_ring(&buffered);
        Some(Self {
            ring: buffered,
            envelope,
        })
    }

    /// Whether a point lies strictly inside the buffered ring.
    ///
    /// Points on (or within a hair of) the boundary are treated as
    /// outside, so visibility edges hugging the ring perimeter stay
    /// clear.
    pub fn interior_contains(&self, lat: f64, lon: f64) -> bool {
        let n = self.ring.len();
        for i in 0..n {
            let p = self.ring[i];
            let q = self.ring[(i + 1) % n];
            if point_segment_distance_deg([lat, lon], p, q) < BOUNDARY_EPS_DEG {
                return false;
            }
        }

        // Ray casting: count crossings of an eastward ray.
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let yi = self.ring[i][0];
            let xi = self.ring[i][1];
            let yj = self.ring[j][0];
            let xj = self.ring[j][1];
            if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Whether the segment a-b is obstructed by this zone.
    ///
    /// Blocked when any ring edge properly crosses the segment, when
    /// either endpoint lies strictly inside, or when the segment
    /// midpoint lies inside (catches chords between ring vertices that
    /// cut straight through the interior).
    pub fn blocks_segment(&self, a: [f64; 2], b: [f64; 2]) -> bool {
        if !self.envelope.intersects_segment_bbox(a, b) {
            return false;
        }

        let n = self.ring.len();
        for i in 0..n {
            let p = self.ring[i];
            let q = self.ring[(i + 1) % n];
            if segments_cross_properly(a, b, p, q) {
                return true;
            }
        }

        if self.interior_contains(a[0], a[1]) || self.interior_contains(b[0], b[1]) {
            return true;
        }

        let mid = [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0];
        self.interior_contains(mid[0], mid[1])
    }
}

/// Buffer every zone that is active and restricts the given altitude.
/// Degenerate results are silently dropped.
pub fn buffer_zones(zones: &[RestrictedZone], altitude_ft: f64, margin_m: f64) -> Vec<BufferedZone> {
    zones
        .iter()
        .filter(|zone| zone.active && zone.applies_at_altitude(altitude_ft))
        .filter_map(|zone| BufferedZone::from_zone(zone, margin_m))
        .collect()
}

/// Strip the closing duplicate and any consecutive duplicate vertices.
fn open_ring(polygon: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut ring: Vec<[f64; 2]> = Vec::with_capacity(polygon.len());
    for vertex in polygon {
        if let Some(last) = ring.last() {
            if (last[0] - vertex[0]).abs() < EPS_DEG && (last[1] - vertex[1]).abs() < EPS_DEG {
                continue;
            }
        }
        ring.push(*vertex);
    }
    if ring.len() >= 2 {
        let first = ring[0];
        let last = ring[ring.len() - 1];
        if (first[0] - last[0]).abs() < 1e-7 && (first[1] - last[1]).abs() < 1e-7 {
            ring.pop();
        }
    }
    ring
}

fn signed_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        area += p[1] * q[0] - q[1] * p[0];
    }
    area / 2.0
}

fn orient(p: [f64; 2], q: [f64; 2], r: [f64; 2]) -> f64 {
    (q[0] - p[0]) * (r[1] - p[1]) - (q[1] - p[1]) * (r[0] - p[0])
}

/// Proper crossing only: segments sharing an endpoint or merely
/// touching do not count. Visibility edges terminate on ring vertices,
/// so endpoint contact must stay legal.
fn segments_cross_properly(a1: [f64; 2], a2: [f64; 2], b1: [f64; 2], b2: [f64; 2]) -> bool {
    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    let a_crosses = (o1 > EPS_DEG && o2 < -EPS_DEG) || (o1 < -EPS_DEG && o2 > EPS_DEG);
    let b_crosses = (o3 > EPS_DEG && o4 < -EPS_DEG) || (o3 < -EPS_DEG && o4 > EPS_DEG);
    a_crosses && b_crosses
}

fn point_segment_distance_deg(point: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let abx = b[0] - a[0];
    let aby = b[1] - a[1];
    let apx = point[0] - a[0];
    let apy = point[1] - a[1];
    let len_sq = abx * abx + aby * aby;
    if len_sq < EPS_DEG {
        return (apx * apx + apy * apy).sqrt();
    }
    let t = ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0);
    let dx = apx - t * abx;
    let dy = apy - t * aby;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_zone() -> RestrictedZone {
        RestrictedZone {
            id: "z1".to_string(),
            name: "Square".to_string(),
            polygon: vec![
                [31.80, 34.60],
                [31.80, 34.62],
                [31.82, 34.62],
                [31.82, 34.60],
                [31.80, 34.60],
            ],
            min_altitude_ft: 0.0,
            max_altitude_ft: 10_000.0,
            active: true,
        }
    }

    #[test]
    fn buffering_grows_the_ring() {
        let zone = square_zone();
        let buffered = BufferedZone::from_zone(&zone, 55.0).unwrap();
        // Chamfered offset doubles the vertex count.
        assert_eq!(buffered.ring.len(), 8);
        assert!(buffered.envelope.min_lat < 31.80);
        assert!(buffered.envelope.max_lat > 31.82);
        assert!(buffered.envelope.min_lon < 34.60);
        assert!(buffered.envelope.max_lon > 34.62);
    }

    #[test]
    fn degenerate_zone_is_skipped() {
        let mut zone = square_zone();
        zone.polygon = vec![[31.80, 34.60], [31.80, 34.60], [31.80, 34.60]];
        assert!(BufferedZone::from_zone(&zone, 55.0).is_none());
    }

    #[test]
    fn interior_containment() {
        let buffered = BufferedZone::from_zone(&square_zone(), 55.0).unwrap();
        assert!(buffered.interior_contains(31.81, 34.61));
        assert!(!buffered.interior_contains(31.90, 34.61));
    }

    #[test]
    fn ring_vertex_is_not_interior() {
        let buffered = BufferedZone::from_zone(&square_zone(), 55.0).unwrap();
        let vertex = buffered.ring[0];
        assert!(!buffered.interior_contains(vertex[0], vertex[1]));
    }

    #[test]
    fn crossing_segment_is_blocked() {
        let buffered = BufferedZone::from_zone(&square_zone(), 55.0).unwrap();
        assert!(buffered.blocks_segment([31.81, 34.55], [31.81, 34.70]));
    }

    #[test]
    fn distant_segment_is_clear() {
        let buffered = BufferedZone::from_zone(&square_zone(), 55.0).unwrap();
        assert!(!buffered.blocks_segment([31.90, 34.55], [31.90, 34.70]));
    }

    #[test]
    fn perimeter_edge_between_ring_vertices_is_clear() {
        let buffered = BufferedZone::from_zone(&square_zone(), 55.0).unwrap();
        // Consecutive buffered vertices lie along one offset edge.
        let a = buffered.ring[0];
        let b = buffered.ring[1];
        assert!(!buffered.blocks_segment(a, b));
    }

    #[test]
    fn chord_through_interior_is_blocked() {
        let buffered = BufferedZone::from_zone(&square_zone(), 55.0).unwrap();
        // Opposite corners of the buffered ring: the chord cuts the middle.
        let a = buffered.ring[0];
        let b = buffered.ring[4];
        assert!(buffered.blocks_segment(a, b));
    }

    #[test]
    fn envelope_prefilter_rejects_far_segments() {
        let buffered = BufferedZone::from_zone(&square_zone(), 55.0).unwrap();
        assert!(!buffered
            .envelope
            .intersects_segment_bbox([40.0, 30.0], [41.0, 31.0]));
    }

    #[test]
    fn inactive_and_out_of_band_zones_are_filtered() {
        let mut inactive = square_zone();
        inactive.active = false;
        let mut high = square_zone();
        high.id = "z2".to_string();
        high.min_altitude_ft = 20_000.0;
        high.max_altitude_ft = 30_000.0;

        let buffered = buffer_zones(&[inactive, high], 3000.0, 55.0);
        assert!(buffered.is_empty());
    }
}
