//! R-tree nodes and the proximity index built over a network version.
//!
//! ## Two-Stage Filtering
//!
//! The spatial queries use a two-stage filtering approach:
//! 1. **R-tree filter**: Euclidean distance in degree space, with a radius
//!    widened so it always covers the requested kilometres
//! 2. **Haversine filter**: exact great-circle distance on the survivors
//!
//! Results are ordered by haversine distance, ties broken by identifier so
//! identical inputs always produce identical output.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use geo::{Coord, Line, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::identifiers::StopId;
use crate::models::types::{Route, Stop};
use crate::spatial::queries::{haversine_km, haversine_km_to_line, km_to_degrees_envelope};

// ============================================================================
// Stop Spatial Node
// ============================================================================

#[derive(Clone)]
pub struct StopNode {
    pub stop: Arc<Stop>,
    point: [f64; 2],
}

impl StopNode {
    pub fn new(stop: Arc<Stop>) -> Self {
        let point = [stop.location.x(), stop.location.y()];
        Self { stop, point }
    }
}

impl RTreeObject for StopNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StopNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ============================================================================
// Route Segment Spatial Node
// ============================================================================

/// Straight segment between two consecutive stops of a route
#[derive(Clone)]
pub struct RouteSegmentNode {
    pub route: Arc<Route>,
    pub segment: Line,
    aabb: AABB<[f64; 2]>,
}

impl RouteSegmentNode {
    pub fn new(segment: Line, route: Arc<Route>) -> Self {
        let start = [segment.start.x, segment.start.y];
        let end = [segment.end.x, segment.end.y];

        let aabb = AABB::from_corners(start, end);

        Self {
            route,
            segment,
            aabb,
        }
    }
}

impl RTreeObject for RouteSegmentNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

impl PointDistance for RouteSegmentNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        // Distance from point to line segment (squared Euclidean distance)
        let p = [point[0], point[1]];
        let a = [self.segment.start.x, self.segment.start.y];
        let b = [self.segment.end.x, self.segment.end.y];

        let ab = [b[0] - a[0], b[1] - a[1]];
        let ap = [p[0] - a[0], p[1] - a[1]];

        let ab_ab = ab[0] * ab[0] + ab[1] * ab[1];

        if ab_ab == 0.0 {
            // Segment is actually a point
            return ap[0] * ap[0] + ap[1] * ap[1];
        }

        let ab_ap = ab[0] * ap[0] + ab[1] * ap[1];
        let t = (ab_ap / ab_ab).clamp(0.0, 1.0);

        let closest = [a[0] + t * ab[0], a[1] + t * ab[1]];
        let dx = p[0] - closest[0];
        let dy = p[1] - closest[1];

        dx * dx + dy * dy
    }
}

// ============================================================================
// Proximity Index
// ============================================================================

/// A stop together with its great-circle distance from the query point
#[derive(Clone, Debug)]
pub struct NearbyStop {
    pub stop: Arc<Stop>,
    pub distance_km: f64,
}

/// A route together with the distance from the query point to its path
#[derive(Clone, Debug)]
pub struct NearbyRoute {
    pub route: Arc<Route>,
    pub distance_km: f64,
}

/// Spatial lookups over one network version
#[derive(Clone)]
pub struct ProximityIndex {
    stop_tree: RTree<StopNode>,
    route_tree: RTree<RouteSegmentNode>,
}

impl ProximityIndex {
    pub fn build(stops: &HashMap<StopId, Arc<Stop>>, routes: &[Arc<Route>]) -> Self {
        let stop_tree = RTree::bulk_load(stops.values().cloned().map(StopNode::new).collect());

        let mut route_segments = Vec::new();
        for route in routes {
            let coords: Vec<Coord> = route
                .stop_ids
                .iter()
                .filter_map(|id| stops.get(id))
                .map(|stop| stop.location.into())
                .collect();
            for pair in coords.windows(2) {
                route_segments.push(RouteSegmentNode::new(
                    Line::new(pair[0], pair[1]),
                    route.clone(),
                ));
            }
        }
        let route_tree = RTree::bulk_load(route_segments);

        Self {
            stop_tree,
            route_tree,
        }
    }

    /// Stops within `radius_km` of `point`, closest first
    pub fn nearby(&self, point: Point, radius_km: f64) -> Vec<NearbyStop> {
        if radius_km < 0.0 || !radius_km.is_finite() {
            return Vec::new();
        }

        let search = km_to_degrees_envelope(radius_km, point.y());
        let mut found: Vec<NearbyStop> = self
            .stop_tree
            .locate_within_distance([point.x(), point.y()], search * search)
            .filter_map(|node| {
                let distance_km = haversine_km(point, node.stop.location);
                (distance_km <= radius_km).then(|| NearbyStop {
                    stop: node.stop.clone(),
                    distance_km,
                })
            })
            .collect();

        found.sort_by(|a, b| {
            by_distance_then(a.distance_km, b.distance_km, || a.stop.id.cmp(&b.stop.id))
        });
        found
    }

    /// Distinct routes whose path passes within `radius_km` of `point`
    pub fn routes_near(&self, point: Point, radius_km: f64) -> Vec<NearbyRoute> {
        if radius_km < 0.0 || !radius_km.is_finite() {
            return Vec::new();
        }

        let search = km_to_degrees_envelope(radius_km, point.y());
        let mut best: HashMap<_, NearbyRoute> = HashMap::new();
        for node in self
            .route_tree
            .locate_within_distance([point.x(), point.y()], search * search)
        {
            let distance_km = haversine_km_to_line(point, node.segment);
            if distance_km > radius_km {
                continue;
            }
            best.entry(node.route.id.clone())
                .and_modify(|current| {
                    if distance_km < current.distance_km {
                        current.distance_km = distance_km;
                    }
                })
                .or_insert_with(|| NearbyRoute {
                    route: node.route.clone(),
                    distance_km,
                });
        }

        let mut found: Vec<NearbyRoute> = best.into_values().collect();
        found.sort_by(|a, b| {
            by_distance_then(a.distance_km, b.distance_km, || a.route.id.cmp(&b.route.id))
        });
        found
    }

    /// The `n` stops closest to `point`
    pub fn nearest(&self, point: Point, n: usize) -> Vec<NearbyStop> {
        // Degree-space order is only approximate, so over-fetch and re-rank
        let mut found: Vec<NearbyStop> = self
            .stop_tree
            .nearest_neighbor_iter(&[point.x(), point.y()])
            .take(n.saturating_mul(2).saturating_add(4))
            .map(|node| NearbyStop {
                stop: node.stop.clone(),
                distance_km: haversine_km(point, node.stop.location),
            })
            .collect();

        found.sort_by(|a, b| {
            by_distance_then(a.distance_km, b.distance_km, || a.stop.id.cmp(&b.stop.id))
        });
        found.truncate(n);
        found
    }

    pub fn len(&self) -> usize {
        self.stop_tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_tree.size() == 0
    }
}

fn by_distance_then(a: f64, b: f64, tie: impl FnOnce() -> Ordering) -> Ordering {
    a.total_cmp(&b).then_with(tie)
}
