//! Candidate generation, segment assembly, filtering, and ranking.
//!
//! A candidate boards at a stop near the origin and alights at a stop near
//! the destination on the same route, boarding strictly before alighting.
//! Two-leg candidates change routes once at a shared intermediate stop.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use geo::Point;
use tracing::debug;

use crate::arrivals::ArrivalEstimator;
use crate::crowding::CrowdingLevel;
use crate::identifiers::{StopId, VehicleId};
use crate::models::types::{Facility, Result, Route, Stop};
use crate::network::Network;
use crate::planner::request::{
    Optimize, Place, PlanBudget, PlannerConfig, Preferences, TripRequest,
};
use crate::planner::trip::{Segment, TripOption, TripPlan};
use crate::simulation::FleetSnapshot;
use crate::spatial::queries::haversine_km;

/// Floating point slack when comparing walking distances
const WALK_EPSILON_M: f64 = 1e-6;

/// A stop reachable on foot from the origin or destination
struct Access {
    stop: Arc<Stop>,
    walk_km: f64,
}

struct Leg {
    route: Arc<Route>,
    board_index: usize,
    alight_index: usize,
}

struct Candidate {
    boarding: usize,
    alighting: usize,
    legs: Vec<Leg>,
}

/// Composes trips against one network version and one fleet snapshot
pub struct TripPlanner<'a> {
    network: &'a Network,
    fleet: &'a FleetSnapshot,
    estimator: ArrivalEstimator,
    config: &'a PlannerConfig,
}

impl<'a> TripPlanner<'a> {
    pub fn new(
        network: &'a Network,
        fleet: &'a FleetSnapshot,
        estimator: ArrivalEstimator,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            network,
            fleet,
            estimator,
            config,
        }
    }

    /// Ranked trip options; an empty plan means no route was found
    pub fn plan(&self, request: &TripRequest, budget: &PlanBudget) -> Result<TripPlan> {
        let (origin, origin_stop) = self.resolve(&request.origin)?;
        let (destination, destination_stop) = self.resolve(&request.destination)?;
        let prefs = &request.preferences;
        let max_walk_km = prefs.max_walk_meters / 1000.0;

        let boarding = self.access_stops(origin, origin_stop, max_walk_km, prefs);
        let alighting = self.access_stops(destination, destination_stop, max_walk_km, prefs);

        let mut options: Vec<TripOption> = self
            .walk_only(origin, destination, prefs)
            .into_iter()
            .collect();

        let (candidates, mut timed_out) = self.enumerate(&boarding, &alighting, request, budget);
        let candidate_count = candidates.len();
        for candidate in &candidates {
            if budget.is_exhausted() {
                timed_out = true;
                break;
            }
            let board = &boarding[candidate.boarding];
            let alight = &alighting[candidate.alighting];
            let legs = &candidate.legs;
            if let Some(option) = self.compose(origin, destination, board, alight, legs, prefs) {
                options.push(option);
            }
        }

        score(&mut options, self.config);
        rank(&mut options, prefs.optimize);
        let mut seen = HashSet::new();
        options.retain(|o| seen.insert(o.key.clone()));
        options.truncate(self.config.max_results);

        debug!(
            candidates = candidate_count,
            options = options.len(),
            timed_out,
            "trip planned"
        );
        Ok(TripPlan { options, timed_out })
    }

    fn resolve(&self, place: &Place) -> Result<(Point, Option<Arc<Stop>>)> {
        match place {
            Place::Coordinate(point) => Ok((*point, None)),
            Place::Stop(id) => {
                let stop = self.network.stop(id)?;
                Ok((stop.location, Some(stop.clone())))
            }
        }
    }

    fn access_stops(
        &self,
        point: Point,
        fixed: Option<Arc<Stop>>,
        max_walk_km: f64,
        prefs: &Preferences,
    ) -> Vec<Access> {
        let mut found: Vec<Access> = self
            .network
            .nearby(point, max_walk_km)
            .into_iter()
            .map(|n| Access {
                stop: n.stop,
                walk_km: n.distance_km,
            })
            .collect();

        if let Some(stop) = fixed {
            if !found.iter().any(|a| a.stop.id == stop.id) {
                found.insert(0, Access { stop, walk_km: 0.0 });
            }
        }
        if prefs.accessibility_required {
            found.retain(|a| a.stop.has_facility(Facility::WheelchairAccess));
        }
        found
    }

    fn enumerate(
        &self,
        boarding: &[Access],
        alighting: &[Access],
        request: &TripRequest,
        budget: &PlanBudget,
    ) -> (Vec<Candidate>, bool) {
        let alight_at: HashMap<&StopId, usize> = alighting
            .iter()
            .enumerate()
            .map(|(i, a)| (&a.stop.id, i))
            .collect();
        let mut candidates = Vec::new();

        for (bi, board) in boarding.iter().enumerate() {
            let Ok(routes) = self.network.routes_serving(&board.stop.id) else {
                continue;
            };
            for first in routes.iter().filter(|r| usable(r, request)) {
                // A loop may pass the boarding stop more than once
                for board_index in first.indices_of(&board.stop.id) {
                    let later = first.stop_ids.iter().enumerate().skip(board_index + 1);
                    for (transfer_index, stop_id) in later {
                        if budget.is_exhausted() {
                            return (candidates, true);
                        }
                        let first_leg = || Leg {
                            route: first.clone(),
                            board_index,
                            alight_index: transfer_index,
                        };
                        if let Some(&ai) = alight_at.get(stop_id) {
                            candidates.push(Candidate {
                                boarding: bi,
                                alighting: ai,
                                legs: vec![first_leg()],
                            });
                        }

                        let onward = self.connections(first, stop_id, &alight_at, request);
                        for (second_leg, ai) in onward {
                            candidates.push(Candidate {
                                boarding: bi,
                                alighting: ai,
                                legs: vec![first_leg(), second_leg],
                            });
                        }
                    }
                }
            }
        }
        (candidates, false)
    }

    /// Onward legs from `stop_id` on other routes that end at an alighting stop
    fn connections(
        &self,
        first: &Route,
        stop_id: &StopId,
        alight_at: &HashMap<&StopId, usize>,
        request: &TripRequest,
    ) -> Vec<(Leg, usize)> {
        let Ok(connecting) = self.network.routes_serving(stop_id) else {
            return Vec::new();
        };
        let mut legs = Vec::new();
        for second in connecting
            .iter()
            .filter(|r| r.id != first.id && usable(r, request))
        {
            for board_index in second.indices_of(stop_id) {
                let later = second.stop_ids.iter().enumerate().skip(board_index + 1);
                for (alight_index, end) in later {
                    if let Some(&ai) = alight_at.get(end) {
                        let leg = Leg {
                            route: second.clone(),
                            board_index,
                            alight_index,
                        };
                        legs.push((leg, ai));
                    }
                }
            }
        }
        legs
    }

    fn compose(
        &self,
        origin: Point,
        destination: Point,
        board: &Access,
        alight: &Access,
        legs: &[Leg],
        prefs: &Preferences,
    ) -> Option<TripOption> {
        let walking_meters = (board.walk_km + alight.walk_km) * 1000.0;
        if walking_meters > prefs.max_walk_meters + WALK_EPSILON_M {
            return None;
        }

        let mut segments = Vec::with_capacity(legs.len() * 2 + 2);
        let mut elapsed = 0.0;
        let mut fare = 0.0;
        let mut ride_km = 0.0;
        let mut comfort_penalty = 0;
        let mut key = board.stop.id.to_string();

        if board.walk_km > 0.0 {
            let walk = self.walk(origin, board.stop.location, board.walk_km);
            elapsed += walk.minutes();
            segments.push(walk);
        }

        for leg in legs {
            let from_stop = &leg.route.stop_ids[leg.board_index];
            let to_stop = &leg.route.stop_ids[leg.alight_index];
            if prefs.accessibility_required && !self.step_free(from_stop, to_stop) {
                return None;
            }

            let (wait, vehicle_id, crowding) = self.first_departure(from_stop, &leg.route, elapsed);
            if prefs.avoid_crowded && crowding == Some(CrowdingLevel::Full) {
                return None;
            }
            segments.push(Segment::Wait {
                stop_id: from_stop.clone(),
                minutes: wait,
                vehicle_id,
            });
            elapsed += wait;

            let hops = leg.alight_index - leg.board_index;
            let minutes = hops as f64 * f64::from(self.estimator.minutes_per_hop);
            let distance_km = self
                .network
                .segment_km(&leg.route.id, leg.board_index, hops)
                .ok()?;
            segments.push(Segment::Ride {
                route_id: leg.route.id.clone(),
                from_stop: from_stop.clone(),
                to_stop: to_stop.clone(),
                hops,
                minutes,
                fare: leg.route.fare,
                distance_km,
                crowding,
            });
            elapsed += minutes;
            fare += leg.route.fare;
            ride_km += distance_km;
            comfort_penalty += crowding.map_or(1, CrowdingLevel::comfort_penalty);
            key.push_str(&format!(">{}>{}", leg.route.id, to_stop));
        }

        if alight.walk_km > 0.0 {
            let walk = self.walk(alight.stop.location, destination, alight.walk_km);
            elapsed += walk.minutes();
            segments.push(walk);
        }

        let transfers = legs.len().saturating_sub(1);
        let walk_km = walking_meters / 1000.0;
        let saved_per_km = self.config.car_emission_factor - self.config.bus_emission_factor;
        Some(TripOption {
            segments,
            total_minutes: elapsed,
            total_fare: fare,
            walking_meters,
            transfers,
            score: 0.0,
            co2_saved_kg: ride_km * saved_per_km + walk_km * self.config.car_emission_factor,
            comfort_penalty: comfort_penalty + transfers as u32,
            key,
        })
    }

    /// Walking the whole way, when it fits the walking limit
    fn walk_only(
        &self,
        origin: Point,
        destination: Point,
        prefs: &Preferences,
    ) -> Option<TripOption> {
        let km = haversine_km(origin, destination);
        let meters = km * 1000.0;
        if meters > prefs.max_walk_meters + WALK_EPSILON_M {
            return None;
        }
        let walk = self.walk(origin, destination, km);
        Some(TripOption {
            total_minutes: walk.minutes(),
            segments: vec![walk],
            total_fare: 0.0,
            walking_meters: meters,
            transfers: 0,
            score: 0.0,
            co2_saved_kg: km * self.config.car_emission_factor,
            comfort_penalty: 0,
            key: "walk".to_string(),
        })
    }

    fn walk(&self, from: Point, to: Point, km: f64) -> Segment {
        let speed = self.config.walking_speed_kmh.max(0.1);
        Segment::Walk {
            from,
            to,
            meters: km * 1000.0,
            minutes: km / speed * 60.0,
        }
    }

    fn step_free(&self, from: &StopId, to: &StopId) -> bool {
        [from, to].into_iter().all(|id| {
            self.network
                .stop(id)
                .is_ok_and(|s| s.has_facility(Facility::WheelchairAccess))
        })
    }

    /// First bus on `route` reaching `stop` no earlier than `elapsed` minutes from now.
    /// Falls back to the timetable headway when no such bus is known.
    fn first_departure(
        &self,
        stop: &StopId,
        route: &Route,
        elapsed: f64,
    ) -> (f64, Option<VehicleId>, Option<CrowdingLevel>) {
        self.estimator
            .arrivals_for_route(self.network, self.fleet, stop, &route.id)
            .unwrap_or_default()
            .into_iter()
            .find(|a| f64::from(a.eta_minutes) >= elapsed)
            .map(|a| {
                (
                    f64::from(a.eta_minutes) - elapsed,
                    Some(a.vehicle_id),
                    Some(a.crowding),
                )
            })
            .unwrap_or((f64::from(route.schedule.headway_minutes), None, None))
    }
}

fn usable(route: &Route, request: &TripRequest) -> bool {
    route.is_active()
        && request
            .departure_time
            .map_or(true, |time| route.is_operating_at(time))
}

/// Composite score: weighted, normalised time, fare, and comfort penalties
fn score(options: &mut [TripOption], config: &PlannerConfig) {
    let effective_minutes =
        |o: &TripOption| o.total_minutes + o.transfers as f64 * config.transfer_penalty_minutes;
    let max_minutes = options.iter().map(effective_minutes).fold(0.0, f64::max);
    let max_fare = options.iter().map(|o| o.total_fare).fold(0.0, f64::max);
    let max_comfort = options.iter().map(|o| o.comfort_penalty).max().unwrap_or(0) as f64;

    let weights = config.time_weight + config.cost_weight + config.comfort_weight;
    let weights = if weights > 0.0 { weights } else { 1.0 };

    for option in options.iter_mut() {
        let penalty = config.time_weight * ratio(effective_minutes(&*option), max_minutes)
            + config.cost_weight * ratio(option.total_fare, max_fare)
            + config.comfort_weight * ratio(option.comfort_penalty as f64, max_comfort);
        option.score = (1.0 - penalty / weights).clamp(0.0, 1.0);
    }
}

fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

fn rank(options: &mut [TripOption], optimize: Optimize) {
    options.sort_by(|a, b| {
        primary(a, b, optimize)
            .then_with(|| a.total_minutes.total_cmp(&b.total_minutes))
            .then_with(|| a.total_fare.total_cmp(&b.total_fare))
            .then_with(|| a.key.cmp(&b.key))
    });
}

fn primary(a: &TripOption, b: &TripOption, optimize: Optimize) -> Ordering {
    match optimize {
        Optimize::Time => a.total_minutes.total_cmp(&b.total_minutes),
        Optimize::Cost => a.total_fare.total_cmp(&b.total_fare),
        Optimize::Comfort => a.comfort_penalty.cmp(&b.comfort_penalty),
        Optimize::Environment => b.co2_saved_kg.total_cmp(&a.co2_saved_kg),
        Optimize::Balanced => b.score.total_cmp(&a.score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::RouteId;
    use crate::simulation::{SimulationConfig, Simulator, Vehicle, VehicleStatus};
    use crate::testing::fixtures::*;
    use approx::assert_relative_eq;
    use chrono::NaiveTime;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn bus(id: &str, route: &str, next: usize, delay: i32, passengers: u32) -> Vehicle {
        Vehicle {
            id: VehicleId::new(id),
            route_id: RouteId::new(route),
            location: Point::new(38.75, 9.02),
            next_stop_index: next,
            passengers,
            capacity: 60,
            speed_kmh: 25.0,
            heading: 0.0,
            delay_minutes: delay,
            last_updated: noon(),
            status: VehicleStatus::InService,
        }
    }

    fn stop(id: &str) -> Place {
        Place::Stop(StopId::new(id))
    }

    fn plan(
        network: &Network,
        fleet: &FleetSnapshot,
        request: &TripRequest,
    ) -> Result<TripPlan> {
        let config = PlannerConfig::default();
        TripPlanner::new(network, fleet, ArrivalEstimator::default(), &config)
            .plan(request, &PlanBudget::unlimited())
    }

    #[test]
    fn test_direct_trip() {
        let network = addis_network();
        let fleet = FleetSnapshot::new(1, 1, noon(), vec![bus("b1", "route-01", 0, 0, 30)]);
        let request = TripRequest::new(stop("meskel-square"), stop("bole-airport"));

        let plan = plan(&network, &fleet, &request).unwrap();
        assert!(!plan.timed_out);
        assert_eq!(plan.options.len(), 1);

        let option = &plan.options[0];
        assert_eq!(option.route_ids(), vec![&RouteId::new("route-01")]);
        assert_eq!(option.transfers, 0);
        assert_eq!(option.walking_meters, 0.0);
        assert_relative_eq!(option.total_minutes, 12.0); // 4 min wait + 4 hops x 2 min
        assert_relative_eq!(option.total_fare, 5.0);
        assert!(option.co2_saved_kg > 0.0);

        match &option.segments[0] {
            Segment::Wait {
                minutes,
                vehicle_id,
                ..
            } => {
                assert_relative_eq!(*minutes, 4.0);
                assert_eq!(vehicle_id.as_ref().map(|v| v.as_str()), Some("b1"));
            }
            other => panic!("expected a wait, got {other:?}"),
        }
        assert_eq!(option.worst_crowding(), Some(CrowdingLevel::Moderate));
    }

    #[test]
    fn test_transfer_trip() {
        let network = addis_network();
        let fleet = FleetSnapshot::new(
            1,
            1,
            noon(),
            vec![
                bus("b2", "route-02", 0, 0, 10),
                // reaches Lancha in 2 hops x 2 min + 5 min delay = 9 min
                bus("b3", "route-03", 1, 5, 10),
            ],
        );
        let request = TripRequest::new(stop("mexico"), stop("saris"));

        let plan = plan(&network, &fleet, &request).unwrap();
        assert_eq!(plan.options.len(), 1);

        let option = &plan.options[0];
        assert_eq!(
            option.route_ids(),
            vec![&RouteId::new("route-02"), &RouteId::new("route-03")]
        );
        assert_eq!(option.transfers, 1);
        // 0 wait + 6 ride + 3 wait at Lancha + 4 ride
        assert_relative_eq!(option.total_minutes, 13.0);
        assert_relative_eq!(option.total_fare, 7.0);
    }

    #[test]
    fn test_schedule_fallback_without_bus() {
        let network = addis_network();
        let fleet = FleetSnapshot::empty();
        let request = TripRequest::new(stop("meskel-square"), stop("bole-airport"));

        let plan = plan(&network, &fleet, &request).unwrap();
        let option = &plan.options[0];
        match &option.segments[0] {
            Segment::Wait {
                minutes,
                vehicle_id,
                ..
            } => {
                assert_relative_eq!(*minutes, 10.0); // route-01 headway
                assert!(vehicle_id.is_none());
            }
            other => panic!("expected a wait, got {other:?}"),
        }
        assert_eq!(option.worst_crowding(), None);
    }

    #[test]
    fn test_accessibility_drops_inaccessible_transfer() {
        let network = addis_network();
        let fleet = FleetSnapshot::empty();
        let request = TripRequest::new(stop("mexico"), stop("saris")).with_preferences(Preferences {
            accessibility_required: true,
            ..Preferences::default()
        });

        // Lancha has no step-free access
        let plan = plan(&network, &fleet, &request).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_avoid_crowded() {
        let network = addis_network();
        let fleet = FleetSnapshot::new(1, 1, noon(), vec![bus("b1", "route-01", 0, 0, 58)]);
        let request = TripRequest::new(stop("meskel-square"), stop("bole-airport"));

        let plain = plan(&network, &fleet, &request).unwrap();
        assert_eq!(plain.options[0].worst_crowding(), Some(CrowdingLevel::Full));

        let picky = request.with_preferences(Preferences {
            avoid_crowded: true,
            ..Preferences::default()
        });
        assert!(plan(&network, &fleet, &picky).unwrap().is_empty());
    }

    #[test]
    fn test_walk_limit_excludes_far_stop() {
        let network = addis_network();
        let fleet = FleetSnapshot::empty();
        // 900 m due north of Piassa
        let origin = Place::Coordinate(Point::new(38.7469, 9.037 + 0.9 / 111.194_93));

        let strict = TripRequest::new(origin.clone(), stop("bole-airport"));
        let plan_strict = plan(&network, &fleet, &strict).unwrap();
        assert!(plan_strict
            .options
            .iter()
            .all(|o| o.boarding_stop() != Some(&StopId::new("piassa"))));
        assert!(plan_strict.is_empty());

        let relaxed = TripRequest::new(origin, stop("bole-airport")).with_preferences(Preferences {
            max_walk_meters: 1000.0,
            ..Preferences::default()
        });
        let plan_relaxed = plan(&network, &fleet, &relaxed).unwrap();
        let option = &plan_relaxed.options[0];
        assert_eq!(option.boarding_stop(), Some(&StopId::new("piassa")));
        assert_relative_eq!(option.walking_meters, 900.0, epsilon = 0.5);
    }

    #[test]
    fn test_walk_only_option() {
        let network = addis_network();
        let fleet = FleetSnapshot::empty();
        let request = TripRequest::new(stop("meskel-square"), stop("stadium")).with_preferences(
            Preferences {
                max_walk_meters: 1000.0,
                ..Preferences::default()
            },
        );

        let plan = plan(&network, &fleet, &request).unwrap();
        assert_eq!(plan.options.len(), 1);
        let option = &plan.options[0];
        assert!(option.is_walk_only());
        assert_eq!(option.total_fare, 0.0);
        assert!(option.total_minutes > 10.0 && option.total_minutes < 11.0);
    }

    #[test]
    fn test_departure_outside_service_window() {
        let network = addis_network();
        let fleet = FleetSnapshot::empty();
        let mut request = TripRequest::new(stop("meskel-square"), stop("bole-airport"));
        request.departure_time = NaiveTime::from_hms_opt(23, 30, 0);

        assert!(plan(&network, &fleet, &request).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_stop_is_an_error() {
        let network = addis_network();
        let request = TripRequest::new(stop("atlantis"), stop("bole-airport"));
        let err = plan(&network, &FleetSnapshot::empty(), &request).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_exhausted_budget_returns_partial_plan() {
        let network = addis_network();
        let fleet = FleetSnapshot::empty();
        let config = PlannerConfig::default();
        let planner = TripPlanner::new(&network, &fleet, ArrivalEstimator::default(), &config);
        let request = TripRequest::new(stop("meskel-square"), stop("bole-airport"));

        let plan = planner
            .plan(&request, &PlanBudget::with_timeout(Duration::ZERO))
            .unwrap();
        assert!(plan.timed_out);

        let flag = Arc::new(AtomicBool::new(true));
        let plan = planner
            .plan(&request, &PlanBudget::unlimited().with_cancel_flag(flag))
            .unwrap();
        assert!(plan.timed_out);
    }

    #[test]
    fn test_rankings_follow_preference() {
        let network = addis_network();
        let rng = ChaCha8Rng::seed_from_u64(11);
        let mut sim = Simulator::with_rng(SimulationConfig::default(), rng);
        sim.initialize(&network, noon());
        for _ in 0..12 {
            sim.tick_at(&network, noon());
        }
        let fleet = sim.handle().snapshot();
        let config = PlannerConfig {
            max_results: 50,
            ..PlannerConfig::default()
        };
        let planner = TripPlanner::new(&network, &fleet, ArrivalEstimator::default(), &config);
        // Between Meskel Square and Stadium, with a generous walking limit
        let origin = Place::Coordinate(Point::new(38.7597, 9.0113));

        for optimize in [
            Optimize::Time,
            Optimize::Cost,
            Optimize::Comfort,
            Optimize::Environment,
            Optimize::Balanced,
        ] {
            let request = TripRequest::new(origin.clone(), stop("bole-airport")).with_preferences(
                Preferences {
                    optimize,
                    max_walk_meters: 2000.0,
                    ..Preferences::default()
                },
            );
            let plan = planner.plan(&request, &PlanBudget::unlimited()).unwrap();
            assert!(plan.options.len() > 1, "{optimize:?} found too little");
            assert!(plan.options.iter().all(|o| (0.0..=1.0).contains(&o.score)));
            assert!(plan.options.iter().all(|o| o.walking_meters <= 2000.0 + 1e-6));

            let ordered = plan.options.windows(2).all(|w| match optimize {
                Optimize::Time => w[0].total_minutes <= w[1].total_minutes,
                Optimize::Cost => w[0].total_fare <= w[1].total_fare,
                Optimize::Comfort => w[0].comfort_penalty <= w[1].comfort_penalty,
                Optimize::Environment => w[0].co2_saved_kg >= w[1].co2_saved_kg,
                Optimize::Balanced => w[0].score >= w[1].score,
            });
            assert!(ordered, "{optimize:?} ordering violated");

            let again = planner.plan(&request, &PlanBudget::unlimited()).unwrap();
            assert_eq!(plan, again);
        }
    }

    #[test]
    fn test_max_results_truncates() {
        let network = addis_network();
        let fleet = FleetSnapshot::empty();
        let config = PlannerConfig {
            max_results: 1,
            ..PlannerConfig::default()
        };
        let origin = Place::Coordinate(Point::new(38.7597, 9.0113));
        let request = TripRequest::new(origin, stop("bole-airport")).with_preferences(Preferences {
            max_walk_meters: 2000.0,
            ..Preferences::default()
        });

        let plan = TripPlanner::new(&network, &fleet, ArrivalEstimator::default(), &config)
            .plan(&request, &PlanBudget::unlimited())
            .unwrap();
        assert_eq!(plan.options.len(), 1);
    }

    #[test]
    fn test_repeated_stop_boards_at_nearest_visit() {
        let mut definition = addis_definition();
        let looped = definition
            .routes
            .iter_mut()
            .find(|r| r.id == RouteId::new("route-03"))
            .unwrap();
        looped.stops = ["lancha", "gotera", "lancha", "saris"]
            .into_iter()
            .map(StopId::new)
            .collect();
        let network = Network::build(definition, 1).unwrap();
        let request = TripRequest::new(stop("lancha"), stop("saris")).with_preferences(Preferences {
            optimize: Optimize::Time,
            ..Preferences::default()
        });

        let plan = plan(&network, &FleetSnapshot::empty(), &request).unwrap();
        assert_eq!(plan.options.len(), 1);
        let hops: Vec<usize> = plan.options[0]
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Ride { hops, .. } => Some(*hops),
                _ => None,
            })
            .collect();
        // Boarding at the second visit skips the detour through Gotera
        assert_eq!(hops, vec![1]);
    }
}
