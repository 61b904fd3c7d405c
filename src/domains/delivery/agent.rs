use super::events::MissionEvent;
use super::package::{Package, PackageStatus};
use crate::domains::grid_world::{GridPosition, GridWorld};
use crate::domains::planning::{
    MissionMetrics, Path, PlanRequest, PlanningFailure, RoutePlanner, SearchProblem, WaitRule,
};
use crate::domains::replanning::AnnealingReplanner;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    Unreachable,
    FuelExhausted,
    ReplanFailed,
    StepLimitReached,
}

impl From<&PlanningFailure> for FailureReason {
    fn from(failure: &PlanningFailure) -> Self {
        match failure {
            PlanningFailure::Unreachable { .. } => FailureReason::Unreachable,
            PlanningFailure::FuelExhausted { .. } => FailureReason::FuelExhausted,
            PlanningFailure::ReplanFailed { .. } => FailureReason::ReplanFailed,
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FailureReason::Unreachable => "unreachable",
            FailureReason::FuelExhausted => "fuel exhausted",
            FailureReason::ReplanFailed => "replan failed",
            FailureReason::StepLimitReached => "step limit reached",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionFailure {
    pub package_id: Option<u32>,
    pub time_step: u64,
    pub reason: FailureReason,
}

/// The agent's control states. `Failed` and `Finished` are terminal;
/// everything else resolves within a tick except `Moving`, which executes
/// exactly one step of the committed path per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentState {
    Idle,
    Planning,
    Moving,
    PickingUp,
    Delivering,
    Replanning,
    Failed(MissionFailure),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum RouteLeg {
    ToPickup,
    ToDelivery,
}

#[derive(Debug, Clone)]
struct CommittedRoute {
    id: Uuid,
    package_id: u32,
    leg: RouteLeg,
    path: Path,
    cursor: usize,
}

/// State machine orchestrating pickups and deliveries: chooses packages,
/// requests plans, executes committed paths one step per tick, and hands
/// invalidated paths to the replanner. Package status transitions happen
/// here and nowhere else.
#[derive(Debug, Clone)]
pub struct DeliveryAgent {
    position: GridPosition,
    fuel: u32,
    time_step: u64,
    state: AgentState,
    packages: Vec<Package>,
    carrying: Option<u32>,
    route: Option<CommittedRoute>,
    wait: WaitRule,
}

impl DeliveryAgent {
    pub fn new(
        start: GridPosition,
        fuel_capacity: u32,
        packages: Vec<Package>,
        wait: WaitRule,
    ) -> Self {
        Self {
            position: start,
            fuel: fuel_capacity,
            time_step: 0,
            state: AgentState::Idle,
            packages,
            carrying: None,
            route: None,
            wait,
        }
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn fuel(&self) -> u32 {
        self.fuel
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, AgentState::Failed(_) | AgentState::Finished)
    }

    pub fn deliveries_completed(&self) -> u32 {
        self.packages
            .iter()
            .filter(|p| p.status == PackageStatus::Delivered)
            .count() as u32
    }

    pub fn deliveries_total(&self) -> u32 {
        self.packages.len() as u32
    }

    fn active_package(&self) -> Option<u32> {
        self.carrying.or(self.route.as_ref().map(|r| r.package_id))
    }

    /// Advance the mission by one tick. Instantaneous states (planning,
    /// replanning, pickup and delivery handling) resolve within the call; at
    /// most one movement step is executed per tick. Returns the events the
    /// tick produced, in order.
    pub fn tick<R: Rng>(
        &mut self,
        world: &GridWorld,
        planner: &dyn RoutePlanner,
        replanner: &AnnealingReplanner,
        rng: &mut R,
        metrics: &mut MissionMetrics,
    ) -> Vec<MissionEvent> {
        let problem = SearchProblem::new(world, self.wait);
        let mut events = Vec::new();
        let mut moved = false;
        loop {
            match self.state {
                AgentState::Failed(_) | AgentState::Finished => return events,
                AgentState::Idle => self.handle_idle(&mut events),
                AgentState::Planning => {
                    self.handle_planning(&problem, planner, metrics, &mut events)
                }
                AgentState::Moving => {
                    if moved {
                        return events;
                    }
                    self.handle_moving(&problem, metrics, &mut events, &mut moved);
                }
                AgentState::Replanning => {
                    self.handle_replanning(&problem, planner, replanner, rng, metrics, &mut events)
                }
                AgentState::PickingUp => self.handle_picking_up(&mut events),
                AgentState::Delivering => self.handle_delivering(&mut events),
            }
        }
    }

    /// Terminate the mission from the outside, used by the controller when
    /// the step backstop trips.
    pub fn abort(&mut self, reason: FailureReason) -> MissionEvent {
        let package_id = self.active_package();
        self.enter_failed(package_id, reason)
    }

    fn handle_idle(&mut self, events: &mut Vec<MissionEvent>) {
        if self.pending_packages().is_empty() {
            self.finish(events);
        } else {
            self.state = AgentState::Planning;
        }
    }

    /// Select and plan the next leg. For a carried package this is the
    /// delivery leg. Otherwise pending packages are tried nearest pickup
    /// first (ties by insertion order); a candidate only qualifies if its
    /// delivery leg would also fit in the fuel left after the pickup leg, so
    /// the agent never picks up a package it cannot deliver. The mission
    /// fails only when no pending package qualifies.
    fn handle_planning(
        &mut self,
        problem: &SearchProblem<'_>,
        planner: &dyn RoutePlanner,
        metrics: &mut MissionMetrics,
        events: &mut Vec<MissionEvent>,
    ) {
        if let Some(package_id) = self.carrying {
            let Some(package) = self.packages.iter().find(|p| p.id == package_id).copied() else {
                self.fail(Some(package_id), FailureReason::Unreachable, events);
                return;
            };
            let request =
                PlanRequest::new(self.position, package.delivery, self.time_step, self.fuel);
            match planner.plan(problem, &request, metrics) {
                Ok(path) => {
                    self.commit(RouteLeg::ToDelivery, package_id, path, planner.name(), events)
                }
                Err(failure) => self.fail(Some(package_id), (&failure).into(), events),
            }
            return;
        }

        let mut candidates = self.pending_packages();
        candidates.sort_by_key(|p| (self.position.manhattan_distance(p.pickup), p.id));
        if candidates.is_empty() {
            self.finish(events);
            return;
        }

        let mut first_failure: Option<(u32, PlanningFailure)> = None;
        for package in candidates {
            let pickup_request =
                PlanRequest::new(self.position, package.pickup, self.time_step, self.fuel);
            let pickup_path = match planner.plan(problem, &pickup_request, metrics) {
                Ok(path) => path,
                Err(failure) => {
                    first_failure.get_or_insert((package.id, failure));
                    continue;
                }
            };
            let Some(spent) = problem.path_fuel(pickup_path.states()) else {
                continue;
            };
            let arrival = pickup_path.goal().map(|s| s.time).unwrap_or(self.time_step);
            let delivery_request = PlanRequest::new(
                package.pickup,
                package.delivery,
                arrival,
                self.fuel.saturating_sub(spent),
            );
            match planner.plan(problem, &delivery_request, metrics) {
                Ok(_) => {
                    self.commit(RouteLeg::ToPickup, package.id, pickup_path, planner.name(), events);
                    return;
                }
                Err(failure) => {
                    first_failure.get_or_insert((package.id, failure));
                }
            }
        }

        match first_failure {
            Some((package_id, failure)) => {
                self.fail(Some(package_id), (&failure).into(), events)
            }
            None => self.fail(None, FailureReason::Unreachable, events),
        }
    }

    fn handle_moving(
        &mut self,
        problem: &SearchProblem<'_>,
        metrics: &mut MissionMetrics,
        events: &mut Vec<MissionEvent>,
        moved: &mut bool,
    ) {
        let Some(route) = self.route.as_ref() else {
            self.state = if self.carrying.is_some() {
                AgentState::Planning
            } else {
                AgentState::Idle
            };
            return;
        };
        let (route_id, package_id, leg, cursor) =
            (route.id, route.package_id, route.leg, route.cursor);
        let states = route.path.states();

        if cursor + 1 >= states.len() {
            self.arrive(leg);
            return;
        }
        let current = states[cursor];
        let next = states[cursor + 1];

        let Some(transition) = problem.edge(current, next.position).filter(|t| t.state == next)
        else {
            tracing::warn!(
                %next.position,
                time_step = next.time,
                "committed step is blocked, triggering replan"
            );
            events.push(MissionEvent::ReplanTriggered {
                route_id,
                blocked: next.position,
                time_step: self.time_step,
                timestamp: Utc::now(),
            });
            self.state = AgentState::Replanning;
            return;
        };

        if self.fuel < transition.fuel {
            self.fail(Some(package_id), FailureReason::FuelExhausted, events);
            return;
        }
        self.fuel -= transition.fuel;
        metrics.total_path_cost += u64::from(transition.cost);
        self.position = next.position;
        self.time_step = next.time;
        *moved = true;

        let arrived = {
            let Some(route) = self.route.as_mut() else {
                return;
            };
            route.cursor += 1;
            route.cursor + 1 >= route.path.len()
        };
        if arrived {
            self.arrive(leg);
        }
    }

    fn arrive(&mut self, leg: RouteLeg) {
        self.state = match leg {
            RouteLeg::ToPickup => AgentState::PickingUp,
            RouteLeg::ToDelivery => AgentState::Delivering,
        };
    }

    fn handle_replanning<R: Rng>(
        &mut self,
        problem: &SearchProblem<'_>,
        planner: &dyn RoutePlanner,
        replanner: &AnnealingReplanner,
        rng: &mut R,
        metrics: &mut MissionMetrics,
        events: &mut Vec<MissionEvent>,
    ) {
        metrics.replanning_events += 1;
        let Some(route) = self.route.take() else {
            self.state = AgentState::Planning;
            return;
        };
        match replanner.repair(
            problem,
            &route.path,
            route.cursor,
            self.fuel,
            rng,
            planner,
            metrics,
        ) {
            Ok(path) => {
                tracing::info!(
                    package_id = route.package_id,
                    cost = path.cost(),
                    "route repaired"
                );
                self.route = Some(CommittedRoute {
                    id: path.id(),
                    package_id: route.package_id,
                    leg: route.leg,
                    path,
                    cursor: 0,
                });
                self.state = AgentState::Moving;
            }
            Err(failure) => self.fail(Some(route.package_id), (&failure).into(), events),
        }
    }

    fn handle_picking_up(&mut self, events: &mut Vec<MissionEvent>) {
        let Some(route) = self.route.take() else {
            self.state = AgentState::Idle;
            return;
        };
        let package_id = route.package_id;
        if let Some(package) = self.packages.iter_mut().find(|p| p.id == package_id) {
            package.status = PackageStatus::PickedUp;
        }
        self.carrying = Some(package_id);
        tracing::info!(package_id, position = %self.position, "package picked up");
        events.push(MissionEvent::PackagePickedUp {
            package_id,
            position: self.position,
            time_step: self.time_step,
            timestamp: Utc::now(),
        });
        self.state = AgentState::Planning;
    }

    fn handle_delivering(&mut self, events: &mut Vec<MissionEvent>) {
        let Some(route) = self.route.take() else {
            self.state = AgentState::Idle;
            return;
        };
        let package_id = route.package_id;
        if let Some(package) = self.packages.iter_mut().find(|p| p.id == package_id) {
            package.status = PackageStatus::Delivered;
        }
        self.carrying = None;
        tracing::info!(package_id, position = %self.position, "package delivered");
        events.push(MissionEvent::PackageDelivered {
            package_id,
            position: self.position,
            time_step: self.time_step,
            timestamp: Utc::now(),
        });
        if self.pending_packages().is_empty() {
            self.finish(events);
        } else {
            self.state = AgentState::Idle;
        }
    }

    fn pending_packages(&self) -> Vec<Package> {
        self.packages
            .iter()
            .filter(|p| p.status == PackageStatus::Pending)
            .copied()
            .collect()
    }

    fn commit(
        &mut self,
        leg: RouteLeg,
        package_id: u32,
        path: Path,
        planner: &str,
        events: &mut Vec<MissionEvent>,
    ) {
        tracing::info!(package_id, cost = path.cost(), ?leg, "route committed");
        events.push(MissionEvent::RouteCommitted {
            route_id: path.id(),
            package_id,
            planner: planner.to_string(),
            cost: path.cost(),
            time_step: self.time_step,
            timestamp: Utc::now(),
        });
        self.route = Some(CommittedRoute {
            id: path.id(),
            package_id,
            leg,
            path,
            cursor: 0,
        });
        self.state = AgentState::Moving;
    }

    fn finish(&mut self, events: &mut Vec<MissionEvent>) {
        tracing::info!(
            deliveries = self.deliveries_completed(),
            time_step = self.time_step,
            "mission finished"
        );
        events.push(MissionEvent::MissionCompleted {
            deliveries: self.deliveries_completed(),
            time_step: self.time_step,
            timestamp: Utc::now(),
        });
        self.state = AgentState::Finished;
    }

    fn fail(
        &mut self,
        package_id: Option<u32>,
        reason: FailureReason,
        events: &mut Vec<MissionEvent>,
    ) {
        events.push(self.enter_failed(package_id, reason));
    }

    fn enter_failed(&mut self, package_id: Option<u32>, reason: FailureReason) -> MissionEvent {
        tracing::warn!(?package_id, %reason, time_step = self.time_step, "mission failed");
        let failure = MissionFailure {
            package_id,
            time_step: self.time_step,
            reason,
        };
        self.state = AgentState::Failed(failure);
        MissionEvent::MissionFailed {
            package_id,
            reason,
            time_step: self.time_step,
            timestamp: Utc::now(),
        }
    }
}
