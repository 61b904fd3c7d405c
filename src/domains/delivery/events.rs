use super::agent::FailureReason;
use crate::common::DomainEvent;
use crate::domains::grid_world::GridPosition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MissionEvent {
    RouteCommitted {
        route_id: Uuid,
        package_id: u32,
        planner: String,
        cost: u32,
        time_step: u64,
        timestamp: DateTime<Utc>,
    },
    PackagePickedUp {
        package_id: u32,
        position: GridPosition,
        time_step: u64,
        timestamp: DateTime<Utc>,
    },
    PackageDelivered {
        package_id: u32,
        position: GridPosition,
        time_step: u64,
        timestamp: DateTime<Utc>,
    },
    ReplanTriggered {
        route_id: Uuid,
        blocked: GridPosition,
        time_step: u64,
        timestamp: DateTime<Utc>,
    },
    MissionCompleted {
        deliveries: u32,
        time_step: u64,
        timestamp: DateTime<Utc>,
    },
    MissionFailed {
        package_id: Option<u32>,
        reason: FailureReason,
        time_step: u64,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for MissionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MissionEvent::RouteCommitted { .. } => "RouteCommitted",
            MissionEvent::PackagePickedUp { .. } => "PackagePickedUp",
            MissionEvent::PackageDelivered { .. } => "PackageDelivered",
            MissionEvent::ReplanTriggered { .. } => "ReplanTriggered",
            MissionEvent::MissionCompleted { .. } => "MissionCompleted",
            MissionEvent::MissionFailed { .. } => "MissionFailed",
        }
    }

    fn time_step(&self) -> u64 {
        match self {
            MissionEvent::RouteCommitted { time_step, .. } => *time_step,
            MissionEvent::PackagePickedUp { time_step, .. } => *time_step,
            MissionEvent::PackageDelivered { time_step, .. } => *time_step,
            MissionEvent::ReplanTriggered { time_step, .. } => *time_step,
            MissionEvent::MissionCompleted { time_step, .. } => *time_step,
            MissionEvent::MissionFailed { time_step, .. } => *time_step,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MissionEvent::RouteCommitted { timestamp, .. } => *timestamp,
            MissionEvent::PackagePickedUp { timestamp, .. } => *timestamp,
            MissionEvent::PackageDelivered { timestamp, .. } => *timestamp,
            MissionEvent::ReplanTriggered { timestamp, .. } => *timestamp,
            MissionEvent::MissionCompleted { timestamp, .. } => *timestamp,
            MissionEvent::MissionFailed { timestamp, .. } => *timestamp,
        }
    }
}
