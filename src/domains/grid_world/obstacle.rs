use super::types::GridPosition;
use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCell {
    pub position: GridPosition,
    pub time_step: u64,
}

/// A moving obstacle with a fully known schedule: at each listed time step it
/// occupies the listed cell, outside its schedule it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicObstacle {
    pub id: String,
    schedule: Vec<ScheduledCell>,
}

impl DynamicObstacle {
    pub fn new(id: impl Into<String>, schedule: Vec<ScheduledCell>) -> Self {
        Self {
            id: id.into(),
            schedule,
        }
    }

    /// Build from the parallel position/time lists of the map format.
    pub fn from_track(
        id: impl Into<String>,
        positions: Vec<GridPosition>,
        time_steps: Vec<u64>,
    ) -> DomainResult<Self> {
        let id = id.into();
        if positions.len() != time_steps.len() {
            return Err(DomainError::InvalidMap {
                reason: format!(
                    "dynamic obstacle {}: {} positions but {} time steps",
                    id,
                    positions.len(),
                    time_steps.len()
                ),
            });
        }
        let schedule = positions
            .into_iter()
            .zip(time_steps)
            .map(|(position, time_step)| ScheduledCell {
                position,
                time_step,
            })
            .collect();
        Ok(Self { id, schedule })
    }

    pub fn schedule(&self) -> &[ScheduledCell] {
        &self.schedule
    }

    pub fn position_at(&self, time_step: u64) -> Option<GridPosition> {
        self.schedule
            .iter()
            .find(|entry| entry.time_step == time_step)
            .map(|entry| entry.position)
    }

    pub fn occupies(&self, position: GridPosition, time_step: u64) -> bool {
        self.position_at(time_step) == Some(position)
    }

    pub fn last_scheduled_tick(&self) -> Option<u64> {
        self.schedule.iter().map(|entry| entry.time_step).max()
    }
}
