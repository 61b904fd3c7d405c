use crate::domains::grid_world::GridPosition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageStatus {
    Pending,
    PickedUp,
    Delivered,
}

/// One pickup/delivery job. Ids are assigned in insertion order and double
/// as the deterministic tie-break when two pickups are equally near.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: u32,
    pub pickup: GridPosition,
    pub delivery: GridPosition,
    pub status: PackageStatus,
}

impl Package {
    pub fn new(id: u32, pickup: GridPosition, delivery: GridPosition) -> Self {
        Self {
            id,
            pickup,
            delivery,
            status: PackageStatus::Pending,
        }
    }
}
