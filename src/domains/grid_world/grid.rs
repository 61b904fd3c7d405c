use super::obstacle::DynamicObstacle;
use super::types::{Cell, GridPosition};
use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// The grid city: terrain costs, static obstacles and the dynamic obstacle
/// schedules. Read-only for the whole mission; planners and the agent only
/// ever query it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridWorld {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    obstacles: Vec<DynamicObstacle>,
    min_terrain_cost: u32,
    dynamic_horizon: u64,
}

impl GridWorld {
    /// Validates the map once at build time. Terrain costs below 1 and
    /// obstacle schedules pointing off the grid are construction errors,
    /// nothing downstream re-checks them.
    pub fn new(
        width: u32,
        height: u32,
        cells: Vec<Cell>,
        obstacles: Vec<DynamicObstacle>,
    ) -> DomainResult<Self> {
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidMap {
                reason: format!("grid dimensions must be positive, got {}x{}", width, height),
            });
        }
        let expected = (width as usize) * (height as usize);
        if cells.len() != expected {
            return Err(DomainError::InvalidMap {
                reason: format!(
                    "expected {} cells for a {}x{} grid, got {}",
                    expected,
                    width,
                    height,
                    cells.len()
                ),
            });
        }
        if let Some(cell) = cells.iter().find(|c| c.terrain_cost < 1) {
            return Err(DomainError::InvalidMap {
                reason: format!("terrain cost {} is below 1", cell.terrain_cost),
            });
        }
        for obstacle in &obstacles {
            for entry in obstacle.schedule() {
                let p = entry.position;
                if p.x < 0 || p.y < 0 || p.x >= width as i32 || p.y >= height as i32 {
                    return Err(DomainError::InvalidMap {
                        reason: format!(
                            "dynamic obstacle {} scheduled outside the grid at {}",
                            obstacle.id, p
                        ),
                    });
                }
            }
        }

        let min_terrain_cost = cells
            .iter()
            .filter(|c| !c.blocked)
            .map(|c| c.terrain_cost)
            .min()
            .unwrap_or(1);
        let dynamic_horizon = obstacles
            .iter()
            .filter_map(|o| o.last_scheduled_tick())
            .max()
            .map(|t| t + 1)
            .unwrap_or(0);

        tracing::debug!(width, height, obstacles = obstacles.len(), "grid world built");

        Ok(Self {
            width,
            height,
            cells,
            obstacles,
            min_terrain_cost,
            dynamic_horizon,
        })
    }

    /// Convenience constructor for an open grid with uniform terrain cost.
    pub fn uniform(width: u32, height: u32, terrain_cost: u32) -> DomainResult<Self> {
        let cells = vec![Cell::open(terrain_cost); (width as usize) * (height as usize)];
        Self::new(width, height, cells, Vec::new())
    }

    /// Build from row-major terrain cost rows plus static obstacle positions,
    /// the shape the map loader produces.
    pub fn from_rows(
        rows: Vec<Vec<u32>>,
        blocked: &[GridPosition],
        obstacles: Vec<DynamicObstacle>,
    ) -> DomainResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        if rows.iter().any(|r| r.len() as u32 != width) {
            return Err(DomainError::InvalidMap {
                reason: "terrain rows have unequal lengths".to_string(),
            });
        }
        let mut cells: Vec<Cell> = rows
            .into_iter()
            .flatten()
            .map(Cell::open)
            .collect();
        for p in blocked {
            if p.x < 0 || p.y < 0 || p.x >= width as i32 || p.y >= height as i32 {
                return Err(DomainError::InvalidMap {
                    reason: format!("static obstacle outside the grid at {}", p),
                });
            }
            cells[(p.y as usize) * (width as usize) + p.x as usize].blocked = true;
        }
        Self::new(width, height, cells, obstacles)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, position: GridPosition) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    fn cell(&self, position: GridPosition) -> Option<&Cell> {
        if !self.in_bounds(position) {
            return None;
        }
        let index = (position.y as usize) * (self.width as usize) + position.x as usize;
        self.cells.get(index)
    }

    fn out_of_bounds(&self, position: GridPosition) -> DomainError {
        DomainError::OutOfBounds {
            x: position.x,
            y: position.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Terrain cost of a cell. Requesting a position outside the grid is a
    /// malformed query and fails.
    pub fn cost_of(&self, position: GridPosition) -> DomainResult<u32> {
        self.cell(position)
            .map(|c| c.terrain_cost)
            .ok_or_else(|| self.out_of_bounds(position))
    }

    /// Whether a cell is occupied at the given time step, by a static
    /// obstacle or by a dynamic obstacle's scheduled position.
    pub fn is_blocked(&self, position: GridPosition, time_step: u64) -> DomainResult<bool> {
        let cell = self.cell(position).ok_or_else(|| self.out_of_bounds(position))?;
        if cell.blocked {
            return Ok(true);
        }
        Ok(self
            .obstacles
            .iter()
            .any(|o| o.occupies(position, time_step)))
    }

    /// Terrain cost of a cell if it is inside the grid and free at the given
    /// time step, `None` otherwise. This is the query the search expansion
    /// uses; the fallible `cost_of`/`is_blocked` pair remains the checked
    /// surface for callers that must distinguish `OutOfBounds`.
    pub fn passable_cost(&self, position: GridPosition, time_step: u64) -> Option<u32> {
        let cell = self.cell(position)?;
        if cell.blocked {
            return None;
        }
        if self.obstacles.iter().any(|o| o.occupies(position, time_step)) {
            return None;
        }
        Some(cell.terrain_cost)
    }

    /// Terrain cost of a cell if it is inside the grid and not a static
    /// obstacle, regardless of the dynamic schedule.
    pub fn static_cost(&self, position: GridPosition) -> Option<u32> {
        let cell = self.cell(position)?;
        if cell.blocked {
            return None;
        }
        Some(cell.terrain_cost)
    }

    /// Smallest terrain cost over the open cells, the admissible per-step
    /// lower bound the A* heuristic scales by.
    pub fn min_terrain_cost(&self) -> u32 {
        self.min_terrain_cost
    }

    /// One past the last tick at which any dynamic obstacle is scheduled.
    /// From this tick on the world is static.
    pub fn dynamic_horizon(&self) -> u64 {
        self.dynamic_horizon
    }

    pub fn dynamic_obstacles(&self) -> &[DynamicObstacle] {
        &self.obstacles
    }
}
