//! Text rendering of the world for the demo binary. Presentation only, the
//! core never depends on it.

use crate::domains::delivery::{Package, PackageStatus};
use crate::domains::grid_world::{GridPosition, GridWorld};

/// Render the grid at a time step: `A` agent, `X` occupied cell, `P` pending
/// pickup, `D` outstanding delivery target, terrain cost digit otherwise.
pub fn render(
    world: &GridWorld,
    agent: Option<GridPosition>,
    packages: &[Package],
    time_step: u64,
) -> String {
    let mut out = String::new();
    for y in 0..world.height() as i32 {
        let mut row = Vec::with_capacity(world.width() as usize);
        for x in 0..world.width() as i32 {
            let position = GridPosition::new(x, y);
            row.push(glyph(world, agent, packages, position, time_step));
        }
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

fn glyph(
    world: &GridWorld,
    agent: Option<GridPosition>,
    packages: &[Package],
    position: GridPosition,
    time_step: u64,
) -> String {
    if agent == Some(position) {
        return "A".to_string();
    }
    if world.is_blocked(position, time_step).unwrap_or(true) {
        return "X".to_string();
    }
    if packages
        .iter()
        .any(|p| p.status == PackageStatus::Pending && p.pickup == position)
    {
        return "P".to_string();
    }
    if packages
        .iter()
        .any(|p| p.status != PackageStatus::Delivered && p.delivery == position)
    {
        return "D".to_string();
    }
    match world.cost_of(position) {
        Ok(cost) if cost <= 9 => cost.to_string(),
        Ok(_) => "+".to_string(),
        Err(_) => "?".to_string(),
    }
}
