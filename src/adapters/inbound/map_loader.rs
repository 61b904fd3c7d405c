//! Map file parsing. The loader is a collaborator of the core, not part of
//! it: it turns the textual map format into constructed domain values and
//! hands them over.
//!
//! Format, blank lines and `#` comments ignored:
//!
//! ```text
//! 10 10                 width height
//! START 0 0             agent start cell
//! TERRAIN               height rows of width terrain-cost codes (>= 1)
//! 1 1 2 ...
//! OBSTACLES             static obstacle cells, one "x y" per line
//! 3 4
//! PACKAGES              one "pickup_x pickup_y delivery_x delivery_y" per line
//! 1 1 8 8
//! DYNAMIC_OBSTACLES     per obstacle: a PATH line and a parallel TIMES line
//! PATH 4 4 4 5
//! TIMES 8 9
//! ```

use crate::common::DomainError;
use crate::domains::delivery::Package;
use crate::domains::grid_world::{DynamicObstacle, GridPosition, GridWorld};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("missing {0} block")]
    MissingBlock(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Everything a mission needs from a map file, already validated.
#[derive(Debug, Clone)]
pub struct MissionMap {
    pub world: GridWorld,
    pub start: GridPosition,
    pub packages: Vec<Package>,
}

pub fn load_map(path: impl AsRef<Path>) -> Result<MissionMap, MapError> {
    let text = fs::read_to_string(path)?;
    parse_map(&text)
}

pub fn parse_map(text: &str) -> Result<MissionMap, MapError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let Some(&(header_line, header)) = lines.first() else {
        return Err(MapError::MissingBlock("header"));
    };
    let dims = parse_numbers(header_line, header)?;
    let [width, height] = dims.as_slice() else {
        return Err(MapError::Parse {
            line: header_line,
            reason: format!("expected 'width height', got {} numbers", dims.len()),
        });
    };
    if *width <= 0 || *height <= 0 {
        return Err(MapError::Parse {
            line: header_line,
            reason: format!("grid dimensions must be positive, got {}x{}", width, height),
        });
    }
    let (width, height) = (*width as usize, *height as usize);

    let mut start = GridPosition::new(0, 0);
    let mut rows: Option<Vec<Vec<u32>>> = None;
    let mut blocked: Vec<GridPosition> = Vec::new();
    let mut packages: Vec<Package> = Vec::new();
    let mut obstacles: Vec<DynamicObstacle> = Vec::new();

    let mut i = 1;
    while i < lines.len() {
        let (line_no, line) = lines[i];
        let keyword = line.split_whitespace().next().unwrap_or("");
        match keyword {
            "START" => {
                let values = parse_numbers(line_no, line.trim_start_matches("START"))?;
                let [x, y] = values.as_slice() else {
                    return Err(MapError::Parse {
                        line: line_no,
                        reason: "START expects 'x y'".to_string(),
                    });
                };
                start = GridPosition::new(*x as i32, *y as i32);
                i += 1;
            }
            "TERRAIN" => {
                i += 1;
                let mut terrain = Vec::with_capacity(height);
                for _ in 0..height {
                    let Some(&(row_line, row)) = lines.get(i) else {
                        return Err(MapError::Parse {
                            line: line_no,
                            reason: format!("TERRAIN block needs {} rows", height),
                        });
                    };
                    let values = parse_numbers(row_line, row)?;
                    if values.len() != width {
                        return Err(MapError::Parse {
                            line: row_line,
                            reason: format!(
                                "terrain row has {} codes, expected {}",
                                values.len(),
                                width
                            ),
                        });
                    }
                    let costs = values
                        .into_iter()
                        .map(|v| {
                            u32::try_from(v).map_err(|_| MapError::Parse {
                                line: row_line,
                                reason: format!("terrain cost {} is not a valid code", v),
                            })
                        })
                        .collect::<Result<Vec<u32>, MapError>>()?;
                    terrain.push(costs);
                    i += 1;
                }
                rows = Some(terrain);
            }
            "OBSTACLES" => {
                i += 1;
                while let Some(&(entry_line, entry)) = lines.get(i) {
                    if is_keyword(entry) {
                        break;
                    }
                    let values = parse_numbers(entry_line, entry)?;
                    let [x, y] = values.as_slice() else {
                        return Err(MapError::Parse {
                            line: entry_line,
                            reason: "obstacle entry expects 'x y'".to_string(),
                        });
                    };
                    blocked.push(GridPosition::new(*x as i32, *y as i32));
                    i += 1;
                }
            }
            "PACKAGES" => {
                i += 1;
                while let Some(&(entry_line, entry)) = lines.get(i) {
                    if is_keyword(entry) {
                        break;
                    }
                    let values = parse_numbers(entry_line, entry)?;
                    let [px, py, dx, dy] = values.as_slice() else {
                        return Err(MapError::Parse {
                            line: entry_line,
                            reason: "package entry expects 'pickup_x pickup_y delivery_x delivery_y'"
                                .to_string(),
                        });
                    };
                    let id = packages.len() as u32;
                    packages.push(Package::new(
                        id,
                        GridPosition::new(*px as i32, *py as i32),
                        GridPosition::new(*dx as i32, *dy as i32),
                    ));
                    i += 1;
                }
            }
            "DYNAMIC_OBSTACLES" => {
                i += 1;
                while let Some(&(path_line, path_entry)) = lines.get(i) {
                    if !path_entry.starts_with("PATH") {
                        break;
                    }
                    let coords = parse_numbers(path_line, path_entry.trim_start_matches("PATH"))?;
                    if coords.is_empty() || coords.len() % 2 != 0 {
                        return Err(MapError::Parse {
                            line: path_line,
                            reason: "PATH expects a non-empty list of 'x y' pairs".to_string(),
                        });
                    }
                    let positions: Vec<GridPosition> = coords
                        .chunks(2)
                        .map(|pair| GridPosition::new(pair[0] as i32, pair[1] as i32))
                        .collect();
                    i += 1;
                    let Some(&(times_line, times_entry)) = lines.get(i) else {
                        return Err(MapError::Parse {
                            line: path_line,
                            reason: "PATH line without a following TIMES line".to_string(),
                        });
                    };
                    if !times_entry.starts_with("TIMES") {
                        return Err(MapError::Parse {
                            line: times_line,
                            reason: "PATH line without a following TIMES line".to_string(),
                        });
                    }
                    let times = parse_numbers(times_line, times_entry.trim_start_matches("TIMES"))?
                        .into_iter()
                        .map(|v| {
                            u64::try_from(v).map_err(|_| MapError::Parse {
                                line: times_line,
                                reason: format!("time step {} is not a valid tick", v),
                            })
                        })
                        .collect::<Result<Vec<u64>, MapError>>()?;
                    let id = format!("dyn-{}", obstacles.len());
                    obstacles.push(DynamicObstacle::from_track(id, positions, times)?);
                    i += 1;
                }
            }
            other => {
                return Err(MapError::Parse {
                    line: line_no,
                    reason: format!("unexpected token '{}'", other),
                });
            }
        }
    }

    let rows = rows.ok_or(MapError::MissingBlock("TERRAIN"))?;
    let world = GridWorld::from_rows(rows, &blocked, obstacles)?;

    if !world.in_bounds(start) {
        return Err(DomainError::InvalidMap {
            reason: format!("start position {} is outside the grid", start),
        }
        .into());
    }
    for package in &packages {
        for position in [package.pickup, package.delivery] {
            if !world.in_bounds(position) {
                return Err(DomainError::InvalidMap {
                    reason: format!("package {} references {} outside the grid", package.id, position),
                }
                .into());
            }
        }
    }

    Ok(MissionMap {
        world,
        start,
        packages,
    })
}

fn is_keyword(line: &str) -> bool {
    matches!(
        line.split_whitespace().next().unwrap_or(""),
        "START" | "TERRAIN" | "OBSTACLES" | "PACKAGES" | "DYNAMIC_OBSTACLES" | "PATH" | "TIMES"
    )
}

fn parse_numbers(line_no: usize, text: &str) -> Result<Vec<i64>, MapError> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<i64>().map_err(|_| MapError::Parse {
                line: line_no,
                reason: format!("invalid number '{}'", token),
            })
        })
        .collect()
}
