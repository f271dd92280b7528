//! Navigation grids: dense per-cell distance fields and the scans that fill them.

mod cost;
mod dijkstra;
mod distances;
mod map;
mod shared;
mod step;
mod waypoints;

pub use cost::{CostGrid, StepCost};
pub use dijkstra::{propagate, rescan};
pub(crate) use distances::wall_cost;
pub use distances::{calculate_distances, terrain_costs};
pub use map::{DistanceGrid, Grid};
pub use shared::{GridKind, SharedGrids};
pub use step::next_step;
pub use waypoints::{WaypointSet, WaypointVisits};
