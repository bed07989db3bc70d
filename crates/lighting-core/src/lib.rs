pub mod catalog;
pub mod planner;
pub mod report;
pub mod types;

pub use catalog::{Catalog, HeightBand};
pub use planner::{best_grid, cyclic_quadrilateral_area, Planner, RoomShape};
pub use types::*;
