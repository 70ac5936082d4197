//! Rasterization of the shapes charts are built from.
//!
//! - Bresenham's line, optionally widened to a square pen
//! - Filled midpoint circle for markers
//!
//! # References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

mod primitives;

pub use primitives::{draw_circle, draw_hline, draw_line, draw_vline};
