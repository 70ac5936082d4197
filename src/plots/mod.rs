//! Chart types used by benchmark reports.

mod line;

pub use line::{LineChart, LineSeries};
