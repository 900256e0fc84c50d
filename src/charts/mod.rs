//! Charts module - Static chart rendering

mod renderer;

pub use renderer::{Bounds, ChartError, StaticChartRenderer};
