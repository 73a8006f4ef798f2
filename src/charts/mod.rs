//! Charts module - interactive plots and static map rendering

mod plotter;
mod renderer;

pub use plotter::{delta_color, ChartPlotter};
pub use renderer::{region_color, to_color_image, RenderError, StaticChartRenderer};
