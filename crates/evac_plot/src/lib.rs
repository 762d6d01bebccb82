pub mod chart;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod output;
pub mod savings;
pub mod viewer;

pub use chart::{ChartFormat, ChartOptions, Scene, build_bar_chart, render_chart};
pub use config::{Config, Overrides, PlotConfig};
pub use constants::{DEMAND_LEVELS, METHOD_COLORS};
pub use dataset::{Dataset, Method, Series, read_dataset_csv};
pub use error::{PlotError, Result};
pub use output::{output_path, save_chart};
pub use savings::{Comparison, SavingsReport, percent_savings};
