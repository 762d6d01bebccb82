/// Vehicle counts of the demand scenarios
pub const DEMAND_LEVELS: [u32; 4] = [10, 50, 100, 200];

/// Bar colors, one per method (FIFO, iDFST, BFST, BFST-DynaLane)
pub const METHOD_COLORS: [&str; 4] = ["#ff1f5b", "#ffc61e", "#00cd6c", "#009ade"];

/// Figure size in inches
pub const FIGURE_WIDTH_IN: f32 = 9.0;
pub const FIGURE_HEIGHT_IN: f32 = 5.0;
pub const POINTS_PER_INCH: f32 = 72.0;

/// Bar width in x-axis data units (one group per unit)
pub const BAR_WIDTH: f32 = 0.18;

/// Font sizes (pt)
pub const AXIS_LABEL_FONT_SIZE: f32 = 16.0;
pub const AXIS_TICK_FONT_SIZE: f32 = AXIS_LABEL_FONT_SIZE - 2.0;

/// Series drawn by default (the fourth is kept in the data only)
pub const DEFAULT_RENDERED_SERIES: usize = 3;

pub const X_LABEL: &str = "Number of Vehicles";
pub const Y_LABEL: &str = "Evacuation Time (seconds)";
pub const CHART_TITLE: &str = "Evacuation Times vs. Number of Vehicles";

/// Output location: {root}/Experiments/batch_result_{index}.{ext}
pub const OUTPUT_SUBDIR: &str = "Experiments";
pub const OUTPUT_PREFIX: &str = "batch_result_";

/// Gridline opacity
pub const GRID_ALPHA: f32 = 0.4;

/// Autoscale margin (fraction of the data range)
pub const AXIS_MARGIN: f32 = 0.05;

/// Vertical offset of bar annotations (pt)
pub const ANNOTATION_OFFSET_PT: f32 = 3.0;

/// Expected first CSV column
pub const EXPECTED_DEMAND_HEADER: &str = "Demand";

/// Environment override for the root path
pub const ENV_ROOT_PATH: &str = "EVAC_PLOT_ROOT";
