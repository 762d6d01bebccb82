use crate::{
    chart::{ChartFormat, ChartOptions},
    constants::{DEFAULT_RENDERED_SERIES, ENV_ROOT_PATH},
    error::{PlotError, Result},
};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};

/// Top-level config file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub plot: PlotConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Directory containing `Experiments/`
    pub root_path: PathBuf,
    /// Embedded dataset (1 or 2), or the selector used in the file name for CSV data
    pub dataset_index: u8,
    /// CSV dataset instead of an embedded one
    pub data_csv: Option<PathBuf>,
    pub rendered_series: usize,
    pub annotate: bool,
    pub show_title: bool,
    pub format: ChartFormat,
    /// Open the chart after saving
    pub show: bool,
    pub create_dirs: bool,
    /// Also write the savings report as JSON
    pub report_json: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            dataset_index: 1,
            data_csv: None,
            rendered_series: DEFAULT_RENDERED_SERIES,
            annotate: false,
            show_title: false,
            format: ChartFormat::Pdf,
            show: true,
            create_dirs: false,
            report_json: None,
        }
    }
}

/// Values given on the command line; `None`/`false` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root_path: Option<PathBuf>,
    pub dataset_index: Option<u8>,
    pub data_csv: Option<PathBuf>,
    pub rendered_series: Option<usize>,
    pub annotate: bool,
    pub show_title: bool,
    pub format: Option<ChartFormat>,
    /// Explicit output file; its extension selects the format
    pub output: Option<PathBuf>,
    pub no_show: bool,
    pub create_dirs: bool,
    pub report_json: Option<PathBuf>,
}

impl Config {
    /// Reads a TOML config file. Validation is left to the caller, after
    /// environment and command line overrides are applied.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlotError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            PlotError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Applies `EVAC_PLOT_ROOT` when it is set and not blank
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(root) = env::var(ENV_ROOT_PATH)
            && !root.trim().is_empty()
        {
            let path = PathBuf::from(root);
            if path.exists() && !path.is_dir() {
                return Err(PlotError::Config(format!(
                    "Root path is not a directory: {}",
                    path.display()
                )));
            }
            self.plot.root_path = path;
        }
        Ok(())
    }

    /// Applies command line values on top of the file and environment
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        let plot = &mut self.plot;
        if let Some(root) = &overrides.root_path {
            plot.root_path = root.clone();
        }
        if let Some(index) = overrides.dataset_index {
            plot.dataset_index = index;
        }
        if let Some(csv) = &overrides.data_csv {
            plot.data_csv = Some(csv.clone());
        }
        if let Some(n) = overrides.rendered_series {
            plot.rendered_series = n;
        }
        if let Some(json) = &overrides.report_json {
            plot.report_json = Some(json.clone());
        }
        // an explicit format wins over the output file extension
        if let Some(format) = overrides.format {
            plot.format = format;
        } else if let Some(format) = overrides
            .output
            .as_deref()
            .and_then(ChartFormat::from_path)
        {
            plot.format = format;
        }
        plot.annotate |= overrides.annotate;
        plot.show_title |= overrides.show_title;
        plot.create_dirs |= overrides.create_dirs;
        if overrides.no_show {
            plot.show = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let plot = &self.plot;

        if plot.data_csv.is_none() && !matches!(plot.dataset_index, 1 | 2) {
            return Err(PlotError::Config(format!(
                "dataset_index must be 1 or 2, got {}",
                plot.dataset_index
            )));
        }

        if plot.rendered_series == 0 || plot.rendered_series > 4 {
            return Err(PlotError::Config(format!(
                "rendered_series must be between 1 and 4, got {}",
                plot.rendered_series
            )));
        }

        Ok(())
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            rendered_series: self.plot.rendered_series,
            annotate: self.plot.annotate,
            show_title: self.plot.show_title,
            ..Default::default()
        }
    }
}
