use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::chart::{ChartFormat, ChartOptions, render_chart};
use crate::constants::{OUTPUT_PREFIX, OUTPUT_SUBDIR};
use crate::dataset::Dataset;
use crate::error::{PlotError, Result};

/// `{root}/Experiments/batch_result_{index}.{ext}`
pub fn output_path(root: &Path, dataset_index: u8, format: ChartFormat) -> PathBuf {
    root.join(OUTPUT_SUBDIR).join(format!(
        "{}{}.{}",
        OUTPUT_PREFIX,
        dataset_index,
        format.extension()
    ))
}

/// Renders the chart into `path`.
///
/// The parent directory must exist unless `create_dirs` is set.
pub fn save_chart(
    dataset: &Dataset,
    opt: &ChartOptions,
    format: ChartFormat,
    path: &Path,
    create_dirs: bool,
) -> Result<()> {
    if create_dirs && let Some(dir) = path.parent() {
        debug!("Creating output directory: {}", dir.display());
        std::fs::create_dir_all(dir).map_err(|e| PlotError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    let file = File::create(path).map_err(|e| PlotError::CreateFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    render_chart(dataset, opt, format, &mut writer)?;
    writer.flush()?;

    info!("Chart saved to: {}", path.display());
    Ok(())
}
