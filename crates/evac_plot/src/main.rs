use anyhow::{Context, Result};
use clap::Parser;
use evac_plot::{
    ChartFormat, Config, Dataset, Overrides, PlotError, SavingsReport, output_path,
    read_dataset_csv, save_chart, viewer,
};
use log::{debug, error, info, warn};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Plot and compare evacuation times of intersection scheduling methods", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", default_value = "config/default.toml")]
    config: PathBuf,

    /// Root directory; the chart is written to <root>/Experiments/
    #[arg(short = 'r', long = "root")]
    root: Option<PathBuf>,

    /// Embedded dataset to plot (1 or 2)
    #[arg(short = 'd', long = "dataset")]
    dataset: Option<u8>,

    /// Read evacuation times from a CSV file instead of an embedded dataset
    #[arg(long = "data")]
    data_csv: Option<PathBuf>,

    /// Number of methods drawn, from FIFO onwards (1-4)
    #[arg(short = 'n', long = "series")]
    series: Option<usize>,

    /// Print the value above each bar
    #[arg(short = 'a', long = "annotate")]
    annotate: bool,

    /// Draw the chart title
    #[arg(long = "title")]
    title: bool,

    /// Output format: pdf or svg
    #[arg(short = 'f', long = "format")]
    format: Option<ChartFormat>,

    /// Explicit output file (format follows the extension unless --format is given)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Do not open the chart after saving
    #[arg(long = "no-show")]
    no_show: bool,

    /// Create the output directory if it does not exist
    #[arg(long = "create-dirs")]
    create_dirs: bool,

    /// Also write the savings report as JSON
    #[arg(long = "report-json")]
    report_json: Option<PathBuf>,
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("Error: {e:#}");
        print_hint(&e);
        let _ = std::io::stderr().flush();
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = if args.config.exists() {
        Config::load_from_file(&args.config)?
    } else {
        debug!(
            "Config file not found: {}, using default settings",
            args.config.display()
        );
        Config::default()
    };
    config.apply_env()?;
    config.apply_overrides(&Overrides {
        root_path: args.root.clone(),
        dataset_index: args.dataset,
        data_csv: args.data_csv.clone(),
        rendered_series: args.series,
        annotate: args.annotate,
        show_title: args.title,
        format: args.format,
        output: args.output.clone(),
        no_show: args.no_show,
        create_dirs: args.create_dirs,
        report_json: args.report_json.clone(),
    });

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let plot = &config.plot;

    let dataset = match &plot.data_csv {
        Some(csv) => read_dataset_csv(csv, plot.dataset_index)
            .with_context(|| format!("Failed to load dataset from {}", csv.display()))?,
        None => Dataset::embedded(plot.dataset_index)?,
    };
    info!(
        "Dataset {}: {} demand levels, drawing {} of {} methods",
        dataset.index,
        dataset.num_demands(),
        plot.rendered_series,
        dataset.series.len()
    );

    let report = SavingsReport::from_dataset(&dataset);
    {
        let mut stdout = std::io::stdout().lock();
        report.write_to(&mut stdout)?;
        stdout.flush()?;
    }
    if let Some(json) = &plot.report_json {
        report.save_json(json)?;
        info!("Savings report saved to: {}", json.display());
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| output_path(&plot.root_path, dataset.index, plot.format));
    save_chart(
        &dataset,
        &config.chart_options(),
        plot.format,
        &path,
        plot.create_dirs,
    )?;

    if plot.show
        && let Err(e) = viewer::show(&path)
    {
        warn!("{e}");
    }

    Ok(())
}

/// Hints for common output failures
fn print_hint(e: &anyhow::Error) {
    for cause in e.chain() {
        if let Some(PlotError::CreateFile { source, .. }) = cause.downcast_ref::<PlotError>() {
            match source.kind() {
                ErrorKind::NotFound => {
                    error!("Hint: The output directory does not exist. Pass --create-dirs or set --root.");
                }
                ErrorKind::PermissionDenied => {
                    error!("Hint: Choose a writable root with --root or EVAC_PLOT_ROOT.");
                }
                _ => {}
            }
            break;
        }
    }
}
