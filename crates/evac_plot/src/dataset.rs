use crate::constants::{DEMAND_LEVELS, EXPECTED_DEMAND_HEADER, METHOD_COLORS};
use crate::error::{PlotError, Result};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString};

/// Intersection scheduling method, in chart/legend order.
///
/// Parsing accepts both the display name and the scheduler identifier used by the batch tests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, EnumString, strum_macros::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Method {
    #[strum(to_string = "FIFO", serialize = "fifo")]
    #[serde(rename = "FIFO")]
    Fifo,
    #[strum(to_string = "iDFST", serialize = "dfs")]
    #[serde(rename = "iDFST")]
    IDfst,
    #[strum(to_string = "BFST", serialize = "bfs")]
    #[serde(rename = "BFST")]
    Bfst,
    #[strum(to_string = "BFST-DynaLane", serialize = "dynamic_lane")]
    #[serde(rename = "BFST-DynaLane")]
    BfstDynaLane,
}

impl Method {
    /// Position in the parallel arrays
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn color(self) -> &'static str {
        METHOD_COLORS[self.index()]
    }

    pub fn parse(label: &str) -> Result<Self> {
        Method::from_str(label.trim()).map_err(|_| PlotError::UnknownMethod(label.to_string()))
    }
}

/// Evacuation times of one method, one value per demand level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub method: Method,
    pub times: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Selector used in the output file name
    pub index: u8,
    pub demand_levels: Vec<u32>,
    pub series: Vec<Series>,
}

const DATASET_1: [[f64; 4]; 4] = [
    [43.6323, 209.035, 416.039, 829.554],
    [42.7616, 180.053, 347.014, 678.973],
    [36.0043, 153.637, 295.618, 573.806],
    [35.5668, 145.853, 275.698, 528.281],
];

const DATASET_2: [[f64; 4]; 4] = [
    [41.1972, 194.535, 386.207, 769.571],
    [40.2591, 160.914, 304.321, 588.337],
    [34.487, 140.935, 267.777, 514.957],
    [31.9797, 121.024, 223.917, 425.121],
];

impl Dataset {
    /// Returns one of the embedded experiment results (1 or 2)
    pub fn embedded(index: u8) -> Result<Self> {
        let rows = match index {
            1 => &DATASET_1,
            2 => &DATASET_2,
            _ => return Err(PlotError::UnknownDataset(index)),
        };

        let series = Method::iter()
            .zip(rows.iter())
            .map(|(method, times)| Series {
                method,
                times: times.to_vec(),
            })
            .collect();

        let dataset = Self {
            index,
            demand_levels: DEMAND_LEVELS.to_vec(),
            series,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Checks that the parallel arrays line up: every method present in order,
    /// and one value per demand level in each series.
    pub fn validate(&self) -> Result<()> {
        if self.demand_levels.is_empty() {
            return Err(PlotError::EmptyDataset);
        }

        if self.series.len() != Method::iter().count() {
            return Err(PlotError::LengthMismatch {
                method: "(series)".to_string(),
                expected: Method::iter().count(),
                got: self.series.len(),
            });
        }

        for (position, (expected, series)) in Method::iter().zip(&self.series).enumerate() {
            if series.method != expected {
                return Err(PlotError::MethodOrder {
                    position,
                    expected: expected.to_string(),
                    got: series.method.to_string(),
                });
            }
            if series.times.len() != self.demand_levels.len() {
                return Err(PlotError::LengthMismatch {
                    method: series.method.to_string(),
                    expected: self.demand_levels.len(),
                    got: series.times.len(),
                });
            }
        }
        Ok(())
    }

    pub fn times(&self, method: Method) -> &[f64] {
        &self.series[method.index()].times
    }

    /// Evacuation time of `method` at demand index `i`
    pub fn time(&self, method: Method, i: usize) -> f64 {
        self.times(method)[i]
    }

    pub fn num_demands(&self) -> usize {
        self.demand_levels.len()
    }

    /// Largest time among the first `n` series
    pub fn max_time(&self, n: usize) -> f64 {
        self.series
            .iter()
            .take(n)
            .flat_map(|s| s.times.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Reads a dataset from a CSV file
///
/// # Arguments
/// * `path` - CSV with a `Demand` column followed by one column per method
/// * `index` - Selector used for the output file name
///
/// # Errors
/// Returns error if the file cannot be read, a method column is missing or
/// duplicated, or a value is not a number
pub fn read_dataset_csv<P: AsRef<Path>>(path: P, index: u8) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    read_dataset_from_reader(file, index)
}

pub fn read_dataset_from_reader<R: Read>(reader: R, index: u8) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = method_columns(&headers)?;

    let mut demand_levels = Vec::new();
    let mut times: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // header is row 1
        let row = i + 2;

        let demand_str = record.get(0).unwrap_or("");
        let demand = demand_str.parse::<u32>().map_err(|_| PlotError::ValueParse {
            row,
            column: EXPECTED_DEMAND_HEADER.to_string(),
            value: demand_str.to_string(),
        })?;
        demand_levels.push(demand);

        for (method_idx, &col) in columns.iter().enumerate() {
            let value_str = record.get(col).unwrap_or("");
            // times are seconds: finite and non-negative
            let value = value_str
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| PlotError::ValueParse {
                    row,
                    column: headers.get(col).unwrap_or("").to_string(),
                    value: value_str.to_string(),
                })?;
            times[method_idx].push(value);
        }
    }

    if demand_levels.is_empty() {
        return Err(PlotError::EmptyDataset);
    }

    let series = Method::iter()
        .zip(times)
        .map(|(method, times)| Series { method, times })
        .collect();

    let dataset = Dataset {
        index,
        demand_levels,
        series,
    };
    dataset.validate()?;
    Ok(dataset)
}

/// Maps each method (in enum order) to its CSV column
fn method_columns(headers: &StringRecord) -> Result<Vec<usize>> {
    match headers.get(0) {
        Some(h) if h.eq_ignore_ascii_case(EXPECTED_DEMAND_HEADER) => {}
        other => {
            return Err(PlotError::CsvHeader(format!(
                "first column must be '{}', got '{}'",
                EXPECTED_DEMAND_HEADER,
                other.unwrap_or("")
            )));
        }
    }

    let mut columns: Vec<Option<usize>> = vec![None; Method::iter().count()];
    for (col, label) in headers.iter().enumerate().skip(1) {
        let method = Method::parse(label)?;
        let slot = &mut columns[method.index()];
        if slot.is_some() {
            return Err(PlotError::CsvHeader(format!("duplicate column for {}", method)));
        }
        *slot = Some(col);
    }

    Method::iter()
        .zip(columns)
        .map(|(method, col)| {
            col.ok_or_else(|| PlotError::CsvHeader(format!("missing column for {}", method)))
        })
        .collect()
}
