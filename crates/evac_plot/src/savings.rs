use crate::dataset::{Dataset, Method};
use crate::error::{PlotError, Result};

use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Relative reduction of `candidate` against `baseline`, in percent.
///
/// `baseline == 0` is not guarded: the result is the IEEE value (inf or NaN).
pub fn percent_savings(candidate: f64, baseline: f64) -> f64 {
    (baseline - candidate) / baseline * 100.0
}

/// One printed comparison: a candidate method against one or more baselines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub demand_index: usize,
    pub vehicles: u32,
    pub label: String,
    pub candidate: Method,
    pub baselines: Vec<Method>,
    /// Savings in percent, aligned with `baselines`
    pub savings: Vec<f64>,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Demand {} {}", self.demand_index, self.label)?;
        for value in &self.savings {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsReport {
    pub dataset_index: u8,
    pub comparisons: Vec<Comparison>,
}

/// (label, candidate, baselines) printed for every demand level
const COMPARISONS: [(&str, Method, &[Method]); 3] = [
    ("BFST", Method::Bfst, &[Method::Fifo, Method::IDfst]),
    (
        "BFST-DynaLane",
        Method::BfstDynaLane,
        &[Method::Fifo, Method::IDfst],
    ),
    (
        "BFST-DynaLane over BFST",
        Method::BfstDynaLane,
        &[Method::Bfst],
    ),
];

impl SavingsReport {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut comparisons = Vec::with_capacity(dataset.num_demands() * COMPARISONS.len());

        for (i, &vehicles) in dataset.demand_levels.iter().enumerate() {
            for (label, candidate, baselines) in COMPARISONS {
                let savings = baselines
                    .iter()
                    .map(|&b| percent_savings(dataset.time(candidate, i), dataset.time(b, i)))
                    .collect();
                comparisons.push(Comparison {
                    demand_index: i,
                    vehicles,
                    label: label.to_string(),
                    candidate,
                    baselines: baselines.to_vec(),
                    savings,
                });
            }
        }

        Self {
            dataset_index: dataset.index,
            comparisons,
        }
    }

    /// Writes one line per comparison
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        for comparison in &self.comparisons {
            writeln!(w, "{}", comparison)?;
        }
        Ok(())
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| PlotError::CreateFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_percent_savings_formula() {
        let pairs = [(36.0043, 43.6323), (1.0, 4.0), (5.0, 2.0), (153.637, 209.035)];
        for (c, b) in pairs {
            assert!((percent_savings(c, b) - (b - c) / b * 100.0).abs() < EPS);
        }
        assert!((percent_savings(1.0, 4.0) - 75.0).abs() < EPS);
        assert!((percent_savings(5.0, 2.0) + 150.0).abs() < EPS);
    }

    #[test]
    fn test_percent_savings_identities() {
        for x in [0.5, 1.0, 43.6323, 829.554] {
            assert_eq!(percent_savings(x, x), 0.0);
            assert_eq!(percent_savings(0.0, x), 100.0);
        }
    }

    #[test]
    fn test_percent_savings_examples() {
        assert!((percent_savings(36.0043, 43.6323) - 17.4824).abs() < 1e-3);
        assert!((percent_savings(35.5668, 209.035) - 82.985).abs() < 1e-3);
    }

    #[test]
    fn test_percent_savings_zero_baseline() {
        assert_eq!(percent_savings(1.0, 0.0), f64::NEG_INFINITY);
        assert!(percent_savings(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_report_shape() {
        let ds = Dataset::embedded(1).unwrap();
        let report = SavingsReport::from_dataset(&ds);

        assert_eq!(report.dataset_index, 1);
        assert_eq!(report.comparisons.len(), 12);
        for (n, c) in report.comparisons.iter().enumerate() {
            assert_eq!(c.demand_index, n / 3);
            assert_eq!(c.savings.len(), c.baselines.len());
        }
        assert_eq!(report.comparisons[3].vehicles, 50);
    }

    #[test]
    fn test_report_values() {
        let ds = Dataset::embedded(1).unwrap();
        let report = SavingsReport::from_dataset(&ds);

        let bfst = &report.comparisons[0];
        assert_eq!(bfst.candidate, Method::Bfst);
        assert_eq!(bfst.savings[0], percent_savings(36.0043, 43.6323));
        assert_eq!(bfst.savings[1], percent_savings(36.0043, 42.7616));

        let over = &report.comparisons[11];
        assert_eq!(over.label, "BFST-DynaLane over BFST");
        assert_eq!(over.baselines, vec![Method::Bfst]);
        assert_eq!(over.savings, vec![percent_savings(528.281, 573.806)]);
    }

    #[test]
    fn test_report_lines() {
        let ds = Dataset::embedded(2).unwrap();
        let report = SavingsReport::from_dataset(&ds);

        let mut out = Vec::new();
        report.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 12);
        assert!(lines[0].starts_with("Demand 0 BFST "));
        assert!(lines[1].starts_with("Demand 0 BFST-DynaLane "));
        assert!(lines[2].starts_with("Demand 0 BFST-DynaLane over BFST "));
        assert!(lines[11].starts_with("Demand 3 BFST-DynaLane over BFST "));
        assert_eq!(lines[0].split(' ').count(), 5);
        assert_eq!(lines[2].split(' ').count(), 6);

        let expected = percent_savings(34.487, 41.1972);
        assert_eq!(lines[0].split(' ').nth(3), Some(expected.to_string().as_str()));
    }

    #[test]
    fn test_save_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("savings.json");
        let report = SavingsReport::from_dataset(&Dataset::embedded(1).unwrap());

        report.save_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["dataset_index"], 1);
        assert_eq!(value["comparisons"][0]["candidate"], "BFST");
        assert_eq!(value["comparisons"][0]["baselines"][1], "iDFST");
    }

    #[test]
    fn test_save_json_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("savings.json");
        let report = SavingsReport::from_dataset(&Dataset::embedded(2).unwrap());

        match report.save_json(&path) {
            Err(PlotError::CreateFile { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("Expected CreateFile error, got {other:?}"),
        }
        assert!(!path.exists());
    }
}
