pub mod compare;
pub mod k_default;
pub mod pair_test;
pub mod pool;
pub mod ttest;

use std::path::Path;

use ndarray::{Array2, ArrayView1, ArrayView2};
use rsastats_core::{Evaluations, EvaluationsRecord, Rdms, RdmsRecord};
use rsastats_tests::Variance;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Print an error and exit with status 1.
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("failed to parse {path}: {e}"))
}

pub fn load_rdms(path: &str) -> Result<Rdms, String> {
    let record: RdmsRecord = read_json(path)?;
    Rdms::try_from(record).map_err(|e| format!("{path}: {e}"))
}

/// Evaluation tensor plus one display name per model.
pub fn load_evaluations(path: &str) -> Result<(Evaluations, Vec<String>), String> {
    let record: EvaluationsRecord = read_json(path)?;
    record.into_parts().map_err(|e| format!("{path}: {e}"))
}

/// Variance file: a JSON array (per-model) or an array of arrays (covariance).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VarianceRecord {
    PerModel(Vec<f64>),
    Covariance(Vec<Vec<f64>>),
}

pub fn load_variances(path: &str) -> Result<Variance, String> {
    match read_json::<VarianceRecord>(path)? {
        VarianceRecord::PerModel(v) => Ok(Variance::PerModel(v.into())),
        VarianceRecord::Covariance(rows) => {
            let n = rows.len();
            let m = rows.first().map_or(0, Vec::len);
            if rows.iter().any(|r| r.len() != m) {
                return Err(format!("{path}: covariance rows have different lengths"));
            }
            let flat: Vec<f64> = rows.into_iter().flatten().collect();
            Array2::from_shape_vec((n, m), flat)
                .map(Variance::Covariance)
                .map_err(|e| format!("{path}: {e}"))
        }
    }
}

/// Write pretty JSON to `path`, creating parent directories as needed.
pub fn write_json(path: &str, value: &serde_json::Value) -> Result<(), String> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    std::fs::write(path, text).map_err(|e| format!("failed to write {path}: {e}"))
}

/// Rows of a matrix for JSON output; NaN serialises as `null`.
pub fn matrix_rows(matrix: ArrayView2<'_, f64>) -> Vec<Vec<f64>> {
    matrix.outer_iter().map(|row| row.to_vec()).collect()
}

/// Aligned p-value matrix with model names on both axes.
pub fn print_p_matrix(names: &[String], p: ArrayView2<'_, f64>) {
    let width = names.iter().map(String::len).max().unwrap_or(0).max(8);
    print!("  {:<width$}", "");
    for name in names {
        print!(" {name:>width$}");
    }
    println!();
    for (name, row) in names.iter().zip(p.outer_iter()) {
        print!("  {name:<width$}");
        for value in row {
            print!(" {value:>width$.4}");
        }
        println!();
    }
}

/// One p-value per model.
pub fn print_p_vector(names: &[String], p: ArrayView1<'_, f64>) {
    let width = names.iter().map(String::len).max().unwrap_or(0).max(8);
    println!("  {:<width$} {:>10}", "Model", "p");
    println!("  {}", "-".repeat(width + 11));
    for (name, value) in names.iter().zip(p.iter()) {
        println!("  {name:<width$} {value:>10.4}");
    }
}
