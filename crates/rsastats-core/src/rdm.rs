//! Collections of representational dissimilarity matrices (RDMs).
//!
//! Each RDM is stored as the row-major upper triangle of a symmetric
//! `n_cond × n_cond` matrix (diagonal excluded). All rows of one collection
//! share the same condition ordering.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contrast::{pair_count, pairs};
use crate::error::{InferenceError, Result};
use crate::reduction::{masked_rank, validity_mask};

/// Named per-row or per-condition descriptor columns.
pub type DescriptorTable = BTreeMap<String, Vec<Value>>;

/// A stack of dissimilarity vectors over a shared set of conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Rdms {
    dissimilarities: Array2<f64>,
    n_cond: usize,
    dissimilarity_measure: Option<String>,
    descriptors: BTreeMap<String, Value>,
    rdm_descriptors: DescriptorTable,
    pattern_descriptors: DescriptorTable,
}

impl Rdms {
    /// Build a collection from `n_rdm × n_pairs` vectors. Missing entries are NaN.
    pub fn new(dissimilarities: Array2<f64>) -> Result<Self> {
        let n_pairs = dissimilarities.ncols();
        let n_cond = n_cond_from_pairs(n_pairs).ok_or_else(|| {
            InferenceError::validation(format!(
                "{n_pairs} dissimilarities per RDM is not n(n-1)/2 for any condition count"
            ))
        })?;
        Ok(Self {
            dissimilarities,
            n_cond,
            dissimilarity_measure: None,
            descriptors: BTreeMap::new(),
            rdm_descriptors: DescriptorTable::new(),
            pattern_descriptors: DescriptorTable::new(),
        })
    }

    /// Build a collection from an `n_rdm × n_cond × n_cond` stack of square matrices.
    pub fn from_matrices(matrices: ArrayView3<'_, f64>) -> Result<Self> {
        let (n_rdm, rows, cols) = matrices.dim();
        if rows != cols {
            return Err(InferenceError::dimension_mismatch(
                "RDM matrix",
                format!("{rows}x{rows}"),
                format!("{rows}x{cols}"),
            ));
        }
        let mut vectors = Array2::<f64>::zeros((n_rdm, pair_count(rows)));
        for (mut out, mat) in vectors.outer_iter_mut().zip(matrices.outer_iter()) {
            out.assign(&matrix_to_vector(mat)?);
        }
        Self::new(vectors)
    }

    pub fn with_measure(mut self, measure: impl Into<String>) -> Self {
        self.dissimilarity_measure = Some(measure.into());
        self
    }

    pub fn with_descriptor(mut self, key: impl Into<String>, value: Value) -> Self {
        self.descriptors.insert(key.into(), value);
        self
    }

    /// Attach a per-RDM descriptor; needs one value per row.
    pub fn with_rdm_descriptor(mut self, key: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        if values.len() != self.n_rdm() {
            return Err(InferenceError::dimension_mismatch(
                "rdm descriptor",
                self.n_rdm(),
                values.len(),
            ));
        }
        self.rdm_descriptors.insert(key.into(), values);
        Ok(self)
    }

    /// Attach a per-condition descriptor; needs one value per condition.
    pub fn with_pattern_descriptor(
        mut self,
        key: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<Self> {
        if values.len() != self.n_cond {
            return Err(InferenceError::dimension_mismatch(
                "pattern descriptor",
                self.n_cond,
                values.len(),
            ));
        }
        self.pattern_descriptors.insert(key.into(), values);
        Ok(self)
    }

    pub fn n_rdm(&self) -> usize {
        self.dissimilarities.nrows()
    }

    pub fn n_cond(&self) -> usize {
        self.n_cond
    }

    pub fn n_pairs(&self) -> usize {
        self.dissimilarities.ncols()
    }

    /// The `n_rdm × n_pairs` dissimilarity vectors.
    pub fn vectors(&self) -> ArrayView2<'_, f64> {
        self.dissimilarities.view()
    }

    /// The collection as square symmetric matrices with a zero diagonal.
    pub fn matrices(&self) -> Array3<f64> {
        let mut out = Array3::<f64>::zeros((self.n_rdm(), self.n_cond, self.n_cond));
        for (mut mat, vec) in out.outer_iter_mut().zip(self.dissimilarities.outer_iter()) {
            fill_square(vec, self.n_cond, &mut mat);
        }
        out
    }

    pub fn dissimilarity_measure(&self) -> Option<&str> {
        self.dissimilarity_measure.as_deref()
    }

    pub fn descriptors(&self) -> &BTreeMap<String, Value> {
        &self.descriptors
    }

    pub fn rdm_descriptors(&self) -> &DescriptorTable {
        &self.rdm_descriptors
    }

    pub fn pattern_descriptors(&self) -> &DescriptorTable {
        &self.pattern_descriptors
    }

    /// Replace every row by the fractional ranks of its observed entries.
    pub fn rank_transform(&self) -> Self {
        let mask = validity_mask(self.vectors());
        let mut ranked = Array2::<f64>::zeros(self.dissimilarities.raw_dim());
        for ((mut out, row), m) in ranked
            .outer_iter_mut()
            .zip(self.dissimilarities.outer_iter())
            .zip(mask.outer_iter())
        {
            out.assign(&masked_rank(row, m));
        }
        self.with_vectors(ranked, true)
    }

    /// Same descriptors over new vectors; per-row descriptors survive only
    /// when the rows still correspond one to one.
    pub(crate) fn with_vectors(&self, vectors: Array2<f64>, keep_rows: bool) -> Self {
        Self {
            n_cond: self.n_cond,
            dissimilarities: vectors,
            dissimilarity_measure: self.dissimilarity_measure.clone(),
            descriptors: self.descriptors.clone(),
            rdm_descriptors: if keep_rows {
                self.rdm_descriptors.clone()
            } else {
                DescriptorTable::new()
            },
            pattern_descriptors: self.pattern_descriptors.clone(),
        }
    }
}

/// Condition count whose upper triangle has `n_pairs` entries.
pub fn n_cond_from_pairs(n_pairs: usize) -> Option<usize> {
    let n = ((1.0 + (1.0 + 8.0 * n_pairs as f64).sqrt()) / 2.0).round() as usize;
    (pair_count(n) == n_pairs).then_some(n)
}

/// Expand a dissimilarity vector into its symmetric square matrix.
pub fn vector_to_matrix(vector: ArrayView1<'_, f64>) -> Result<Array2<f64>> {
    let n = n_cond_from_pairs(vector.len()).ok_or_else(|| {
        InferenceError::validation(format!(
            "vector of length {} is not an upper triangle",
            vector.len()
        ))
    })?;
    let mut mat = Array2::<f64>::zeros((n, n));
    fill_square(vector, n, &mut mat.view_mut());
    Ok(mat)
}

/// Upper triangle (diagonal excluded) of a square matrix, row-major.
pub fn matrix_to_vector(matrix: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(InferenceError::dimension_mismatch(
            "square matrix",
            format!("{rows}x{rows}"),
            format!("{rows}x{cols}"),
        ));
    }
    Ok(pairs(rows).map(|(i, j)| matrix[[i, j]]).collect())
}

fn fill_square(vector: ArrayView1<'_, f64>, n: usize, mat: &mut ndarray::ArrayViewMut2<'_, f64>) {
    for (k, (i, j)) in pairs(n).enumerate() {
        mat[[i, j]] = vector[k];
        mat[[j, i]] = vector[k];
    }
}

/// JSON form of an RDM collection; `null` marks a missing dissimilarity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RdmsRecord {
    pub dissimilarities: Vec<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dissimilarity_measure: Option<String>,
    #[serde(default)]
    pub descriptors: BTreeMap<String, Value>,
    #[serde(default)]
    pub rdm_descriptors: DescriptorTable,
    #[serde(default)]
    pub pattern_descriptors: DescriptorTable,
}

impl TryFrom<RdmsRecord> for Rdms {
    type Error = InferenceError;

    fn try_from(record: RdmsRecord) -> Result<Self> {
        let n_rdm = record.dissimilarities.len();
        let n_pairs = record.dissimilarities.first().map_or(0, Vec::len);
        if let Some(bad) = record.dissimilarities.iter().find(|r| r.len() != n_pairs) {
            return Err(InferenceError::dimension_mismatch(
                "dissimilarity vector",
                n_pairs,
                bad.len(),
            ));
        }
        let flat: Vec<f64> = record
            .dissimilarities
            .into_iter()
            .flatten()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let vectors = Array2::from_shape_vec((n_rdm, n_pairs), flat)
            .map_err(|e| InferenceError::validation(e.to_string()))?;

        let mut rdms = Rdms::new(vectors)?;
        rdms.dissimilarity_measure = record.dissimilarity_measure;
        rdms.descriptors = record.descriptors;
        for (key, values) in record.rdm_descriptors {
            rdms = rdms.with_rdm_descriptor(key, values)?;
        }
        for (key, values) in record.pattern_descriptors {
            rdms = rdms.with_pattern_descriptor(key, values)?;
        }
        Ok(rdms)
    }
}

impl From<&Rdms> for RdmsRecord {
    fn from(rdms: &Rdms) -> Self {
        Self {
            dissimilarities: rdms
                .dissimilarities
                .axis_iter(Axis(0))
                .map(|row| row.iter().map(|&v| (!v.is_nan()).then_some(v)).collect())
                .collect(),
            dissimilarity_measure: rdms.dissimilarity_measure.clone(),
            descriptors: rdms.descriptors.clone(),
            rdm_descriptors: rdms.rdm_descriptors.clone(),
            pattern_descriptors: rdms.pattern_descriptors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_json::json;

    #[test]
    fn test_new_infers_condition_count() {
        let rdms = Rdms::new(Array2::zeros((4, 6))).unwrap();
        assert_eq!(rdms.n_rdm(), 4);
        assert_eq!(rdms.n_cond(), 4);
        assert_eq!(rdms.n_pairs(), 6);
    }

    #[test]
    fn test_new_rejects_non_triangular_length() {
        let err = Rdms::new(Array2::zeros((2, 5))).unwrap_err();
        assert!(matches!(err, InferenceError::Validation(_)));
    }

    #[test]
    fn test_vector_matrix_conversion() {
        let v = array![1.0, 2.0, 3.0];
        let m = vector_to_matrix(v.view()).unwrap();
        assert_eq!(m, array![[0.0, 1.0, 2.0], [1.0, 0.0, 3.0], [2.0, 3.0, 0.0]]);
        assert_eq!(matrix_to_vector(m.view()).unwrap(), v);
    }

    #[test]
    fn test_from_matrices_matches_vectors() {
        let rdms = Rdms::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let mats = rdms.matrices();
        let back = Rdms::from_matrices(mats.view()).unwrap();
        assert_eq!(back.vectors(), rdms.vectors());
    }

    #[test]
    fn test_descriptor_lengths_checked() {
        let rdms = Rdms::new(Array2::zeros((2, 3))).unwrap();
        assert!(
            rdms.clone()
                .with_rdm_descriptor("subject", vec![json!(1), json!(2)])
                .is_ok()
        );
        let err = rdms
            .with_pattern_descriptor("stim", vec![json!(0), json!(1)])
            .unwrap_err();
        assert!(matches!(err, InferenceError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_rank_transform_keeps_missing() {
        let rdms = Rdms::new(array![[0.5, f64::NAN, 0.1]]).unwrap();
        let ranked = rdms.rank_transform();
        let v = ranked.vectors();
        assert_eq!(v[[0, 0]], 2.0);
        assert!(v[[0, 1]].is_nan());
        assert_eq!(v[[0, 2]], 1.0);
    }

    #[test]
    fn test_record_round_trip_with_missing() {
        let json = r#"{
            "dissimilarities": [[1.0, null, 3.0], [2.0, 2.0, 2.0]],
            "dissimilarity_measure": "euclidean",
            "rdm_descriptors": {"subject": ["s1", "s2"]},
            "pattern_descriptors": {"stim": [0, 1, 2]}
        }"#;
        let record: RdmsRecord = serde_json::from_str(json).unwrap();
        let rdms = Rdms::try_from(record).unwrap();
        assert!(rdms.vectors()[[0, 1]].is_nan());
        assert_eq!(rdms.dissimilarity_measure(), Some("euclidean"));

        let back = RdmsRecord::from(&rdms);
        assert_eq!(back.dissimilarities[0], vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(back.pattern_descriptors["stim"].len(), 3);
    }

    #[test]
    fn test_record_rejects_ragged_rows() {
        let record = RdmsRecord {
            dissimilarities: vec![vec![Some(1.0); 3], vec![Some(1.0); 6]],
            ..Default::default()
        };
        assert!(Rdms::try_from(record).is_err());
    }
}
