//! Feature derivation and schema alignment.
//!
//! A regression model trained on an ordered numeric matrix has no concept
//! of column names. If indicator columns were derived independently at
//! inference time, a category value unseen in training would silently
//! shift every later column and corrupt predictions without an error. The
//! defense is to record the exact ordered column set at training time (the
//! [`FeatureSchema`]) and replay it against every prediction-time input:
//!
//! - [`derive_features`] expands the categorical column into indicator
//!   columns and establishes the schema (training side).
//! - [`align_to_schema`] applies the identical expansion to new input and
//!   reconciles the result against a stored schema: schema columns missing
//!   from the input are synthesized as zero, columns not in the schema are
//!   dropped, and output order is exactly the schema's (inference side).
//!
//! The fill/drop reconciliation is deliberately silent: unseen categories
//! at inference are not an error.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::{Column, DataError, Frame};

// ============================================================================
// FeatureSchema
// ============================================================================

/// The ordered column-name sequence a model was trained against.
///
/// Persisted alongside the model in the artifact and replayed at
/// prediction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema from an ordered column-name sequence.
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Column names, in model order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of feature columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// FeatureMatrix
// ============================================================================

/// Row-major feature matrix with named, ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Vec<f32>,
    n_rows: usize,
}

impl FeatureMatrix {
    fn from_columns(columns: Vec<String>, data: Vec<Vec<f32>>, n_rows: usize) -> Self {
        debug_assert_eq!(columns.len(), data.len());
        debug_assert!(data.iter().all(|c| c.len() == n_rows));

        let n_cols = columns.len();
        let mut values = vec![0.0; n_rows * n_cols];
        for (c, col) in data.iter().enumerate() {
            for (r, &v) in col.iter().enumerate() {
                values[r * n_cols + c] = v;
            }
        }

        Self {
            columns,
            values,
            n_rows,
        }
    }

    /// Build a matrix directly from rows of feature values.
    ///
    /// # Panics
    /// Panics if any row's length differs from `columns.len()`.
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f32>]) -> Self {
        let n_cols = columns.len();
        let mut values = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            assert_eq!(row.len(), n_cols, "row length must match column count");
            values.extend_from_slice(row);
        }

        Self {
            columns,
            values,
            n_rows: rows.len(),
        }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names, in matrix order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// One row of feature values.
    pub fn row(&self, row: usize) -> &[f32] {
        let n_cols = self.columns.len();
        &self.values[row * n_cols..(row + 1) * n_cols]
    }

    /// A single cell.
    pub fn value(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.columns.len() + col]
    }

    /// Copy out one column by name, if present.
    pub fn column_values(&self, name: &str) -> Option<Vec<f32>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some((0..self.n_rows).map(|r| self.value(r, idx)).collect())
    }
}

// ============================================================================
// Derivation (training side)
// ============================================================================

/// Derive the feature matrix and schema from a training frame.
///
/// Expands `categorical_col` into indicator columns (one per distinct
/// observed value in lexicographic order, dropping the first as the
/// reference category), removes `label_col`, and records the resulting
/// ordered column set as the schema. Numeric columns keep their table
/// order; indicator columns follow them.
///
/// If `categorical_col` is absent the expansion is skipped with a warning
/// and the schema simply has no indicator columns. A missing `label_col`
/// is an error: training cannot proceed without a target.
pub fn derive_features(
    frame: &Frame,
    categorical_col: &str,
    label_col: &str,
) -> Result<(FeatureMatrix, FeatureSchema), DataError> {
    if !frame.has_column(label_col) {
        return Err(DataError::MissingColumn {
            name: label_col.to_string(),
        });
    }

    let indicators = expand_indicators(frame, categorical_col);
    if indicators.is_none() {
        log::warn!("column '{categorical_col}' not found; skipping indicator expansion");
    }

    let mut names = Vec::new();
    let mut data = Vec::new();

    for col in frame.columns() {
        if col.name() == label_col {
            continue;
        }
        match col {
            Column::Numeric { name, values } => {
                names.push(name.clone());
                data.push(values.clone());
            }
            Column::Categorical { name, .. } => {
                if name == categorical_col {
                    continue;
                }
                return Err(DataError::NotNumeric { name: name.clone() });
            }
        }
    }

    if let Some(expanded) = indicators {
        for (name, values) in expanded {
            names.push(name);
            data.push(values);
        }
    }

    let schema = FeatureSchema::new(names.clone());
    let matrix = FeatureMatrix::from_columns(names, data, frame.n_rows());
    Ok((matrix, schema))
}

// ============================================================================
// Alignment (inference side)
// ============================================================================

/// Align an arbitrary frame to a previously derived schema.
///
/// Applies the same indicator expansion as [`derive_features`], then
/// builds the output strictly from the schema: each schema column takes
/// the matching input column if present and zeros otherwise, and nothing
/// outside the schema survives. Total for any row count: column
/// mismatches are resolved, never raised.
pub fn align_to_schema(
    frame: &Frame,
    categorical_col: &str,
    schema: &FeatureSchema,
) -> FeatureMatrix {
    let n_rows = frame.n_rows();
    let indicators: BTreeMap<String, Vec<f32>> = expand_indicators(frame, categorical_col)
        .map(|cols| cols.into_iter().collect())
        .unwrap_or_default();

    let mut data = Vec::with_capacity(schema.len());
    for name in schema.columns() {
        let values = match frame.column(name) {
            Some(Column::Numeric { values, .. }) => values.clone(),
            _ => match indicators.get(name) {
                Some(values) => values.clone(),
                None => vec![0.0; n_rows],
            },
        };
        data.push(values);
    }

    FeatureMatrix::from_columns(schema.columns().to_vec(), data, n_rows)
}

// ============================================================================
// Indicator expansion
// ============================================================================

/// Expand a categorical column into indicator columns.
///
/// Returns one `(name, values)` pair per distinct observed value in
/// lexicographic order, minus the first (reference) value. Names follow
/// the `<column>_<value>` convention. Returns `None` if the column is
/// absent or not categorical.
fn expand_indicators(frame: &Frame, categorical_col: &str) -> Option<Vec<(String, Vec<f32>)>> {
    let values = match frame.column(categorical_col)? {
        Column::Categorical { values, .. } => values,
        Column::Numeric { .. } => return None,
    };

    // BTreeSet gives the stable lexicographic category order that makes
    // re-runs reproducible.
    let categories: BTreeSet<&str> = values.iter().map(String::as_str).collect();

    let expanded = categories
        .iter()
        .skip(1)
        .map(|cat| {
            let indicator = values
                .iter()
                .map(|v| if v == cat { 1.0 } else { 0.0 })
                .collect();
            (format!("{categorical_col}_{cat}"), indicator)
        })
        .collect();

    Some(expanded)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_csv_from_reader;

    const TRAIN: &str = "\
longitude,median_income,ocean_proximity,median_house_value
-122.1,8.3,NEAR BAY,300000
-121.9,7.2,INLAND,150000
-122.3,5.6,NEAR BAY,260000
-121.5,3.1,NEAR OCEAN,190000
";

    fn train_frame() -> Frame {
        read_csv_from_reader(TRAIN.as_bytes()).unwrap()
    }

    #[test]
    fn derive_drops_label_and_reference_category() {
        let (matrix, schema) = derive_features(&train_frame(), "ocean_proximity", "median_house_value").unwrap();

        // INLAND is lexicographically first and becomes the reference.
        assert_eq!(
            schema.columns(),
            &[
                "longitude".to_string(),
                "median_income".to_string(),
                "ocean_proximity_NEAR BAY".to_string(),
                "ocean_proximity_NEAR OCEAN".to_string(),
            ]
        );
        assert_eq!(matrix.n_rows(), 4);
        assert_eq!(matrix.n_cols(), 4);
        assert_eq!(
            matrix.column_values("ocean_proximity_NEAR BAY").unwrap(),
            vec![1.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn derive_is_deterministic_across_calls() {
        let frame = train_frame();
        let (_, first) = derive_features(&frame, "ocean_proximity", "median_house_value").unwrap();
        for _ in 0..5 {
            let (_, again) = derive_features(&frame, "ocean_proximity", "median_house_value").unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn derive_without_label_is_an_error() {
        let input = "a,b\n1,2\n";
        let frame = read_csv_from_reader(input.as_bytes()).unwrap();
        let err = derive_features(&frame, "ocean_proximity", "median_house_value").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { name } if name == "median_house_value"));
    }

    #[test]
    fn derive_without_categorical_column_degrades_to_numeric_only() {
        let input = "longitude,median_house_value\n-122.1,300000\n-121.9,150000\n";
        let frame = read_csv_from_reader(input.as_bytes()).unwrap();

        let (matrix, schema) = derive_features(&frame, "ocean_proximity", "median_house_value").unwrap();
        assert_eq!(schema.columns(), &["longitude".to_string()]);
        assert_eq!(matrix.n_cols(), 1);
    }

    #[test]
    fn align_fills_missing_indicator_with_zeros() {
        let (_, schema) = derive_features(&train_frame(), "ocean_proximity", "median_house_value").unwrap();

        // No NEAR OCEAN row in the new input, so its indicator column is
        // absent from the expansion and must come back as zeros.
        let input = "longitude,median_income,ocean_proximity\n-120.0,4.4,NEAR BAY\n-120.1,2.2,NEAR BAY\n";
        let frame = read_csv_from_reader(input.as_bytes()).unwrap();

        let aligned = align_to_schema(&frame, "ocean_proximity", &schema);
        assert_eq!(aligned.columns(), schema.columns());
        assert_eq!(
            aligned.column_values("ocean_proximity_NEAR OCEAN").unwrap(),
            vec![0.0, 0.0]
        );
    }

    #[test]
    fn align_drops_unseen_category_without_changing_rows() {
        let (_, schema) = derive_features(&train_frame(), "ocean_proximity", "median_house_value").unwrap();

        let input = "longitude,median_income,ocean_proximity\n-120.0,4.4,ISLAND\n-120.1,2.2,NEAR BAY\n-121.0,3.3,ISLAND\n";
        let frame = read_csv_from_reader(input.as_bytes()).unwrap();

        let aligned = align_to_schema(&frame, "ocean_proximity", &schema);
        assert_eq!(aligned.n_rows(), 3);
        assert_eq!(aligned.columns(), schema.columns());
        assert!(aligned.column_values("ocean_proximity_ISLAND").is_none());
        // Row order is preserved: the NEAR BAY row is still the second one.
        assert_eq!(
            aligned.column_values("ocean_proximity_NEAR BAY").unwrap(),
            vec![0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn align_drops_extra_numeric_columns() {
        let (_, schema) = derive_features(&train_frame(), "ocean_proximity", "median_house_value").unwrap();

        let input = "longitude,median_income,bogus_extra,ocean_proximity\n-120.0,4.4,99.0,INLAND\n";
        let frame = read_csv_from_reader(input.as_bytes()).unwrap();

        let aligned = align_to_schema(&frame, "ocean_proximity", &schema);
        assert_eq!(aligned.columns(), schema.columns());
        assert!(aligned.column_values("bogus_extra").is_none());
    }

    #[test]
    fn align_is_total_on_an_empty_table() {
        let (_, schema) = derive_features(&train_frame(), "ocean_proximity", "median_house_value").unwrap();

        let input = "longitude,median_income,ocean_proximity\n";
        let frame = read_csv_from_reader(input.as_bytes()).unwrap();

        let aligned = align_to_schema(&frame, "ocean_proximity", &schema);
        assert_eq!(aligned.n_rows(), 0);
        assert_eq!(aligned.columns(), schema.columns());
    }

    #[test]
    fn align_matches_derive_on_the_training_table() {
        let frame = train_frame();
        let (matrix, schema) = derive_features(&frame, "ocean_proximity", "median_house_value").unwrap();

        let aligned = align_to_schema(&frame, "ocean_proximity", &schema);
        assert_eq!(aligned, matrix);
    }
}
