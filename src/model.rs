//! High-level model bundle for training and inference.
//!
//! A [`Model`] pairs the trained forest with the [`FeatureSchema`] it was
//! fit on. The two always travel together: the artifact on disk stores
//! them as one payload, and every prediction first aligns its input to
//! the stored schema. Loading a model and predicting on a table never
//! requires knowledge of the training data beyond the artifact itself.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{DataError, Frame};
use crate::features::{align_to_schema, derive_features, FeatureSchema};
use crate::forest::{FitError, RandomForest, RandomForestParams};
use crate::io::{self, DeserializeError, SerializeError};

/// Categorical column expanded into indicator features.
pub const DEFAULT_CATEGORICAL_COLUMN: &str = "ocean_proximity";

/// Label column predicted by the model.
pub const DEFAULT_LABEL_COLUMN: &str = "median_house_value";

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while training a model.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    /// The training table is unusable (missing label, non-numeric column).
    #[error(transparent)]
    Data(#[from] DataError),

    /// Forest fitting rejected the derived matrix.
    #[error(transparent)]
    Fit(#[from] FitError),
}

// =============================================================================
// Model
// =============================================================================

/// A trained regressor together with its feature schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    forest: RandomForest,
    schema: FeatureSchema,
}

/// On-disk payload: the `model`/`columns` pair inside the artifact.
#[derive(Serialize)]
struct PayloadRef<'a> {
    model: &'a RandomForest,
    columns: &'a [String],
}

#[derive(Deserialize)]
struct Payload {
    model: RandomForest,
    columns: Vec<String>,
}

impl Model {
    /// Train a model on a labeled frame.
    ///
    /// Derives the feature matrix and schema (indicator expansion of
    /// `categorical_col`, label removal) and fits the forest on it.
    pub fn fit(
        frame: &Frame,
        categorical_col: &str,
        label_col: &str,
        params: &RandomForestParams,
    ) -> Result<Self, TrainError> {
        let (matrix, schema) = derive_features(frame, categorical_col, label_col)?;
        let targets = frame.numeric(label_col)?;

        log::info!(
            "training random forest on {} rows, {} features",
            matrix.n_rows(),
            matrix.n_cols()
        );
        let forest = RandomForest::fit(&matrix, targets, params)?;
        log::info!("model training complete");

        Ok(Self { forest, schema })
    }

    /// Predict one value per row of `frame`, in input row order.
    ///
    /// The frame is aligned to the stored schema first, so extra columns,
    /// missing indicator columns and unseen category values never fail.
    pub fn predict(&self, frame: &Frame, categorical_col: &str) -> Vec<f32> {
        let matrix = align_to_schema(frame, categorical_col, &self.schema);
        self.forest.predict(&matrix)
    }

    /// The schema recorded at training time.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// The trained forest.
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Write the model + schema artifact, creating parent directories and
    /// replacing any previous artifact at `path`.
    pub fn save(&self, path: &Path) -> Result<(), SerializeError> {
        let payload = PayloadRef {
            model: &self.forest,
            columns: self.schema.columns(),
        };
        io::write_artifact(
            path,
            self.schema.len() as u32,
            self.forest.n_trees() as u32,
            &payload,
        )?;
        log::info!("model saved to {}", path.display());
        Ok(())
    }

    /// Load a model + schema artifact from disk.
    pub fn load(path: &Path) -> Result<Self, DeserializeError> {
        let (_, payload): (_, Payload) = io::read_artifact(path)?;
        Ok(Self {
            forest: payload.model,
            schema: FeatureSchema::new(payload.columns),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
