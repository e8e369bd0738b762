//! Artifact store: serialized model objects loaded at process start
//!
//! Four JSON artifacts make up a trained bundle, produced by the offline
//! training pipeline:
//!
//! - `model.json` - one-vs-rest linear classifier (weights, intercepts, class codes)
//! - `scaler.json` - fitted standardization transform (means, scales)
//! - `columns.json` - ordered feature-column list the model was fit on
//! - `mappings.json` - soil/crop/fertilizer name-to-code mappings, in insertion order
//!
//! Any missing or corrupt artifact is fatal at startup. Cross-artifact shape
//! validation also happens here, so a bundle that loads is a bundle that can
//! serve every well-formed request without configuration failures.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AbonarError, Result};
use crate::features::{FeatureSchema, FeatureVectorBuilder};
use crate::mapper::{CategoryEntry, CategoryMapper};
use crate::model::{LinearClassifier, StandardScaler};

/// Classifier artifact file name
pub const MODEL_FILE: &str = "model.json";
/// Scaler artifact file name
pub const SCALER_FILE: &str = "scaler.json";
/// Column schema artifact file name
pub const COLUMNS_FILE: &str = "columns.json";
/// Category mappings artifact file name
pub const MAPPINGS_FILE: &str = "mappings.json";

/// The three category mappings as stored in `mappings.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mappings {
    /// Soil type name-to-code entries, in training insertion order
    pub soil_types: Vec<CategoryEntry>,
    /// Crop type name-to-code entries, in training insertion order
    pub crop_types: Vec<CategoryEntry>,
    /// Fertilizer name-to-code entries, in training insertion order
    pub fertilizers: Vec<CategoryEntry>,
}

/// Immutable trained bundle shared read-only by all requests
#[derive(Debug, Clone)]
pub struct Artifacts {
    /// Trained classifier
    pub classifier: LinearClassifier,
    /// Fitted feature scaler
    pub scaler: StandardScaler,
    /// Feature-row builder over the trained column schema
    pub builder: FeatureVectorBuilder,
    /// Category lookups for all three domains
    pub mapper: CategoryMapper,
}

impl Artifacts {
    /// Load and validate all four artifacts from a directory
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` when a file is missing or fails to parse and
    /// `InvalidConfiguration` when the loaded objects are mutually
    /// inconsistent (schema/shape mismatches, duplicate category codes,
    /// missing numeric columns). All of these abort startup.
    pub fn load(dir: &Path) -> Result<Self> {
        let classifier: LinearClassifier = read_json(&dir.join(MODEL_FILE))?;
        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
        let columns: Vec<String> = read_json(&dir.join(COLUMNS_FILE))?;
        let mappings: Mappings = read_json(&dir.join(MAPPINGS_FILE))?;

        let schema = FeatureSchema::new(columns)?;
        classifier.validate(schema.len())?;
        scaler.validate(schema.len())?;
        let mapper = CategoryMapper::new(
            mappings.soil_types,
            mappings.crop_types,
            mappings.fertilizers,
        )?;

        Ok(Self {
            classifier,
            scaler,
            builder: FeatureVectorBuilder::new(schema),
            mapper,
        })
    }

    /// The trained column schema
    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        self.builder.schema()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|e| AbonarError::ArtifactError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&data).map_err(|e| AbonarError::ArtifactError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::NUMERIC_COLUMNS;
    use tempfile::TempDir;

    fn entry(name: &str, code: i64) -> CategoryEntry {
        CategoryEntry {
            name: name.to_string(),
            code,
        }
    }

    /// Write a minimal consistent bundle: 8 columns (6 numeric + 2 one-hot),
    /// 2 fertilizer classes.
    fn write_bundle(dir: &Path) {
        let columns: Vec<String> = NUMERIC_COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain(["Soil_Type_Loamy".to_string(), "Crop_Type_Sugarcane".to_string()])
            .collect();
        let n = columns.len();

        let classifier = LinearClassifier {
            weights: vec![vec![0.1; n], vec![0.2; n]],
            intercepts: vec![0.0, 0.0],
            classes: vec![0, 1],
        };
        let scaler = StandardScaler {
            means: vec![0.0; n],
            scales: vec![1.0; n],
        };
        let mappings = Mappings {
            soil_types: vec![entry("Loamy", 2), entry("Sandy", 0)],
            crop_types: vec![entry("Sugarcane", 10)],
            fertilizers: vec![entry("Urea", 0), entry("DAP", 1)],
        };

        fs::write(
            dir.join(MODEL_FILE),
            serde_json::to_string(&classifier).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.join(SCALER_FILE),
            serde_json::to_string(&scaler).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.join(COLUMNS_FILE),
            serde_json::to_string(&columns).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.join(MAPPINGS_FILE),
            serde_json::to_string(&mappings).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_load_valid_bundle() {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path());

        let artifacts = Artifacts::load(dir.path()).expect("bundle loads");
        assert_eq!(artifacts.schema().len(), 8);
        assert_eq!(artifacts.classifier.classes, vec![0, 1]);
        assert_eq!(
            artifacts
                .mapper
                .entries(crate::mapper::Domain::Soil)
                .len(),
            2
        );
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path());
        fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

        let err = Artifacts::load(dir.path()).unwrap_err();
        match err {
            AbonarError::ArtifactError { path, .. } => assert!(path.contains(SCALER_FILE)),
            other => panic!("expected ArtifactError, got {other}"),
        }
    }

    #[test]
    fn test_corrupt_artifact_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path());
        fs::write(dir.path().join(MODEL_FILE), "{not json").unwrap();

        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(matches!(err, AbonarError::ArtifactError { .. }));
    }

    #[test]
    fn test_scaler_shape_mismatch_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path());
        let bad = StandardScaler {
            means: vec![0.0; 3],
            scales: vec![1.0; 3],
        };
        fs::write(
            dir.path().join(SCALER_FILE),
            serde_json::to_string(&bad).unwrap(),
        )
        .unwrap();

        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(matches!(err, AbonarError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_missing_numeric_column_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path());
        fs::write(
            dir.path().join(COLUMNS_FILE),
            serde_json::to_string(&vec!["Soil_Type_Loamy".to_string()]).unwrap(),
        )
        .unwrap();

        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("required numeric column"));
    }

    #[test]
    fn test_duplicate_mapping_code_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path());
        let bad = Mappings {
            soil_types: vec![entry("Loamy", 2), entry("Sandy", 2)],
            crop_types: vec![entry("Sugarcane", 10)],
            fertilizers: vec![entry("Urea", 0)],
        };
        fs::write(
            dir.path().join(MAPPINGS_FILE),
            serde_json::to_string(&bad).unwrap(),
        )
        .unwrap();

        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate soil category code"));
    }
}
