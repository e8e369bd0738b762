//! Feature-vector reconstruction against the trained column schema
//!
//! The scaler and classifier were fit offline on a fixed, ordered set of
//! columns: six numeric measurements plus one-hot indicator columns derived
//! from the soil and crop category names (`Soil_Type_<name>`,
//! `Crop_Type_<name>`). Every prediction request rebuilds a single row in
//! exactly that order. Numeric column positions are resolved once at startup;
//! a missing numeric column is a configuration error, never a per-request
//! failure.
//!
//! A soil or crop name whose derived one-hot column is absent from the schema
//! is NOT an error: the category encodes as all-zero and the request
//! proceeds. The caller is told via the returned flags so the miss can be
//! counted.

use std::collections::HashMap;

use crate::error::{AbonarError, Result};

/// Column name prefix for soil one-hot indicators
pub const SOIL_PREFIX: &str = "Soil_Type_";
/// Column name prefix for crop one-hot indicators
pub const CROP_PREFIX: &str = "Crop_Type_";

/// The six numeric input columns, in request-field order
///
/// "Temparature" is the spelling the model was trained with; it is part of
/// the wire contract and must not be corrected.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "Temparature",
    "Humidity",
    "Moisture",
    "Nitrogen",
    "Potassium",
    "Phosphorous",
];

/// Decoded prediction input: six measurements and two category IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendInput {
    /// Temperature measurement
    pub temparature: i64,
    /// Relative humidity measurement
    pub humidity: i64,
    /// Soil moisture measurement
    pub moisture: i64,
    /// Soil type category ID
    pub soil_type_id: i64,
    /// Crop type category ID
    pub crop_type_id: i64,
    /// Nitrogen content
    pub nitrogen: i64,
    /// Potassium content
    pub potassium: i64,
    /// Phosphorous content
    pub phosphorous: i64,
}

/// Ordered feature-column schema with numeric positions resolved
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<String>,
    by_name: HashMap<String, usize>,
    numeric_positions: [usize; 6],
}

impl FeatureSchema {
    /// Build the schema from the trained column list
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if any of the six numeric columns is
    /// absent or a column name appears twice.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if by_name.insert(name.clone(), idx).is_some() {
                return Err(AbonarError::InvalidConfiguration {
                    reason: format!("duplicate column in schema: {name}"),
                });
            }
        }

        let mut numeric_positions = [0usize; 6];
        for (slot, name) in NUMERIC_COLUMNS.iter().enumerate() {
            numeric_positions[slot] =
                *by_name
                    .get(*name)
                    .ok_or_else(|| AbonarError::InvalidConfiguration {
                        reason: format!("required numeric column missing from schema: {name}"),
                    })?;
        }

        Ok(Self {
            columns,
            by_name,
            numeric_positions,
        })
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema is empty (never true for a validated schema)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in schema order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by name
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

/// A feature row built for one request, plus one-hot encoding outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRow {
    /// Feature values, one per schema column, in schema order
    pub values: Vec<f32>,
    /// Whether the soil one-hot column existed in the schema
    pub soil_encoded: bool,
    /// Whether the crop one-hot column existed in the schema
    pub crop_encoded: bool,
}

/// Builds schema-aligned feature rows from decoded inputs
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    schema: FeatureSchema,
}

impl FeatureVectorBuilder {
    /// Create a builder over a validated schema
    #[must_use]
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    /// The underlying schema
    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Build a single feature row for `input` with the resolved category names
    ///
    /// All columns start at zero; the six numeric fields are written into
    /// their like-named columns, then the soil and crop one-hot columns are
    /// set to 1 when present in the schema. An absent one-hot column leaves
    /// its category all-zero and is reported through the returned flags.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(&self, input: &RecommendInput, soil_name: &str, crop_name: &str) -> EncodedRow {
        let mut values = vec![0.0f32; self.schema.len()];

        let numeric = [
            input.temparature,
            input.humidity,
            input.moisture,
            input.nitrogen,
            input.potassium,
            input.phosphorous,
        ];
        for (slot, value) in numeric.iter().enumerate() {
            values[self.schema.numeric_positions[slot]] = *value as f32;
        }

        let soil_col = format!("{SOIL_PREFIX}{soil_name}");
        let soil_encoded = match self.schema.position(&soil_col) {
            Some(idx) => {
                values[idx] = 1.0;
                true
            }
            None => false,
        };

        let crop_col = format!("{CROP_PREFIX}{crop_name}");
        let crop_encoded = match self.schema.position(&crop_col) {
            Some(idx) => {
                values[idx] = 1.0;
                true
            }
            None => false,
        };

        EncodedRow {
            values,
            soil_encoded,
            crop_encoded,
        }
    }
}
