//! Classifier and scaler inference primitives
//!
//! The trained model ships as a one-vs-rest linear classifier: one weight row
//! and one intercept per class, plus the class codes the rows correspond to.
//! The scaler is a fitted standardization transform (per-column mean and
//! scale). Both are plain serde structs loaded from the artifact store; all
//! shape validation happens at load time so the per-request hot path is
//! index arithmetic only.

use serde::{Deserialize, Serialize};

use crate::error::{AbonarError, Result};

/// One-vs-rest linear classifier over standardized feature rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    /// Per-class weight rows, each `n_features` wide
    pub weights: Vec<Vec<f32>>,
    /// Per-class intercepts
    pub intercepts: Vec<f32>,
    /// Class codes, aligned with `weights` rows
    pub classes: Vec<i64>,
}

impl LinearClassifier {
    /// Validate internal shape consistency against the feature count
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if any weight row does not match
    /// `n_features`, if `intercepts` or `classes` are misaligned with
    /// `weights`, or if the model has no classes.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.classes.is_empty() {
            return Err(AbonarError::InvalidConfiguration {
                reason: "classifier has no classes".to_string(),
            });
        }
        if self.weights.len() != self.intercepts.len() {
            return Err(AbonarError::InvalidConfiguration {
                reason: format!(
                    "classifier weight rows ({}) and intercepts ({}) are misaligned",
                    self.weights.len(),
                    self.intercepts.len()
                ),
            });
        }
        // A single weight row is the degenerate binary form: score sign
        // selects between exactly two classes.
        let expected_rows = if self.classes.len() == 2 && self.weights.len() == 1 {
            1
        } else {
            self.classes.len()
        };
        if self.weights.len() != expected_rows {
            return Err(AbonarError::InvalidConfiguration {
                reason: format!(
                    "classifier has {} weight rows for {} classes",
                    self.weights.len(),
                    self.classes.len()
                ),
            });
        }
        for (i, row) in self.weights.iter().enumerate() {
            if row.len() != n_features {
                return Err(AbonarError::InvalidConfiguration {
                    reason: format!(
                        "classifier weight row {} has {} entries, expected {}",
                        i,
                        row.len(),
                        n_features
                    ),
                });
            }
        }
        Ok(())
    }

    /// Predict the class code for a single scaled feature row
    ///
    /// Multi-class models take the argmax over per-class scores; the binary
    /// single-row form decides by score sign (negative selects the first
    /// class).
    #[must_use]
    pub fn predict(&self, row: &[f32]) -> i64 {
        if self.weights.len() == 1 && self.classes.len() == 2 {
            let score = dot(&self.weights[0], row) + self.intercepts[0];
            return if score < 0.0 {
                self.classes[0]
            } else {
                self.classes[1]
            };
        }

        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (idx, (w, b)) in self.weights.iter().zip(self.intercepts.iter()).enumerate() {
            let score = dot(w, row) + b;
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }
        self.classes[best_idx]
    }
}

/// Fitted standardization transform: `(x - mean) / scale` per column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-column means
    pub means: Vec<f32>,
    /// Per-column scales (standard deviations)
    pub scales: Vec<f32>,
}

impl StandardScaler {
    /// Validate shape and scale entries against the feature count
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if either vector does not match
    /// `n_features` or any scale entry is zero.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.means.len() != n_features || self.scales.len() != n_features {
            return Err(AbonarError::InvalidConfiguration {
                reason: format!(
                    "scaler has {} means and {} scales, expected {} of each",
                    self.means.len(),
                    self.scales.len(),
                    n_features
                ),
            });
        }
        if let Some(idx) = self.scales.iter().position(|s| *s == 0.0) {
            return Err(AbonarError::InvalidConfiguration {
                reason: format!("scaler has zero scale at column {idx}"),
            });
        }
        Ok(())
    }

    /// Standardize a single feature row
    #[must_use]
    pub fn transform(&self, row: &[f32]) -> Vec<f32> {
        row.iter()
            .zip(self.means.iter())
            .zip(self.scales.iter())
            .map(|((x, mean), scale)| (x - mean) / scale)
            .collect()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
