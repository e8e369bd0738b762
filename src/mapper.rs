//! Category name/code mappings for soil, crop, and fertilizer domains
//!
//! Each domain carries a forward (name to code) and reverse (code to name)
//! lookup built once from the artifact store's ordered entry lists. The
//! ordered lists are kept alongside the lookup tables so category listings
//! reproduce mapping-insertion order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AbonarError, Result};

/// A single category mapping row: human-readable name and model-facing code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Category name (e.g. "Loamy", "Sugarcane")
    pub name: String,
    /// Integer code the model was trained with
    pub code: i64,
}

/// Category domain selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Soil type categories
    Soil,
    /// Crop type categories
    Crop,
    /// Fertilizer (prediction target) categories
    Fertilizer,
}

impl Domain {
    /// Lowercase domain label used in error messages
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Soil => "soil",
            Self::Crop => "crop",
            Self::Fertilizer => "fertilizer",
        }
    }
}

/// One domain's entries plus its lookup tables
#[derive(Debug, Clone)]
struct DomainMap {
    entries: Vec<CategoryEntry>,
    by_name: HashMap<String, i64>,
    by_code: HashMap<i64, String>,
}

impl DomainMap {
    /// Build lookup tables, failing fast on duplicate names or codes
    fn build(domain: Domain, entries: Vec<CategoryEntry>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut by_code = HashMap::with_capacity(entries.len());
        for entry in &entries {
            if by_name.insert(entry.name.clone(), entry.code).is_some() {
                return Err(AbonarError::InvalidConfiguration {
                    reason: format!(
                        "duplicate {} category name: {}",
                        domain.label(),
                        entry.name
                    ),
                });
            }
            if by_code.insert(entry.code, entry.name.clone()).is_some() {
                return Err(AbonarError::InvalidConfiguration {
                    reason: format!("duplicate {} category code: {}", domain.label(), entry.code),
                });
            }
        }
        Ok(Self {
            entries,
            by_name,
            by_code,
        })
    }
}

/// Bidirectional category lookups for all three domains
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    soil: DomainMap,
    crop: DomainMap,
    fertilizer: DomainMap,
}

impl CategoryMapper {
    /// Build the mapper from the three forward mappings
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if any domain contains a duplicate
    /// name or code (the reverse mapping would be ill-defined).
    pub fn new(
        soil: Vec<CategoryEntry>,
        crop: Vec<CategoryEntry>,
        fertilizer: Vec<CategoryEntry>,
    ) -> Result<Self> {
        Ok(Self {
            soil: DomainMap::build(Domain::Soil, soil)?,
            crop: DomainMap::build(Domain::Crop, crop)?,
            fertilizer: DomainMap::build(Domain::Fertilizer, fertilizer)?,
        })
    }

    fn domain(&self, domain: Domain) -> &DomainMap {
        match domain {
            Domain::Soil => &self.soil,
            Domain::Crop => &self.crop,
            Domain::Fertilizer => &self.fertilizer,
        }
    }

    /// Reverse-map a code to its category name
    ///
    /// # Errors
    ///
    /// Soil and crop misses are `InvalidCategory` (a client supplied an
    /// unknown ID); fertilizer misses are `UnmappablePrediction` (the model
    /// produced a class outside the trained target vocabulary).
    pub fn name(&self, domain: Domain, code: i64) -> Result<&str> {
        self.domain(domain)
            .by_code
            .get(&code)
            .map(String::as_str)
            .ok_or(match domain {
                Domain::Soil | Domain::Crop => AbonarError::InvalidCategory {
                    domain: domain.label(),
                    id: code,
                },
                Domain::Fertilizer => AbonarError::UnmappablePrediction { class_code: code },
            })
    }

    /// Forward-map a category name to its code, if present
    #[must_use]
    pub fn code(&self, domain: Domain, name: &str) -> Option<i64> {
        self.domain(domain).by_name.get(name).copied()
    }

    /// All entries of a domain in mapping-insertion order
    #[must_use]
    pub fn entries(&self, domain: Domain) -> &[CategoryEntry] {
        &self.domain(domain).entries
    }
}
