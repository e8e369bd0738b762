//! Recommendation orchestration
//!
//! Wires the category mapper, feature builder, scaler, and classifier into
//! the single logical operation the HTTP layer exposes: decode category IDs,
//! rebuild the trained feature row, scale, predict, decode the class back to
//! a fertilizer name. Every step is a pure in-memory computation over the
//! immutable artifact bundle, so requests are independent and freely
//! parallel.

use std::sync::Arc;
use std::time::Instant;

use crate::artifact::Artifacts;
use crate::error::{AbonarError, Result};
use crate::features::RecommendInput;
use crate::mapper::{CategoryEntry, Domain};
use crate::metrics::MetricsCollector;

/// A fertilizer recommendation: the decoded name and the raw class code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Recommended fertilizer name
    pub fertilizer: String,
    /// Model class code the name was decoded from
    pub class_code: i64,
}

/// Stateless-per-request service over the shared artifact bundle
#[derive(Debug, Clone)]
pub struct RecommendationService {
    artifacts: Arc<Artifacts>,
    metrics: Arc<MetricsCollector>,
}

impl RecommendationService {
    /// Create a service over a loaded artifact bundle
    #[must_use]
    pub fn new(artifacts: Arc<Artifacts>, metrics: Arc<MetricsCollector>) -> Self {
        Self { artifacts, metrics }
    }

    /// The shared artifact bundle
    #[must_use]
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// The shared metrics collector
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Produce a fertilizer recommendation for a validated input
    ///
    /// # Errors
    ///
    /// Returns `InvalidCategory` when the soil or crop ID has no reverse
    /// mapping (the classifier is never invoked in that case) and
    /// `UnmappablePrediction` when the predicted class code has no
    /// fertilizer mapping.
    pub fn recommend(&self, input: &RecommendInput) -> Result<Recommendation> {
        let result = self.recommend_inner(input);
        match &result {
            Ok(_) => {}
            Err(AbonarError::InvalidCategory { .. }) => self.metrics.record_invalid_category(),
            Err(AbonarError::UnmappablePrediction { .. }) => {
                self.metrics.record_unmappable_prediction();
            }
            Err(_) => {}
        }
        result
    }

    fn recommend_inner(&self, input: &RecommendInput) -> Result<Recommendation> {
        let mapper = &self.artifacts.mapper;
        let soil_name = mapper.name(Domain::Soil, input.soil_type_id)?;
        let crop_name = mapper.name(Domain::Crop, input.crop_type_id)?;

        let row = self.artifacts.builder.build(input, soil_name, crop_name);
        if !row.soil_encoded {
            self.metrics.record_unknown_soil_encoding();
        }
        if !row.crop_encoded {
            self.metrics.record_unknown_crop_encoding();
        }

        let inference_start = Instant::now();
        let scaled = self.artifacts.scaler.transform(&row.values);
        let class_code = self.artifacts.classifier.predict(&scaled);
        let inference_time = inference_start.elapsed();

        let fertilizer = mapper.name(Domain::Fertilizer, class_code)?.to_string();
        self.metrics.record_success(inference_time);

        Ok(Recommendation {
            fertilizer,
            class_code,
        })
    }

    /// Soil and crop category listings, in mapping-insertion order
    #[must_use]
    pub fn list_categories(&self) -> (&[CategoryEntry], &[CategoryEntry]) {
        (
            self.artifacts.mapper.entries(Domain::Soil),
            self.artifacts.mapper.entries(Domain::Crop),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureSchema, FeatureVectorBuilder, NUMERIC_COLUMNS};
    use crate::mapper::CategoryMapper;
    use crate::model::{LinearClassifier, StandardScaler};

    fn entry(name: &str, code: i64) -> CategoryEntry {
        CategoryEntry {
            name: name.to_string(),
            code,
        }
    }

    /// Bundle with 8 columns; the classifier scores the Soil_Type_Loamy
    /// indicator for class 1 ("DAP") and is otherwise biased to class 0
    /// ("Urea").
    fn sample_service() -> RecommendationService {
        let columns: Vec<String> = NUMERIC_COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain([
                "Soil_Type_Loamy".to_string(),
                "Crop_Type_Sugarcane".to_string(),
            ])
            .collect();
        let n = columns.len();
        let schema = FeatureSchema::new(columns).expect("schema builds");

        let mut loamy_row = vec![0.0f32; n];
        loamy_row[6] = 10.0;
        let classifier = LinearClassifier {
            weights: vec![vec![0.0; n], loamy_row],
            intercepts: vec![1.0, 0.0],
            classes: vec![0, 1],
        };
        let scaler = StandardScaler {
            means: vec![0.0; n],
            scales: vec![1.0; n],
        };
        let mapper = CategoryMapper::new(
            vec![entry("Loamy", 2), entry("Sandy", 0)],
            vec![entry("Sugarcane", 10), entry("Maize", 3)],
            vec![entry("Urea", 0), entry("DAP", 1)],
        )
        .expect("mapper builds");

        let artifacts = Artifacts {
            classifier,
            scaler,
            builder: FeatureVectorBuilder::new(schema),
            mapper,
        };
        RecommendationService::new(Arc::new(artifacts), Arc::new(MetricsCollector::new()))
    }

    fn input(soil: i64, crop: i64) -> RecommendInput {
        RecommendInput {
            temparature: 34,
            humidity: 65,
            moisture: 54,
            soil_type_id: soil,
            crop_type_id: crop,
            nitrogen: 38,
            potassium: 0,
            phosphorous: 0,
        }
    }

    #[test]
    fn test_recommend_returns_mapped_fertilizer() {
        let service = sample_service();
        let rec = service.recommend(&input(2, 10)).expect("recommendation");
        assert_eq!(rec.fertilizer, "DAP");
        assert_eq!(rec.class_code, 1);
        assert_eq!(service.metrics().snapshot().successful_requests, 1);
    }

    #[test]
    fn test_recommend_is_idempotent() {
        let service = sample_service();
        let first = service.recommend(&input(2, 10)).expect("first");
        let second = service.recommend(&input(2, 10)).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_soil_id_rejected_before_inference() {
        let service = sample_service();
        let err = service.recommend(&input(999, 10)).unwrap_err();
        assert!(matches!(
            err,
            AbonarError::InvalidCategory {
                domain: "soil",
                id: 999
            }
        ));
        let snapshot = service.metrics().snapshot();
        assert_eq!(snapshot.invalid_category_rejections, 1);
        // Inference never ran: no success, no inference time.
        assert_eq!(snapshot.successful_requests, 0);
        assert_eq!(snapshot.total_inference_time_us, 0);
    }

    #[test]
    fn test_unknown_crop_id_rejected() {
        let service = sample_service();
        let err = service.recommend(&input(2, 777)).unwrap_err();
        assert!(matches!(
            err,
            AbonarError::InvalidCategory {
                domain: "crop",
                id: 777
            }
        ));
    }

    #[test]
    fn test_degraded_encoding_still_serves_and_counts() {
        let service = sample_service();
        // Sandy (id 0) has no Soil_Type_Sandy column in this schema: the row
        // encodes all-zero for soil and class 0 ("Urea") wins on intercept.
        let rec = service.recommend(&input(0, 10)).expect("recommendation");
        assert_eq!(rec.fertilizer, "Urea");

        let snapshot = service.metrics().snapshot();
        assert_eq!(snapshot.unknown_soil_encodings, 1);
        assert_eq!(snapshot.unknown_crop_encodings, 0);
        assert_eq!(snapshot.successful_requests, 1);
    }

    #[test]
    fn test_list_categories_order_and_stability() {
        let service = sample_service();
        let (soil_a, crop_a) = service.list_categories();
        let (soil_b, crop_b) = service.list_categories();
        assert_eq!(soil_a, soil_b);
        assert_eq!(crop_a, crop_b);
        assert_eq!(soil_a[0].name, "Loamy");
        assert_eq!(soil_a[1].name, "Sandy");
        assert_eq!(crop_a[0].code, 10);
    }

    #[test]
    fn test_recommendation_name_is_in_fertilizer_domain() {
        let service = sample_service();
        for (soil, crop) in [(2, 10), (2, 3), (0, 10), (0, 3)] {
            let rec = service.recommend(&input(soil, crop)).expect("recommendation");
            assert!(service
                .artifacts()
                .mapper
                .code(Domain::Fertilizer, &rec.fertilizer)
                .is_some());
            assert!(!rec.fertilizer.is_empty());
        }
    }
}
