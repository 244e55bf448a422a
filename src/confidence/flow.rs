use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::propagation::{
    calculate_propagated_confidence, AggregationMethod, AnalysisModule, ConfidenceResult,
    ConfidenceSource, ConfidenceThreshold, PropagationOptions,
};

/// Target module → modules whose confidence it inherits.
pub static CONFIDENCE_FLOW_GRAPH: Lazy<HashMap<AnalysisModule, Vec<AnalysisModule>>> =
    Lazy::new(|| {
        use AnalysisModule::*;
        HashMap::from([
            (PersonalColor, vec![Cie1, Cie2, Cie3]),
            (Skin, vec![Cie1, Cie2, Cie3, Cie4]),
            (Body, vec![Cie1, Cie2]),
            (Hair, vec![Cie1, Cie2, Cie3]),
            (Makeup, vec![PersonalColor, Skin, Cie1]),
            (Workout, vec![Body]),
            (Nutrition, vec![Body]),
            (OralHealth, vec![Cie1, Cie2]),
        ])
    });

/// Upstream modules of `target`; empty for modules with no recorded inputs.
pub fn upstream_modules(target: &AnalysisModule) -> &'static [AnalysisModule] {
    CONFIDENCE_FLOW_GRAPH
        .get(target)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Confidence `target` inherits from the scores already available for its
/// upstream modules. Image-quality inputs sit one hop away and take one step
/// of depth decay.
pub fn calculate_target_confidence(
    target: &AnalysisModule,
    source_confidences: &IndexMap<AnalysisModule, f64>,
) -> ConfidenceResult {
    let sources: Vec<ConfidenceSource> = upstream_modules(target)
        .iter()
        .filter_map(|module| {
            source_confidences.get(module).map(|confidence| {
                let source = ConfidenceSource::new(module.clone(), *confidence);
                if module.is_image_quality() {
                    source.with_depth(1)
                } else {
                    source
                }
            })
        })
        .collect();

    debug!(%target, available = sources.len(), "target confidence inputs");
    calculate_propagated_confidence(
        &sources,
        &PropagationOptions::with_method(AggregationMethod::WeightedAverage),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationDecision {
    pub can_recommend: bool,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Product recommendations need the weighted average to reach
/// `PRODUCT_RECOMMENDATION` and every single source to reach `DISPLAY`.
/// A strong average can hide one unreliable module otherwise.
pub fn validate_product_recommendation_confidence(
    sources: &[ConfidenceSource],
) -> RecommendationDecision {
    let options = PropagationOptions {
        min_threshold: ConfidenceThreshold::PRODUCT_RECOMMENDATION,
        ..PropagationOptions::with_method(AggregationMethod::WeightedAverage)
    };
    let result = calculate_propagated_confidence(sources, &options);

    if sources.is_empty() {
        return RecommendationDecision {
            can_recommend: false,
            confidence: result.final_confidence,
            reason: Some("No confidence sources available".to_string()),
        };
    }

    let weak: Vec<&ConfidenceSource> = sources
        .iter()
        .filter(|s| s.confidence.is_nan() || s.confidence < ConfidenceThreshold::DISPLAY)
        .collect();
    if !weak.is_empty() {
        let modules: Vec<String> = weak
            .iter()
            .map(|s| format!("{} ({:.1})", s.module, s.confidence))
            .collect();
        return RecommendationDecision {
            can_recommend: false,
            confidence: result.final_confidence,
            reason: Some(format!(
                "Source confidence below {}: {}",
                ConfidenceThreshold::DISPLAY,
                modules.join(", ")
            )),
        };
    }

    if !result.meets_threshold {
        return RecommendationDecision {
            can_recommend: false,
            confidence: result.final_confidence,
            reason: Some(format!(
                "Overall confidence {:.1} is below {}",
                result.final_confidence,
                ConfidenceThreshold::PRODUCT_RECOMMENDATION
            )),
        };
    }

    RecommendationDecision {
        can_recommend: true,
        confidence: result.final_confidence,
        reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_source_blocks_recommendation() {
        let sources = [ConfidenceSource::new("PC-1", 90.0), ConfidenceSource::new("S-1", 40.0)];
        let decision = validate_product_recommendation_confidence(&sources);
        assert!(!decision.can_recommend);
        let reason = decision.reason.unwrap();
        assert!(reason.contains("S-1"));
        assert!(!reason.contains("PC-1"));
    }

    #[test]
    fn test_strong_sources_recommend() {
        let sources = [ConfidenceSource::new("PC-1", 85.0), ConfidenceSource::new("S-1", 75.0)];
        let decision = validate_product_recommendation_confidence(&sources);
        assert!(decision.can_recommend);
        assert!(decision.reason.is_none());
        assert!(decision.confidence >= ConfidenceThreshold::PRODUCT_RECOMMENDATION);
    }

    #[test]
    fn test_low_average_without_weak_source() {
        let sources = [ConfidenceSource::new("PC-1", 55.0), ConfidenceSource::new("S-1", 52.0)];
        let decision = validate_product_recommendation_confidence(&sources);
        assert!(!decision.can_recommend);
        assert!(decision.reason.unwrap().contains("Overall confidence"));
    }

    #[test]
    fn test_no_sources_cannot_recommend() {
        let decision = validate_product_recommendation_confidence(&[]);
        assert!(!decision.can_recommend);
        assert_eq!(decision.confidence, 0.0);
        assert!(decision.reason.is_some());
    }

    #[test]
    fn test_graph_targets() {
        assert_eq!(upstream_modules(&AnalysisModule::Workout), &[AnalysisModule::Body]);
        assert_eq!(upstream_modules(&AnalysisModule::Skin).len(), 4);
        assert!(upstream_modules(&AnalysisModule::Cie1).is_empty());
    }

    #[test]
    fn test_target_confidence_decays_image_quality_inputs() {
        let scores = IndexMap::from([
            (AnalysisModule::Cie1, 80.0),
            (AnalysisModule::Cie2, 80.0),
            // not an input of PC-1
            (AnalysisModule::Hair, 10.0),
        ]);
        let result = calculate_target_confidence(&AnalysisModule::PersonalColor, &scores);
        assert!((result.final_confidence - 76.0).abs() < 1e-9);
        assert!(result.applied_decay.depth);
        assert_eq!(result.method, AggregationMethod::WeightedAverage);
    }

    #[test]
    fn test_target_confidence_without_decay_for_derived_inputs() {
        let scores = IndexMap::from([(AnalysisModule::Body, 70.0)]);
        let result = calculate_target_confidence(&AnalysisModule::Nutrition, &scores);
        assert_eq!(result.final_confidence, 70.0);
        assert!(!result.applied_decay.depth);
    }

    #[test]
    fn test_target_without_inputs() {
        let result = calculate_target_confidence(&AnalysisModule::Makeup, &IndexMap::new());
        assert_eq!(result.final_confidence, 0.0);
        assert!(!result.meets_threshold);
    }
}
