pub mod flow;
pub mod propagation;

pub use flow::{
    calculate_target_confidence, upstream_modules, validate_product_recommendation_confidence,
    RecommendationDecision, CONFIDENCE_FLOW_GRAPH,
};
pub use propagation::{
    calculate_propagated_confidence, AggregationMethod, AnalysisModule, AppliedDecay,
    ConfidenceResult, ConfidenceSource, ConfidenceThreshold, PropagationOptions, DEPTH_DECAY,
};
