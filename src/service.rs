use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use chrono::{DateTime, Utc};
use image::RgbImage;
use indexmap::IndexMap;
use serde::Serialize;
use tower::Service;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    analysis::{ClassificationInput, ToneClassifier, TwelveToneResult},
    color::{sample_skin_lab, ImageRegion, LabColor, SampleOptions, SkinSample},
    confidence::{
        calculate_propagated_confidence, calculate_target_confidence,
        validate_product_recommendation_confidence, AnalysisModule, ConfidenceResult,
        ConfidenceSource, PropagationOptions, RecommendationDecision,
    },
    config::Configuration,
    error::{AppError, ConfigError},
    palette::{CharacteristicsTable, PaletteTable, SubtypeCharacteristics, TonePalette},
};

/// What to classify: a color already measured upstream, or a face crop to
/// sample.
#[derive(Debug, Clone)]
pub enum Subject {
    Color(ClassificationInput),
    Image {
        image: Arc<RgbImage>,
        /// Defaults to the center half of the image
        region: Option<ImageRegion>,
    },
}

impl From<ClassificationInput> for Subject {
    fn from(input: ClassificationInput) -> Self {
        Subject::Color(input)
    }
}

impl From<LabColor> for Subject {
    fn from(lab: LabColor) -> Self {
        Subject::Color(ClassificationInput::Lab(lab))
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub id: Uuid,
    pub subject: Subject,
    /// Confidences already reported by the image-quality checks, in the
    /// order they were added
    pub image_quality: IndexMap<AnalysisModule, f64>,
}

impl AnalysisRequest {
    pub fn new(subject: impl Into<Subject>) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            image_quality: IndexMap::new(),
        }
    }

    pub fn with_image_quality(mut self, module: AnalysisModule, confidence: f64) -> Self {
        self.image_quality.insert(module, confidence);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub result: TwelveToneResult,
    pub korean_name: String,
    pub lab: LabColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<SkinSample>,
    pub reasoning: String,
    pub characteristics: SubtypeCharacteristics,
    pub palette: TonePalette,
    /// Confidence the classification inherits from image quality alone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_quality: Option<ConfidenceResult>,
    /// Classifier confidence combined with the image-quality inputs
    pub confidence: ConfidenceResult,
    pub recommendation: RecommendationDecision,
}

/// Classifies a subject and assembles everything a caller shows for it.
pub struct PersonalColorService {
    classifier: ToneClassifier<'static>,
    palettes: &'static PaletteTable,
    characteristics: &'static CharacteristicsTable,
    sampling: SampleOptions,
    propagation: PropagationOptions,
}

impl Default for PersonalColorService {
    fn default() -> Self {
        Self {
            classifier: ToneClassifier::default(),
            palettes: PaletteTable::standard(),
            characteristics: CharacteristicsTable::standard(),
            sampling: SampleOptions::default(),
            propagation: PropagationOptions::default(),
        }
    }
}

impl PersonalColorService {
    pub fn new(configuration: &Configuration) -> Result<Self, ConfigError> {
        configuration.validate()?;
        Ok(Self {
            classifier: ToneClassifier::new(configuration.classifier.clone())?,
            palettes: PaletteTable::standard(),
            characteristics: CharacteristicsTable::standard(),
            sampling: configuration.sampling.clone(),
            propagation: configuration.propagation.options(),
        })
    }

    fn resolve_input(
        &self,
        subject: &Subject,
    ) -> Result<(ClassificationInput, Option<SkinSample>), AppError> {
        match subject {
            Subject::Color(input) => Ok((*input, None)),
            Subject::Image { image, region } => {
                let region = region
                    .unwrap_or_else(|| ImageRegion::center_half(image.width(), image.height()));
                let sample = sample_skin_lab(image, region, &self.sampling)?;
                debug!(
                    pixels = sample.pixel_count,
                    rejected = sample.rejected,
                    "sampled skin region"
                );
                Ok((ClassificationInput::Lab(sample.lab), Some(sample)))
            }
        }
    }

    fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AppError> {
        let (input, sample) = self.resolve_input(&request.subject)?;
        let analysis = self.classifier.analyze(&input);
        let tone = analysis.result.tone;

        let mut sources = vec![ConfidenceSource::new(
            AnalysisModule::PersonalColor,
            analysis.result.confidence,
        )];
        sources.extend(request.image_quality.iter().map(|(module, confidence)| {
            let source = ConfidenceSource::new(module.clone(), *confidence);
            if module.is_image_quality() {
                source.with_depth(1)
            } else {
                source
            }
        }));

        let image_quality = (!request.image_quality.is_empty()).then(|| {
            calculate_target_confidence(&AnalysisModule::PersonalColor, &request.image_quality)
        });
        let confidence = calculate_propagated_confidence(&sources, &self.propagation);
        let recommendation = validate_product_recommendation_confidence(&sources);

        info!(
            request_id = %request.id,
            %tone,
            confidence = analysis.result.confidence,
            propagated = confidence.final_confidence,
            can_recommend = recommendation.can_recommend,
            "analysis complete"
        );

        Ok(AnalysisReport {
            id: request.id,
            created_at: Utc::now(),
            result: analysis.result,
            korean_name: tone.korean_name().to_string(),
            lab: analysis.lab,
            sample,
            reasoning: analysis.reasoning,
            characteristics: self.characteristics.get(tone)?.clone(),
            palette: self.palettes.generate(tone)?,
            image_quality,
            confidence,
            recommendation,
        })
    }
}

impl Service<AnalysisRequest> for PersonalColorService {
    type Response = AnalysisReport;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: AnalysisRequest) -> Self::Future {
        let report = self.analyze(request);

        Box::pin(async move { report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{get_reference_lab, Season, TwelveTone};
    use crate::color::hex_to_lab;
    use crate::error::SampleError;
    use image::{ImageBuffer, Rgb};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_color_request() {
        let request = AnalysisRequest::new(LabColor::new(68.0, 10.0, 22.0));
        let id = request.id;
        let report = PersonalColorService::default().oneshot(request).await.unwrap();

        assert_eq!(report.id, id);
        assert!(matches!(report.result.season, Season::Spring | Season::Autumn));
        assert!(report.result.confidence > 0.0);
        assert_eq!(report.korean_name, report.result.tone.korean_name());
        assert_eq!(report.palette.tone, report.result.tone);
        assert_eq!(report.characteristics.tone, report.result.tone);
        assert!(report.image_quality.is_none());
        assert!(report.sample.is_none());
    }

    #[tokio::test]
    async fn test_image_request_samples_center() {
        let image = ImageBuffer::from_pixel(40, 40, Rgb([224u8, 172, 140]));
        let request = AnalysisRequest::new(Subject::Image {
            image: Arc::new(image),
            region: None,
        });
        let report = PersonalColorService::default().oneshot(request).await.unwrap();

        let sample = report.sample.unwrap();
        assert_eq!(sample.pixel_count, 400);
        let expected = hex_to_lab("#E0AC8C").unwrap();
        assert!((sample.lab.l - expected.l).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_empty_region_is_an_error() {
        let image = ImageBuffer::from_pixel(40, 40, Rgb([224u8, 172, 140]));
        let request = AnalysisRequest::new(Subject::Image {
            image: Arc::new(image),
            region: Some(ImageRegion::new(100, 100, 10, 10)),
        });
        let result = PersonalColorService::default().oneshot(request).await;
        assert!(matches!(result, Err(AppError::Sample(SampleError::EmptyRegion))));
    }

    #[tokio::test]
    async fn test_poor_image_quality_blocks_recommendation() {
        let request = AnalysisRequest::new(get_reference_lab(TwelveTone::TrueWinter))
            .with_image_quality(AnalysisModule::Cie1, 20.0)
            .with_image_quality(AnalysisModule::Cie2, 90.0);
        let report = PersonalColorService::default().oneshot(request).await.unwrap();

        assert_eq!(report.result.tone, TwelveTone::TrueWinter);
        assert!(!report.recommendation.can_recommend);
        assert!(report.recommendation.reason.unwrap().contains("CIE-1"));
        let inherited = report.image_quality.unwrap();
        assert!(inherited.applied_decay.depth);
        assert_eq!(inherited.lowest_source.unwrap().module, AnalysisModule::Cie1);
    }

    #[tokio::test]
    async fn test_service_from_configuration() {
        let mut configuration = Configuration::default();
        configuration.classifier = configuration.classifier.with_neutral_penalty(0.5);
        let mut service = PersonalColorService::new(&configuration).unwrap();

        let report = service
            .call(AnalysisRequest::new(LabColor::new(60.0, 12.0, 14.0)))
            .await
            .unwrap();
        assert!((0.0..=100.0).contains(&report.confidence.final_confidence));

        configuration.propagation.min_threshold = -5.0;
        assert!(PersonalColorService::new(&configuration).is_err());
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let report = PersonalColorService::default()
            .oneshot(AnalysisRequest::new(get_reference_lab(TwelveTone::LightSummer)))
            .await
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["result"]["tone"], "light-summer");
        assert!(json["palette"]["best_colors"].is_array());
        assert!(json.get("sample").is_none());
    }

    #[tokio::test]
    async fn test_same_request_same_report() {
        let request = AnalysisRequest::new(LabColor::new(68.0, 10.0, 22.0))
            .with_image_quality(AnalysisModule::Cie1, 20.0)
            .with_image_quality(AnalysisModule::Cie2, 30.0)
            .with_image_quality(AnalysisModule::Cie3, 10.0)
            .with_image_quality(AnalysisModule::Cie4, 40.0);

        let mut reports = Vec::new();
        for _ in 0..2 {
            let report = PersonalColorService::default()
                .oneshot(request.clone())
                .await
                .unwrap();
            let reason = report.recommendation.reason.clone().unwrap();
            assert!(reason.contains("CIE-1 (20.0), CIE-2 (30.0), CIE-3 (10.0), CIE-4 (40.0)"));

            let mut json = serde_json::to_value(&report).unwrap();
            let object = json.as_object_mut().unwrap();
            object.remove("id");
            object.remove("createdAt");
            reports.push(json);
        }
        assert_eq!(reports[0], reports[1]);
    }
}
