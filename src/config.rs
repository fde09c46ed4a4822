use std::path::PathBuf;

use crate::constants::policy;
use crate::errors::QaError;
use crate::record::{ImageDimensions, Modality};
use crate::types::LabelValue;

/// Optional closed label sets per modality.
///
/// When a set is present, labels outside it are flagged (never rewritten);
/// an absent set disables the check for that modality.
#[derive(Clone, Debug, Default)]
pub struct LabelSets {
    /// Allowed image category names.
    pub image: Option<Vec<LabelValue>>,
    /// Allowed text labels.
    pub text: Option<Vec<LabelValue>>,
}

/// Engine policy configuration.
///
/// Every field defaults to the fixed business rule stated in the
/// annotation guidelines; overriding them is possible but the defaults are
/// the documented behavior.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Minimum box width/height in pixels after clipping.
    pub min_box_size: f64,
    /// Dimensions substituted when an image entry omits width/height.
    pub default_dimensions: ImageDimensions,
    /// Minimum diarization segment length in seconds.
    pub min_segment_seconds: f64,
    /// Annotator count required before majority rule applies.
    pub majority_quorum: usize,
    /// Relative tolerance when checking declared vs computed box area.
    pub area_tolerance: f64,
    /// Visibility fraction below which a record is excluded.
    pub visibility_threshold: f64,
    /// Max/min label-count ratio above which class imbalance is reported.
    pub imbalance_ratio_limit: f64,
    /// Closed label sets; absent sets disable the check.
    pub label_sets: LabelSets,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_box_size: policy::MIN_BOX_SIZE_PX,
            default_dimensions: ImageDimensions {
                width: policy::DEFAULT_IMAGE_WIDTH,
                height: policy::DEFAULT_IMAGE_HEIGHT,
            },
            min_segment_seconds: policy::MIN_SEGMENT_SECONDS,
            majority_quorum: policy::MAJORITY_QUORUM,
            area_tolerance: policy::AREA_TOLERANCE,
            visibility_threshold: policy::VISIBILITY_THRESHOLD,
            imbalance_ratio_limit: policy::IMBALANCE_RATIO_LIMIT,
            label_sets: LabelSets::default(),
        }
    }
}

impl EngineConfig {
    /// Reject configurations the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), QaError> {
        if self.min_box_size <= 0.0 || !self.min_box_size.is_finite() {
            return Err(QaError::Configuration(format!(
                "min_box_size must be a positive number, got {}",
                self.min_box_size
            )));
        }
        if self.default_dimensions.width == 0 || self.default_dimensions.height == 0 {
            return Err(QaError::Configuration(
                "default_dimensions must be non-zero".to_string(),
            ));
        }
        if self.min_segment_seconds < 0.0 || !self.min_segment_seconds.is_finite() {
            return Err(QaError::Configuration(format!(
                "min_segment_seconds must be non-negative, got {}",
                self.min_segment_seconds
            )));
        }
        if self.majority_quorum < 2 {
            return Err(QaError::Configuration(format!(
                "majority_quorum must be at least 2, got {}",
                self.majority_quorum
            )));
        }
        if self.area_tolerance < 0.0 || !self.area_tolerance.is_finite() {
            return Err(QaError::Configuration(format!(
                "area_tolerance must be non-negative, got {}",
                self.area_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(QaError::Configuration(format!(
                "visibility_threshold must be within 0.0..=1.0, got {}",
                self.visibility_threshold
            )));
        }
        if self.imbalance_ratio_limit <= 1.0 || !self.imbalance_ratio_limit.is_finite() {
            return Err(QaError::Configuration(format!(
                "imbalance_ratio_limit must exceed 1.0, got {}",
                self.imbalance_ratio_limit
            )));
        }
        Ok(())
    }

    /// Closed label set for a modality, when one is configured.
    pub fn label_set(&self, modality: Modality) -> Option<&[LabelValue]> {
        match modality {
            Modality::Image => self.label_sets.image.as_deref(),
            Modality::Text => self.label_sets.text.as_deref(),
            Modality::Audio => None,
        }
    }
}

/// Entry-point mapping of modality to annotation source paths.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    /// COCO-style JSON documents with image annotations.
    pub image_annotations: Vec<PathBuf>,
    /// CSV files with text annotations (`text,label,confidence,notes`).
    pub text_annotations: Vec<PathBuf>,
    /// CSV files with audio annotations
    /// (`audio_file,start_time,end_time,speaker,transcription,confidence`).
    pub audio_annotations: Vec<PathBuf>,
}

impl SourceMap {
    /// Returns `true` when no source paths are configured.
    pub fn is_empty(&self) -> bool {
        self.image_annotations.is_empty()
            && self.text_annotations.is_empty()
            && self.audio_annotations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.min_box_size, 10.0);
        assert_eq!(config.default_dimensions.width, 640);
        assert_eq!(config.default_dimensions.height, 480);
        assert_eq!(config.min_segment_seconds, 1.0);
        assert_eq!(config.majority_quorum, 3);
        assert_eq!(config.area_tolerance, 0.01);
        assert_eq!(config.visibility_threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_nonsense_values() {
        let mut config = EngineConfig {
            min_box_size: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        config.min_box_size = 10.0;
        config.majority_quorum = 1;
        assert!(config.validate().is_err());

        config.majority_quorum = 3;
        config.visibility_threshold = 1.5;
        assert!(config.validate().is_err());

        config.visibility_threshold = 0.5;
        config.imbalance_ratio_limit = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn label_set_lookup_is_per_modality() {
        let config = EngineConfig {
            label_sets: LabelSets {
                image: Some(vec!["cat".to_string()]),
                text: None,
            },
            ..EngineConfig::default()
        };
        assert_eq!(config.label_set(Modality::Image), Some(&["cat".to_string()][..]));
        assert_eq!(config.label_set(Modality::Text), None);
        assert_eq!(config.label_set(Modality::Audio), None);
    }
}
