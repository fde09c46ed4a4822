use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::types::{LabelValue, LanguageTag, RecordId, SourceRef, SpeakerId};

/// Annotation modality.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Modality {
    Image,
    Text,
    Audio,
}

impl Modality {
    /// Lowercase name used in record ids, keys, and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Image => "image",
            Modality::Text => "text",
            Modality::Audio => "audio",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-tier annotator confidence. Absence defaults to `Medium`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    /// Tolerant parser for the tier names found in source files.
    /// Returns `None` for empty or unrecognized input.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }

    /// Lowercase tier name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Axis-aligned bounding box in pixel units, COCO `[x, y, width, height]` order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Computed area (`width * height`).
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns `true` when every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Pixel dimensions of the owning image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Byte-offset span into the record's source text (`start < end`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Time range in seconds (`start < end`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Segment length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Modality-specific payload of one annotation unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModalityPayload {
    /// Object-detection bounding box over an image.
    Image {
        /// Category name resolved from the COCO category catalog.
        category: LabelValue,
        /// Raw COCO category id (0 means "unknown").
        category_id: i64,
        bbox: BoundingBox,
        image_dimensions: ImageDimensions,
        /// Independently supplied area, checked against `bbox.area()`.
        area: Option<f64>,
        /// COCO crowd-region marker, carried through unchanged.
        iscrowd: bool,
        /// Upstream-estimated visible fraction of the object, 0.0..=1.0.
        visibility: Option<f64>,
    },
    /// Labeled span over a piece of source text.
    Text {
        /// The source text the span indexes into.
        text: String,
        span: Span,
        label: LabelValue,
        language: Option<LanguageTag>,
    },
    /// Diarized, transcribed audio segment.
    Audio {
        time_range: TimeRange,
        speaker: SpeakerId,
        transcription: String,
    },
}

impl ModalityPayload {
    /// Modality tag for this payload.
    pub fn modality(&self) -> Modality {
        match self {
            ModalityPayload::Image { .. } => Modality::Image,
            ModalityPayload::Text { .. } => Modality::Text,
            ModalityPayload::Audio { .. } => Modality::Audio,
        }
    }

    /// Class label used for distribution metrics, when the modality has one.
    pub fn class_label(&self) -> Option<&str> {
        match self {
            ModalityPayload::Image { category, .. } => Some(category),
            ModalityPayload::Text { label, .. } => Some(label),
            ModalityPayload::Audio { .. } => None,
        }
    }
}

/// Why a record was excluded from the kept set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// Visible fraction fell below the inclusion threshold.
    InsufficientVisibility,
}

/// Whether a record survives into the report's kept set.
///
/// Excluded records are retained in the report so exclusions stay
/// auditable; they are never silently dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    #[default]
    Kept,
    Excluded(ExclusionReason),
}

/// One annotation unit flowing through the pipeline.
///
/// Pipeline stages produce annotated copies rather than mutating shared
/// state, so a record slice can be re-validated at any point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Stable identifier, unique within a run.
    pub id: RecordId,
    /// Owning media file (or the annotation file itself for inline text).
    pub source_file: SourceRef,
    /// Modality-specific fields.
    pub payload: ModalityPayload,
    /// Annotator confidence tier; always set after normalization.
    pub confidence: Confidence,
    /// Free-text annotator commentary.
    pub notes: Option<String>,
    /// Kept/excluded status assigned during normalization.
    pub status: RecordStatus,
}

impl AnnotationRecord {
    /// Modality tag for this record.
    pub fn modality(&self) -> Modality {
        self.payload.modality()
    }

    /// Returns `true` when the record is in the kept set.
    pub fn is_kept(&self) -> bool {
        self.status == RecordStatus::Kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_parses_documented_tiers_case_insensitively() {
        assert_eq!(Confidence::parse("High"), Some(Confidence::High));
        assert_eq!(Confidence::parse(" medium "), Some(Confidence::Medium));
        assert_eq!(Confidence::parse("LOW"), Some(Confidence::Low));
        assert_eq!(Confidence::parse(""), None);
        assert_eq!(Confidence::parse("certain"), None);
    }

    #[test]
    fn confidence_defaults_to_medium() {
        assert_eq!(Confidence::default(), Confidence::Medium);
    }

    #[test]
    fn bounding_box_area_and_finiteness() {
        let bbox = BoundingBox {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        };
        assert_eq!(bbox.area(), 12.0);
        assert!(bbox.is_finite());

        let bad = BoundingBox {
            x: f64::NAN,
            ..bbox
        };
        assert!(!bad.is_finite());
    }

    #[test]
    fn payload_reports_modality_and_class_label() {
        let payload = ModalityPayload::Text {
            text: "alpha".to_string(),
            span: Span { start: 0, end: 5 },
            label: "positive".to_string(),
            language: None,
        };
        assert_eq!(payload.modality(), Modality::Text);
        assert_eq!(payload.class_label(), Some("positive"));

        let audio = ModalityPayload::Audio {
            time_range: TimeRange { start: 0.0, end: 2.0 },
            speaker: "speaker_a".to_string(),
            transcription: "hello".to_string(),
        };
        assert_eq!(audio.class_label(), None);
    }
}
