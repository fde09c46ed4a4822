//! Structural validity checks per modality.
//!
//! Out-of-range values are never rejected here; they are corrected by the
//! normalization stage and reported ("clip and warn"). Only structurally
//! malformed input — non-finite numbers, inverted ranges, spans starting
//! past the text — is a hard per-record failure.

use crate::config::EngineConfig;
use crate::record::{AnnotationRecord, ModalityPayload};
use crate::report::{IssueKind, QaIssue};
use crate::types::Detail;

/// Outcome of the structural check for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Record continues into normalization.
    Pass,
    /// Record is structurally broken; it becomes an `Unparseable` entry.
    Malformed(Detail),
}

/// Verdict plus any non-fatal findings discovered along the way.
#[derive(Clone, Debug)]
pub struct Validation {
    pub verdict: Verdict,
    pub issues: Vec<QaIssue>,
}

/// Check one record against its modality's structural constraints.
pub fn validate_record(record: &AnnotationRecord, config: &EngineConfig) -> Validation {
    match &record.payload {
        ModalityPayload::Image { bbox, area, .. } => {
            if !bbox.is_finite() {
                return malformed(format!(
                    "bbox contains non-finite values: [{}, {}, {}, {}]",
                    bbox.x, bbox.y, bbox.width, bbox.height
                ));
            }
            if bbox.width <= 0.0 || bbox.height <= 0.0 {
                return malformed(format!(
                    "bbox width/height must be positive, got {}x{}",
                    bbox.width, bbox.height
                ));
            }
            let mut issues = Vec::new();
            if let Some(declared) = area {
                if !declared.is_finite() || *declared <= 0.0 {
                    return malformed(format!("declared area is not a positive number: {declared}"));
                }
                let computed = bbox.area();
                let scale = declared.max(computed);
                let relative = (declared - computed).abs() / scale;
                if relative > config.area_tolerance {
                    issues.push(QaIssue::new(
                        record.id.clone(),
                        record.modality(),
                        IssueKind::AreaMismatch,
                        format!(
                            "declared area {declared:.6} differs from computed {computed:.6} \
                             by {:.2}% (tolerance {:.2}%)",
                            relative * 100.0,
                            config.area_tolerance * 100.0
                        ),
                    ));
                }
            }
            Validation {
                verdict: Verdict::Pass,
                issues,
            }
        }
        ModalityPayload::Text { text, span, .. } => {
            if text.is_empty() {
                return malformed("source text is empty".to_string());
            }
            if span.start >= span.end {
                return malformed(format!(
                    "span start {} is not before end {}",
                    span.start, span.end
                ));
            }
            if span.start >= text.len() {
                return malformed(format!(
                    "span start {} is past the text length {}",
                    span.start,
                    text.len()
                ));
            }
            // End offsets past the text are clipped by normalization.
            Validation {
                verdict: Verdict::Pass,
                issues: Vec::new(),
            }
        }
        ModalityPayload::Audio {
            time_range,
            transcription,
            ..
        } => {
            if !time_range.start.is_finite() || !time_range.end.is_finite() {
                return malformed(format!(
                    "time range contains non-finite values: [{}, {}]",
                    time_range.start, time_range.end
                ));
            }
            if time_range.start >= time_range.end {
                return malformed(format!(
                    "segment start {} is not before end {}",
                    time_range.start, time_range.end
                ));
            }
            let mut issues = Vec::new();
            if transcription.trim().is_empty() {
                issues.push(QaIssue::new(
                    record.id.clone(),
                    record.modality(),
                    IssueKind::EmptyTranscription,
                    "transcription is empty",
                ));
            }
            Validation {
                verdict: Verdict::Pass,
                issues,
            }
        }
    }
}

fn malformed(detail: Detail) -> Validation {
    Validation {
        verdict: Verdict::Malformed(detail),
        issues: Vec::new(),
    }
}
