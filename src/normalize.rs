//! Deterministic application of the documented edge-case policies:
//! coordinate clipping, field defaulting, minimum-size enforcement, and
//! the partial-object inclusion rule.

use crate::config::EngineConfig;
use crate::constants::{labels, speakers};
use crate::record::{AnnotationRecord, ExclusionReason, Modality, ModalityPayload, RecordStatus};
use crate::report::{IssueKind, QaIssue};

/// Normalize one record, returning the annotated copy and any issues.
///
/// Records are flagged, never silently dropped: undersized boxes stay in
/// the kept set for human review, and visibility exclusions keep the
/// record in the report's excluded sequence.
pub fn normalize_record(
    mut record: AnnotationRecord,
    config: &EngineConfig,
) -> (AnnotationRecord, Vec<QaIssue>) {
    let mut issues = Vec::new();
    let id = record.id.clone();
    let modality = record.modality();

    match &mut record.payload {
        ModalityPayload::Image {
            bbox,
            image_dimensions,
            visibility,
            category,
            ..
        } => {
            let max_x = f64::from(image_dimensions.width);
            let max_y = f64::from(image_dimensions.height);

            let clipped_x = bbox.x.clamp(0.0, max_x);
            if clipped_x != bbox.x {
                issues.push(clip_issue(&id, modality, "x", bbox.x, clipped_x));
                bbox.x = clipped_x;
            }
            let clipped_y = bbox.y.clamp(0.0, max_y);
            if clipped_y != bbox.y {
                issues.push(clip_issue(&id, modality, "y", bbox.y, clipped_y));
                bbox.y = clipped_y;
            }
            let clipped_width = bbox.width.min(max_x - bbox.x);
            if clipped_width != bbox.width {
                issues.push(clip_issue(&id, modality, "width", bbox.width, clipped_width));
                bbox.width = clipped_width;
            }
            let clipped_height = bbox.height.min(max_y - bbox.y);
            if clipped_height != bbox.height {
                issues.push(clip_issue(
                    &id,
                    modality,
                    "height",
                    bbox.height,
                    clipped_height,
                ));
                bbox.height = clipped_height;
            }

            if bbox.width < config.min_box_size || bbox.height < config.min_box_size {
                issues.push(QaIssue::new(
                    id.clone(),
                    modality,
                    IssueKind::UndersizedBox,
                    format!(
                        "box is {:.1}x{:.1} after clipping, minimum is {:.1}x{:.1}",
                        bbox.width, bbox.height, config.min_box_size, config.min_box_size
                    ),
                ));
            }

            if let Some(fraction) = visibility {
                if *fraction < config.visibility_threshold {
                    record.status = RecordStatus::Excluded(ExclusionReason::InsufficientVisibility);
                    issues.push(QaIssue::new(
                        id.clone(),
                        modality,
                        IssueKind::InsufficientVisibility,
                        format!(
                            "visibility {:.2} is below the {:.2} inclusion threshold",
                            fraction, config.visibility_threshold
                        ),
                    ));
                }
            }

            if let Some(issue) = check_label_set(&id, modality, category, config) {
                issues.push(issue);
            }
        }
        ModalityPayload::Text {
            text,
            span,
            label,
            language,
        } => {
            if span.end > text.len() {
                let clipped = text.len();
                issues.push(clip_issue(
                    &id,
                    modality,
                    "span end",
                    span.end as f64,
                    clipped as f64,
                ));
                span.end = clipped;
            }
            if language.is_none() {
                *language = Some(labels::UNDETERMINED_LANGUAGE.to_string());
                issues.push(QaIssue::new(
                    id.clone(),
                    modality,
                    IssueKind::DefaultedField,
                    format!(
                        "language defaulted to '{}'",
                        labels::UNDETERMINED_LANGUAGE
                    ),
                ));
            }
            if let Some(issue) = check_label_set(&id, modality, label, config) {
                issues.push(issue);
            }
        }
        ModalityPayload::Audio {
            time_range,
            speaker,
            ..
        } => {
            if time_range.start < 0.0 {
                issues.push(clip_issue(&id, modality, "start", time_range.start, 0.0));
                time_range.start = 0.0;
            }
            if speaker.trim().is_empty() {
                *speaker = speakers::UNKNOWN.to_string();
                issues.push(QaIssue::new(
                    id.clone(),
                    modality,
                    IssueKind::DefaultedField,
                    format!("speaker defaulted to '{}'", speakers::UNKNOWN),
                ));
            }
            if time_range.duration() < config.min_segment_seconds {
                issues.push(QaIssue::new(
                    id.clone(),
                    modality,
                    IssueKind::ShortSegment,
                    format!(
                        "segment is {:.3}s, minimum is {:.3}s",
                        time_range.duration(),
                        config.min_segment_seconds
                    ),
                ));
            }
        }
    }

    (record, issues)
}

fn clip_issue(id: &str, modality: Modality, field: &str, before: f64, after: f64) -> QaIssue {
    QaIssue::new(
        id.to_string(),
        modality,
        IssueKind::ClippedCoordinate,
        format!("{field} clipped from {before:.6} to {after:.6}"),
    )
}

fn check_label_set(
    id: &str,
    modality: Modality,
    label: &str,
    config: &EngineConfig,
) -> Option<QaIssue> {
    let set = config.label_set(modality)?;
    if set.iter().any(|allowed| allowed == label) {
        return None;
    }
    Some(QaIssue::new(
        id.to_string(),
        modality,
        IssueKind::UnknownLabel,
        format!("label '{label}' is not in the configured {modality} label set"),
    ))
}
