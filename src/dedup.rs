//! Duplicate detection over normalized records.
//!
//! Two records are duplicates iff they share the same source file and
//! every modality-specific positional/label field is equal; confidence
//! and notes never participate in the comparison. The first occurrence in
//! input order is kept, later ones are dropped and reported against the
//! survivor. Grouping by key keeps the pass O(n).

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::constants::dedup::KEY_DELIMITER;
use crate::record::{AnnotationRecord, ModalityPayload};
use crate::report::{IssueKind, QaIssue};
use crate::types::RecordId;

/// Surviving records plus one `DuplicateDropped` issue per dropped record.
#[derive(Clone, Debug)]
pub struct DedupOutcome {
    /// Input order preserved; dropped duplicates removed.
    pub records: Vec<AnnotationRecord>,
    pub issues: Vec<QaIssue>,
}

/// Comparison key for one record, computed once per record.
///
/// Floats are rendered at fixed six-decimal precision so keys are stable
/// across runs and platforms.
pub fn comparison_key(record: &AnnotationRecord) -> String {
    let d = KEY_DELIMITER;
    match &record.payload {
        ModalityPayload::Image {
            category,
            category_id,
            bbox,
            ..
        } => format!(
            "image{d}{src}{d}{category_id}{d}{category}{d}{:.6}{d}{:.6}{d}{:.6}{d}{:.6}",
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height,
            src = record.source_file,
        ),
        ModalityPayload::Text {
            text, span, label, ..
        } => format!(
            "text{d}{src}{d}{label}{d}{}{d}{}{d}{text}",
            span.start,
            span.end,
            src = record.source_file,
        ),
        ModalityPayload::Audio {
            time_range,
            speaker,
            transcription,
        } => format!(
            "audio{d}{src}{d}{:.6}{d}{:.6}{d}{speaker}{d}{transcription}",
            time_range.start,
            time_range.end,
            src = record.source_file,
        ),
    }
}

/// Drop later duplicates, keeping the first occurrence in input order.
///
/// Excluded records pass through untouched; they neither shadow nor drop
/// anything.
pub fn dedup_records(records: Vec<AnnotationRecord>) -> DedupOutcome {
    let mut first_by_key: IndexMap<String, RecordId> = IndexMap::with_capacity(records.len());
    let mut survivors = Vec::with_capacity(records.len());
    let mut issues = Vec::new();

    for record in records {
        if !record.is_kept() {
            survivors.push(record);
            continue;
        }
        match first_by_key.entry(comparison_key(&record)) {
            Entry::Occupied(kept) => {
                issues.push(QaIssue::new(
                    record.id.clone(),
                    record.modality(),
                    IssueKind::DuplicateDropped,
                    format!("duplicate of record '{}'", kept.get()),
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(record.id.clone());
                survivors.push(record);
            }
        }
    }

    DedupOutcome {
        records: survivors,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{
        BoundingBox, Confidence, ExclusionReason, ImageDimensions, RecordStatus, Span,
    };

    fn image_record(id: &str, x: f64) -> AnnotationRecord {
        AnnotationRecord {
            id: id.to_string(),
            source_file: "a.jpg".to_string(),
            payload: ModalityPayload::Image {
                category: "cat".to_string(),
                category_id: 1,
                bbox: BoundingBox {
                    x,
                    y: 20.0,
                    width: 30.0,
                    height: 40.0,
                },
                image_dimensions: ImageDimensions {
                    width: 640,
                    height: 480,
                },
                area: None,
                iscrowd: false,
                visibility: None,
            },
            confidence: Confidence::Medium,
            notes: None,
            status: RecordStatus::Kept,
        }
    }

    fn text_record(id: &str, label: &str) -> AnnotationRecord {
        AnnotationRecord {
            id: id.to_string(),
            source_file: "labels.csv".to_string(),
            payload: ModalityPayload::Text {
                text: "alpha beta".to_string(),
                span: Span { start: 0, end: 10 },
                label: label.to_string(),
                language: Some("en".to_string()),
            },
            confidence: Confidence::Medium,
            notes: None,
            status: RecordStatus::Kept,
        }
    }

    #[test]
    fn first_occurrence_survives_and_later_ones_report_it() {
        let records = vec![
            image_record("img:1", 10.0),
            image_record("img:2", 10.0),
            image_record("img:3", 10.0),
        ];
        let outcome = dedup_records(records);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].id, "img:1");
        assert_eq!(outcome.issues.len(), 2);
        for issue in &outcome.issues {
            assert_eq!(issue.kind, IssueKind::DuplicateDropped);
            assert!(issue.detail.contains("img:1"));
        }
    }

    #[test]
    fn confidence_and_notes_do_not_break_duplicate_detection() {
        let mut a = text_record("t:1", "positive");
        let mut b = text_record("t:2", "positive");
        a.confidence = Confidence::High;
        b.confidence = Confidence::Low;
        a.notes = Some("looks fine".to_string());
        b.notes = None;
        let outcome = dedup_records(vec![a, b]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].record_id, "t:2");
    }

    #[test]
    fn differing_positional_fields_are_not_duplicates() {
        let outcome = dedup_records(vec![image_record("img:1", 10.0), image_record("img:2", 11.0)]);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn differing_labels_are_not_duplicates() {
        let outcome = dedup_records(vec![
            text_record("t:1", "positive"),
            text_record("t:2", "negative"),
        ]);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn excluded_records_pass_through_without_shadowing() {
        let mut excluded = image_record("img:1", 10.0);
        excluded.status = RecordStatus::Excluded(ExclusionReason::InsufficientVisibility);
        let kept = image_record("img:2", 10.0);
        let outcome = dedup_records(vec![excluded, kept]);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.issues.is_empty());
    }
}
