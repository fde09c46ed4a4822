//! Parsers for the documented annotation source formats.
//!
//! Whole-document structural failures (unreadable file, invalid JSON,
//! missing COCO top-level keys, missing CSV columns) are run-level errors.
//! Per-record problems never fail the document: a record missing a
//! required field with no documented default becomes an `Unparseable`
//! issue, while fields with documented defaults are filled in and
//! reported as `DefaultedField`.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::constants::{coco, csv_columns, labels};
use crate::errors::QaError;
use crate::record::{
    AnnotationRecord, BoundingBox, Confidence, ImageDimensions, Modality, ModalityPayload,
    RecordStatus, Span, TimeRange,
};
use crate::report::{IssueKind, QaIssue};

/// Parsed records plus the parse-stage issues that rode alongside.
#[derive(Clone, Debug, Default)]
pub struct Ingested {
    /// Structurally parseable records, in input order.
    pub records: Vec<AnnotationRecord>,
    /// `Unparseable` and `DefaultedField` findings from parsing.
    pub issues: Vec<QaIssue>,
}

impl Ingested {
    /// Merge another parse result, preserving order.
    pub fn merge(&mut self, other: Ingested) {
        self.records.extend(other.records);
        self.issues.extend(other.issues);
    }
}

#[derive(Debug, Deserialize)]
struct CocoImage {
    id: i64,
    file_name: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CocoCategory {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CocoAnnotation {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    image_id: Option<i64>,
    #[serde(default)]
    category_id: Option<i64>,
    #[serde(default)]
    bbox: Option<Vec<f64>>,
    #[serde(default)]
    area: Option<f64>,
    #[serde(default)]
    iscrowd: Option<u8>,
    #[serde(default)]
    visibility: Option<f64>,
    #[serde(default)]
    confidence: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Parse a COCO-style JSON document into image annotation records.
///
/// `source` names the document in ids and errors (usually its path).
pub fn parse_coco_json(source: &str, text: &str) -> Result<Ingested, QaError> {
    let document: serde_json::Value =
        serde_json::from_str(text).map_err(|err| QaError::DocumentInvalid {
            source: source.to_string(),
            details: err.to_string(),
        })?;

    for key in coco::REQUIRED_KEYS {
        if document.get(key).is_none() {
            return Err(QaError::DocumentInvalid {
                source: source.to_string(),
                details: format!("missing required key: {key}"),
            });
        }
    }

    let images: Vec<CocoImage> = serde_json::from_value(document["images"].clone())
        .map_err(|err| QaError::DocumentInvalid {
            source: source.to_string(),
            details: format!("images: {err}"),
        })?;
    let categories: Vec<CocoCategory> = serde_json::from_value(document["categories"].clone())
        .map_err(|err| QaError::DocumentInvalid {
            source: source.to_string(),
            details: format!("categories: {err}"),
        })?;
    let annotations = document["annotations"]
        .as_array()
        .ok_or_else(|| QaError::DocumentInvalid {
            source: source.to_string(),
            details: "annotations is not an array".to_string(),
        })?;

    let image_by_id: HashMap<i64, &CocoImage> =
        images.iter().map(|image| (image.id, image)).collect();
    let category_by_id: HashMap<i64, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_str()))
        .collect();

    let mut out = Ingested::default();
    for (index, value) in annotations.iter().enumerate() {
        // Fall back to the array index when the annotation has no usable id.
        let fallback_id = format!("image:#{index}");
        let annotation: CocoAnnotation = match serde_json::from_value(value.clone()) {
            Ok(annotation) => annotation,
            Err(err) => {
                out.issues.push(QaIssue::new(
                    fallback_id,
                    Modality::Image,
                    IssueKind::Unparseable,
                    format!("annotation does not decode: {err}"),
                ));
                continue;
            }
        };
        let record_id = match annotation.id {
            Some(id) => format!("image:{id}"),
            None => {
                out.issues.push(QaIssue::new(
                    fallback_id,
                    Modality::Image,
                    IssueKind::Unparseable,
                    "missing required field: id",
                ));
                continue;
            }
        };
        let Some(image_id) = annotation.image_id else {
            out.issues.push(QaIssue::new(
                record_id,
                Modality::Image,
                IssueKind::Unparseable,
                "missing required field: image_id",
            ));
            continue;
        };
        let bbox = match annotation.bbox.as_deref() {
            Some([x, y, width, height]) => BoundingBox {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            },
            Some(other) => {
                out.issues.push(QaIssue::new(
                    record_id,
                    Modality::Image,
                    IssueKind::Unparseable,
                    format!("bbox must have 4 values, got {}", other.len()),
                ));
                continue;
            }
            None => {
                out.issues.push(QaIssue::new(
                    record_id,
                    Modality::Image,
                    IssueKind::Unparseable,
                    "missing required field: bbox (geometry has no default)",
                ));
                continue;
            }
        };

        let category_id = match annotation.category_id {
            Some(id) => id,
            None => {
                out.issues.push(QaIssue::new(
                    record_id.clone(),
                    Modality::Image,
                    IssueKind::DefaultedField,
                    format!(
                        "category_id defaulted to {} ('{}')",
                        labels::UNKNOWN_CATEGORY_ID,
                        labels::UNKNOWN_CATEGORY_NAME
                    ),
                ));
                labels::UNKNOWN_CATEGORY_ID
            }
        };
        let category = category_by_id
            .get(&category_id)
            .copied()
            .unwrap_or(labels::UNKNOWN_CATEGORY_NAME)
            .to_string();

        let (source_file, image_dimensions) = match image_by_id.get(&image_id) {
            Some(image) => {
                let dimensions = match (image.width, image.height) {
                    (Some(width), Some(height)) => ImageDimensions { width, height },
                    _ => {
                        out.issues.push(QaIssue::new(
                            record_id.clone(),
                            Modality::Image,
                            IssueKind::DefaultedField,
                            "image dimensions defaulted to 640x480",
                        ));
                        ImageDimensions {
                            width: crate::constants::policy::DEFAULT_IMAGE_WIDTH,
                            height: crate::constants::policy::DEFAULT_IMAGE_HEIGHT,
                        }
                    }
                };
                (image.file_name.clone(), dimensions)
            }
            None => {
                out.issues.push(QaIssue::new(
                    record_id.clone(),
                    Modality::Image,
                    IssueKind::DefaultedField,
                    format!("image id {image_id} has no catalog entry; source unknown"),
                ));
                (
                    coco::UNKNOWN_SOURCE.to_string(),
                    ImageDimensions {
                        width: crate::constants::policy::DEFAULT_IMAGE_WIDTH,
                        height: crate::constants::policy::DEFAULT_IMAGE_HEIGHT,
                    },
                )
            }
        };

        let confidence = resolve_confidence(
            annotation.confidence.as_deref(),
            &record_id,
            Modality::Image,
            &mut out.issues,
        );

        out.records.push(AnnotationRecord {
            id: record_id,
            source_file,
            payload: ModalityPayload::Image {
                category,
                category_id,
                bbox,
                image_dimensions,
                area: annotation.area,
                iscrowd: annotation.iscrowd.unwrap_or(0) != 0,
                visibility: annotation.visibility,
            },
            confidence,
            notes: annotation.notes.filter(|notes| !notes.is_empty()),
            status: RecordStatus::Kept,
        });
    }

    debug!(
        source,
        records = out.records.len(),
        issues = out.issues.len(),
        "parsed coco document"
    );
    Ok(out)
}

/// Parse a text annotation CSV (`text,label,confidence,notes` with
/// optional `span_start,span_end,language` columns).
pub fn parse_text_csv(source: &str, text: &str) -> Result<Ingested, QaError> {
    let mut reader = csv_reader(text);
    let columns = column_index(source, &mut reader, &csv_columns::TEXT_REQUIRED)?;
    let span_columns = match (
        columns.get(csv_columns::SPAN_START),
        columns.get(csv_columns::SPAN_END),
    ) {
        (Some(start), Some(end)) => Some((*start, *end)),
        (None, None) => None,
        _ => {
            return Err(QaError::DocumentInvalid {
                source: source.to_string(),
                details: "span_start and span_end must be present together".to_string(),
            })
        }
    };

    let mut out = Ingested::default();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let record_id = format!("text:{source}:{}", index + 1);
        let field = |name: &str| {
            columns
                .get(name)
                .and_then(|position| row.get(*position))
                .unwrap_or("")
                .trim()
        };

        let body = field("text");
        if body.is_empty() {
            out.issues.push(QaIssue::new(
                record_id,
                Modality::Text,
                IssueKind::Unparseable,
                "missing required field: text",
            ));
            continue;
        }
        let label = field("label");
        if label.is_empty() {
            out.issues.push(QaIssue::new(
                record_id,
                Modality::Text,
                IssueKind::Unparseable,
                "missing required field: label (no documented default)",
            ));
            continue;
        }

        let span = match span_columns {
            // Absent span columns mean whole-text classification.
            None => Span {
                start: 0,
                end: body.len(),
            },
            Some((start_column, end_column)) => {
                let start = row.get(start_column).unwrap_or("").trim();
                let end = row.get(end_column).unwrap_or("").trim();
                match (start.parse::<usize>(), end.parse::<usize>()) {
                    (Ok(start), Ok(end)) => Span { start, end },
                    _ => {
                        out.issues.push(QaIssue::new(
                            record_id,
                            Modality::Text,
                            IssueKind::Unparseable,
                            format!("span offsets do not parse: '{start}', '{end}'"),
                        ));
                        continue;
                    }
                }
            }
        };

        let language = non_empty(field("language"));
        let confidence = resolve_confidence(
            non_empty(field("confidence")).as_deref(),
            &record_id,
            Modality::Text,
            &mut out.issues,
        );

        out.records.push(AnnotationRecord {
            id: record_id,
            source_file: source.to_string(),
            payload: ModalityPayload::Text {
                text: body.to_string(),
                span,
                label: label.to_string(),
                language,
            },
            confidence,
            notes: non_empty(field("notes")),
            status: RecordStatus::Kept,
        });
    }

    debug!(
        source,
        records = out.records.len(),
        issues = out.issues.len(),
        "parsed text csv"
    );
    Ok(out)
}

/// Parse an audio annotation CSV
/// (`audio_file,start_time,end_time,speaker,transcription,confidence`).
pub fn parse_audio_csv(source: &str, text: &str) -> Result<Ingested, QaError> {
    let mut reader = csv_reader(text);
    let columns = column_index(source, &mut reader, &csv_columns::AUDIO_REQUIRED)?;

    let mut out = Ingested::default();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let record_id = format!("audio:{source}:{}", index + 1);
        let field = |name: &str| {
            columns
                .get(name)
                .and_then(|position| row.get(*position))
                .unwrap_or("")
                .trim()
        };

        let audio_file = field("audio_file");
        if audio_file.is_empty() {
            out.issues.push(QaIssue::new(
                record_id,
                Modality::Audio,
                IssueKind::Unparseable,
                "missing required field: audio_file",
            ));
            continue;
        }
        let start = field("start_time");
        let end = field("end_time");
        let time_range = match (start.parse::<f64>(), end.parse::<f64>()) {
            (Ok(start), Ok(end)) => TimeRange { start, end },
            _ => {
                out.issues.push(QaIssue::new(
                    record_id,
                    Modality::Audio,
                    IssueKind::Unparseable,
                    format!("time range does not parse: '{start}', '{end}'"),
                ));
                continue;
            }
        };

        let confidence = resolve_confidence(
            non_empty(field("confidence")).as_deref(),
            &record_id,
            Modality::Audio,
            &mut out.issues,
        );

        out.records.push(AnnotationRecord {
            id: record_id,
            source_file: audio_file.to_string(),
            payload: ModalityPayload::Audio {
                time_range,
                speaker: field("speaker").to_string(),
                transcription: field("transcription").to_string(),
            },
            confidence,
            notes: non_empty(field("notes")),
            status: RecordStatus::Kept,
        });
    }

    debug!(
        source,
        records = out.records.len(),
        issues = out.issues.len(),
        "parsed audio csv"
    );
    Ok(out)
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}

fn column_index(
    source: &str,
    reader: &mut csv::Reader<&[u8]>,
    required: &[&str],
) -> Result<HashMap<String, usize>, QaError> {
    let headers = reader.headers().map_err(|err| QaError::DocumentInvalid {
        source: source.to_string(),
        details: format!("header row does not parse: {err}"),
    })?;
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(position, name)| (name.trim().to_string(), position))
        .collect();
    for name in required {
        if !columns.contains_key(*name) {
            return Err(QaError::DocumentInvalid {
                source: source.to_string(),
                details: format!("missing required column: {name}"),
            });
        }
    }
    Ok(columns)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Apply the documented confidence default, reporting when it fires.
fn resolve_confidence(
    raw: Option<&str>,
    record_id: &str,
    modality: Modality,
    issues: &mut Vec<QaIssue>,
) -> Confidence {
    match raw {
        Some(raw) => match Confidence::parse(raw) {
            Some(confidence) => confidence,
            None => {
                issues.push(QaIssue::new(
                    record_id.to_string(),
                    modality,
                    IssueKind::DefaultedField,
                    format!("unrecognized confidence '{raw}' defaulted to medium"),
                ));
                Confidence::Medium
            }
        },
        None => {
            issues.push(QaIssue::new(
                record_id.to_string(),
                modality,
                IssueKind::DefaultedField,
                "confidence defaulted to medium",
            ));
            Confidence::Medium
        }
    }
}
