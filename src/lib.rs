#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Multi-annotator label resolution.
pub mod agreement;
/// Engine policy configuration and source mapping.
pub mod config;
/// Centralized policy constants and format markers.
pub mod constants;
/// Duplicate detection and resolution.
pub mod dedup;
/// Pipeline orchestration.
pub mod engine;
/// CSV export adapters for external report consumers.
pub mod export;
/// Parsers for the documented annotation source formats.
pub mod ingest;
/// Label distribution and skew helpers.
pub mod metrics;
/// Edge-case normalization policies.
pub mod normalize;
/// Annotation record and payload types.
pub mod record;
/// QA report types and builder.
pub mod report;
/// Per-modality structural validators.
pub mod validate;
/// Shared type aliases.
pub mod types;

mod errors;

pub use agreement::{resolve_votes, AgreementOutcome, LabelVotes};
pub use config::{EngineConfig, LabelSets, SourceMap};
pub use dedup::{comparison_key, dedup_records, DedupOutcome};
pub use engine::QaEngine;
pub use errors::QaError;
pub use ingest::{parse_audio_csv, parse_coco_json, parse_text_csv, Ingested};
pub use normalize::normalize_record;
pub use record::{
    AnnotationRecord, BoundingBox, Confidence, ExclusionReason, ImageDimensions, Modality,
    ModalityPayload, RecordStatus, Span, TimeRange,
};
pub use report::{
    AgreementRow, IssueKind, LabelDistribution, QaIssue, QaReport, ReportSummary, Severity,
    SummaryBucket,
};
pub use validate::{validate_record, Validation, Verdict};
pub use types::{
    AnnotatorId, Detail, LabelValue, LanguageTag, RecordId, SourceRef, SpeakerId,
};
