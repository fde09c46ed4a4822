use serde::{Deserialize, Serialize};

use crate::metrics::LabelShare;
use crate::record::{AnnotationRecord, Confidence, Modality};
use crate::types::{Detail, LabelValue, RecordId};

/// Issue severity tier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Lowercase name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Closed taxonomy of per-record and run-scoped QA findings.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum IssueKind {
    /// Required field missing with no documented default; record excluded
    /// from the main sequence.
    Unparseable,
    /// A coordinate was clipped into bounds during normalization.
    ClippedCoordinate,
    /// A missing field was filled with its documented default.
    DefaultedField,
    /// Post-clip box width or height fell below the minimum size.
    UndersizedBox,
    /// Declared area disagrees with the computed box area.
    AreaMismatch,
    /// Diarization segment shorter than the documented minimum.
    ShortSegment,
    /// Audio record carries an empty transcription.
    EmptyTranscription,
    /// Label falls outside the configured closed label set.
    UnknownLabel,
    /// Record excluded because too little of the object is visible.
    InsufficientVisibility,
    /// Duplicate record dropped in favor of an earlier occurrence.
    DuplicateDropped,
    /// Label votes resolved by majority rather than unanimity.
    MajorityResolved,
    /// Label votes could not be resolved; expert decision required.
    EscalationRequired,
    /// Per-modality label distribution is heavily skewed.
    ClassImbalance,
}

impl IssueKind {
    /// Fixed severity for this kind.
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::Unparseable => Severity::Error,
            IssueKind::DefaultedField
            | IssueKind::DuplicateDropped
            | IssueKind::MajorityResolved => Severity::Info,
            IssueKind::ClippedCoordinate
            | IssueKind::UndersizedBox
            | IssueKind::AreaMismatch
            | IssueKind::ShortSegment
            | IssueKind::EmptyTranscription
            | IssueKind::UnknownLabel
            | IssueKind::InsufficientVisibility
            | IssueKind::EscalationRequired
            | IssueKind::ClassImbalance => Severity::Warning,
        }
    }

    /// Snake-case kind name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Unparseable => "unparseable",
            IssueKind::ClippedCoordinate => "clipped_coordinate",
            IssueKind::DefaultedField => "defaulted_field",
            IssueKind::UndersizedBox => "undersized_box",
            IssueKind::AreaMismatch => "area_mismatch",
            IssueKind::ShortSegment => "short_segment",
            IssueKind::EmptyTranscription => "empty_transcription",
            IssueKind::UnknownLabel => "unknown_label",
            IssueKind::InsufficientVisibility => "insufficient_visibility",
            IssueKind::DuplicateDropped => "duplicate_dropped",
            IssueKind::MajorityResolved => "majority_resolved",
            IssueKind::EscalationRequired => "escalation_required",
            IssueKind::ClassImbalance => "class_imbalance",
        }
    }
}

/// One QA finding against a record (or against the run as a whole).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QaIssue {
    /// Offending record id, or `*` for run-scoped findings.
    pub record_id: RecordId,
    pub modality: Modality,
    pub kind: IssueKind,
    pub severity: Severity,
    pub detail: Detail,
}

impl QaIssue {
    /// Build an issue with the severity fixed by its kind.
    pub fn new(
        record_id: impl Into<RecordId>,
        modality: Modality,
        kind: IssueKind,
        detail: impl Into<Detail>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            modality,
            kind,
            severity: kind.severity(),
            detail: detail.into(),
        }
    }
}

/// One resolved (or escalated) agreement decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgreementRow {
    /// Record the votes apply to.
    pub record_id: RecordId,
    /// Number of annotators that voted.
    pub annotators: usize,
    /// Winning label; `None` when the decision was escalated.
    pub resolved_label: Option<LabelValue>,
    /// Confidence tier assigned by the resolution; `None` when escalated.
    pub confidence: Option<Confidence>,
}

/// One `(modality, kind, severity)` count in the report summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBucket {
    pub modality: Modality,
    pub kind: IssueKind,
    pub severity: Severity,
    pub count: usize,
}

/// Per-modality label distribution included in the summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelDistribution {
    pub modality: Modality,
    /// Shares sorted by descending count, then label.
    pub labels: Vec<LabelShare>,
}

/// Aggregate counts for one validation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Records that entered the pipeline (parseable ones).
    pub total_records: usize,
    /// Records in the kept set after normalization and dedup.
    pub kept_records: usize,
    /// Records retained but excluded from the kept set.
    pub excluded_records: usize,
    /// Total issue count across all kinds.
    pub total_issues: usize,
    /// Counts grouped by `(modality, kind, severity)`, sorted.
    pub buckets: Vec<SummaryBucket>,
    /// Kept-set label distributions per modality.
    pub label_distributions: Vec<LabelDistribution>,
}

/// Immutable result of one validation run.
///
/// Issue order follows record processing order, so identical input
/// produces an identical serialized report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QaReport {
    /// Normalized records that survived validation, exclusion, and dedup.
    pub kept: Vec<AnnotationRecord>,
    /// Records retained for audit but excluded from the kept set.
    pub excluded: Vec<AnnotationRecord>,
    /// All findings, in processing order.
    pub issues: Vec<QaIssue>,
    /// Agreement decisions, in input order.
    pub agreement: Vec<AgreementRow>,
    /// Aggregate counts.
    pub summary: ReportSummary,
}

/// Accumulates pipeline output and produces the final report.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    kept: Vec<AnnotationRecord>,
    excluded: Vec<AnnotationRecord>,
    issues: Vec<QaIssue>,
    agreement: Vec<AgreementRow>,
    label_distributions: Vec<LabelDistribution>,
}

impl ReportBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// File a processed record into the kept or excluded sequence.
    pub fn push_record(&mut self, record: AnnotationRecord) {
        if record.is_kept() {
            self.kept.push(record);
        } else {
            self.excluded.push(record);
        }
    }

    /// Append issues in processing order.
    pub fn extend_issues(&mut self, issues: impl IntoIterator<Item = QaIssue>) {
        self.issues.extend(issues);
    }

    /// Append one agreement decision.
    pub fn push_agreement(&mut self, row: AgreementRow) {
        self.agreement.push(row);
    }

    /// Attach the kept-set label distribution for one modality.
    pub fn push_label_distribution(&mut self, distribution: LabelDistribution) {
        self.label_distributions.push(distribution);
    }

    /// Finalize: compute sorted summary buckets and seal the report.
    pub fn build(self) -> QaReport {
        let mut buckets: Vec<SummaryBucket> = Vec::new();
        for issue in &self.issues {
            match buckets.iter_mut().find(|bucket| {
                bucket.modality == issue.modality
                    && bucket.kind == issue.kind
                    && bucket.severity == issue.severity
            }) {
                Some(bucket) => bucket.count += 1,
                None => buckets.push(SummaryBucket {
                    modality: issue.modality,
                    kind: issue.kind,
                    severity: issue.severity,
                    count: 1,
                }),
            }
        }
        buckets.sort_by(|a, b| {
            (a.modality, a.kind, a.severity).cmp(&(b.modality, b.kind, b.severity))
        });

        let summary = ReportSummary {
            total_records: self.kept.len() + self.excluded.len(),
            kept_records: self.kept.len(),
            excluded_records: self.excluded.len(),
            total_issues: self.issues.len(),
            buckets,
            label_distributions: self.label_distributions,
        };
        QaReport {
            kept: self.kept,
            excluded: self.excluded,
            issues: self.issues,
            agreement: self.agreement,
            summary,
        }
    }
}
