//! Pipeline orchestration: a pure, synchronous, single-pass
//! transformation from records to a deterministic `QaReport`.
//!
//! The validate+normalize stage is parallel per record (records are
//! independent there); deduplication and agreement need complete groups,
//! so they run after the per-record stage finishes. The final merge is a
//! single ordered pass, never an interleave of partial results.

use std::fs;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::agreement::{resolve_votes, LabelVotes};
use crate::config::{EngineConfig, SourceMap};
use crate::constants::report::RUN_SCOPE_RECORD_ID;
use crate::dedup::dedup_records;
use crate::errors::QaError;
use crate::ingest::{parse_audio_csv, parse_coco_json, parse_text_csv, Ingested};
use crate::metrics::{label_counts, label_skew};
use crate::normalize::normalize_record;
use crate::record::{AnnotationRecord, Modality};
use crate::report::{IssueKind, LabelDistribution, QaIssue, QaReport, ReportBuilder};
use crate::validate::{validate_record, Verdict};

/// The validation engine. Holds only policy configuration; no state
/// persists across runs.
#[derive(Clone, Debug)]
pub struct QaEngine {
    config: EngineConfig,
}

impl QaEngine {
    /// Build an engine after checking the configuration is usable.
    pub fn new(config: EngineConfig) -> Result<Self, QaError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Access the active policy configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read and parse all configured sources, then run the pipeline.
    ///
    /// Whole-input failures (unreadable file, invalid document) propagate;
    /// no partial report is ever returned.
    pub fn run_files(&self, sources: &SourceMap) -> Result<QaReport, QaError> {
        let mut ingested = Ingested::default();
        for path in &sources.image_annotations {
            let source = path.display().to_string();
            let text = read_source(&source, path)?;
            ingested.merge(parse_coco_json(&source, &text)?);
        }
        for path in &sources.text_annotations {
            let source = path.display().to_string();
            let text = read_source(&source, path)?;
            ingested.merge(parse_text_csv(&source, &text)?);
        }
        for path in &sources.audio_annotations {
            let source = path.display().to_string();
            let text = read_source(&source, path)?;
            ingested.merge(parse_audio_csv(&source, &text)?);
        }
        Ok(self.run_records(ingested.records, ingested.issues, &[]))
    }

    /// Run the pipeline over already-parsed records.
    ///
    /// `ingest_issues` are findings from the parse stage and lead the
    /// report's issue sequence; `votes` are optional multi-annotator label
    /// proposals resolved after deduplication.
    pub fn run_records(
        &self,
        records: Vec<AnnotationRecord>,
        ingest_issues: Vec<QaIssue>,
        votes: &[LabelVotes],
    ) -> QaReport {
        let started = Instant::now();
        let input_count = records.len();

        // Per-record stage: validation then normalization, order-preserving.
        let processed: Vec<(Option<AnnotationRecord>, Vec<QaIssue>)> = records
            .into_par_iter()
            .map(|record| {
                let validation = validate_record(&record, &self.config);
                match validation.verdict {
                    Verdict::Malformed(detail) => {
                        let mut issues = validation.issues;
                        issues.push(QaIssue::new(
                            record.id.clone(),
                            record.modality(),
                            IssueKind::Unparseable,
                            detail,
                        ));
                        (None, issues)
                    }
                    Verdict::Pass => {
                        let (normalized, normalize_issues) =
                            normalize_record(record, &self.config);
                        let mut issues = validation.issues;
                        issues.extend(normalize_issues);
                        (Some(normalized), issues)
                    }
                }
            })
            .collect();

        let mut issues = ingest_issues;
        let mut surviving = Vec::with_capacity(processed.len());
        for (record, record_issues) in processed {
            issues.extend(record_issues);
            if let Some(record) = record {
                surviving.push(record);
            }
        }
        debug!(
            input = input_count,
            surviving = surviving.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "validate+normalize stage complete"
        );

        // Grouping barrier: dedup needs every record of a group present.
        let dedup = dedup_records(surviving);
        issues.extend(dedup.issues);

        let mut builder = ReportBuilder::new();
        for vote_set in votes {
            let outcome = resolve_votes(vote_set, self.config.majority_quorum);
            issues.extend(outcome.issues);
            builder.push_agreement(outcome.row);
        }

        self.scan_class_balance(&dedup.records, &mut issues, &mut builder);

        builder.extend_issues(issues);
        for record in dedup.records {
            builder.push_record(record);
        }
        let report = builder.build();
        debug!(
            kept = report.summary.kept_records,
            excluded = report.summary.excluded_records,
            issues = report.summary.total_issues,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "qa run complete"
        );
        report
    }

    /// Per-modality class-distribution scan over the kept set.
    fn scan_class_balance(
        &self,
        records: &[AnnotationRecord],
        issues: &mut Vec<QaIssue>,
        builder: &mut ReportBuilder,
    ) {
        for modality in [Modality::Image, Modality::Text, Modality::Audio] {
            let counts = label_counts(
                records
                    .iter()
                    .filter(|record| record.is_kept() && record.modality() == modality),
            );
            let Some(skew) = label_skew(&counts) else {
                continue;
            };
            if skew.ratio > self.config.imbalance_ratio_limit {
                issues.push(QaIssue::new(
                    RUN_SCOPE_RECORD_ID,
                    modality,
                    IssueKind::ClassImbalance,
                    format!(
                        "label counts range from {} to {} ({:.1}x, limit {:.1}x)",
                        skew.min, skew.max, skew.ratio, self.config.imbalance_ratio_limit
                    ),
                ));
            }
            builder.push_label_distribution(LabelDistribution {
                modality,
                labels: skew.per_label,
            });
        }
    }
}

fn read_source(source: &str, path: &std::path::Path) -> Result<String, QaError> {
    fs::read_to_string(path).map_err(|err| QaError::SourceUnreadable {
        source: source.to_string(),
        reason: err.to_string(),
    })
}
