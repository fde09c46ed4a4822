//! Thin CSV adapters over the structured report.
//!
//! These match the documented `qa/qa_log.csv` and
//! `qa/label_agreement.csv` shapes. They only format; all aggregation
//! lives in the report builder.

use crate::errors::QaError;
use crate::report::QaReport;

/// Render the issue log as CSV with columns
/// `record_id,kind,severity,detail`.
pub fn qa_log_csv(report: &QaReport) -> Result<String, QaError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["record_id", "kind", "severity", "detail"])?;
    for issue in &report.issues {
        writer.write_record([
            issue.record_id.as_str(),
            issue.kind.as_str(),
            issue.severity.as_str(),
            issue.detail.as_str(),
        ])?;
    }
    finish(writer)
}

/// Render the agreement summary as CSV with columns
/// `record_id,annotators,resolved_label,confidence`.
///
/// Escalated rows leave `resolved_label` and `confidence` empty.
pub fn agreement_csv(report: &QaReport) -> Result<String, QaError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["record_id", "annotators", "resolved_label", "confidence"])?;
    for row in &report.agreement {
        writer.write_record([
            row.record_id.as_str(),
            &row.annotators.to_string(),
            row.resolved_label.as_deref().unwrap_or(""),
            row.confidence.map(|tier| tier.as_str()).unwrap_or(""),
        ])?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, QaError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| QaError::Configuration(format!("csv writer flush failed: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| QaError::Configuration(format!("csv output is not utf-8: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Confidence, Modality};
    use crate::report::{AgreementRow, IssueKind, QaIssue, ReportBuilder};

    #[test]
    fn qa_log_csv_matches_documented_shape() {
        let mut builder = ReportBuilder::new();
        builder.extend_issues(vec![QaIssue::new(
            "image:10",
            Modality::Image,
            IssueKind::ClippedCoordinate,
            "x clipped from -5.000000 to 0.000000",
        )]);
        let report = builder.build();
        let csv = qa_log_csv(&report).expect("csv");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("record_id,kind,severity,detail"));
        assert_eq!(
            lines.next(),
            Some("image:10,clipped_coordinate,warning,x clipped from -5.000000 to 0.000000")
        );
    }

    #[test]
    fn agreement_csv_leaves_escalated_rows_empty() {
        let mut builder = ReportBuilder::new();
        builder.push_agreement(AgreementRow {
            record_id: "text:1".to_string(),
            annotators: 3,
            resolved_label: Some("positive".to_string()),
            confidence: Some(Confidence::Medium),
        });
        builder.push_agreement(AgreementRow {
            record_id: "text:2".to_string(),
            annotators: 2,
            resolved_label: None,
            confidence: None,
        });
        let report = builder.build();
        let csv = agreement_csv(&report).expect("csv");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("record_id,annotators,resolved_label,confidence")
        );
        assert_eq!(lines.next(), Some("text:1,3,positive,medium"));
        assert_eq!(lines.next(), Some("text:2,2,,"));
    }
}
