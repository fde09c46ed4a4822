//! Multi-annotator label resolution.
//!
//! Unanimity wins with `High` confidence; a strict majority among at
//! least `majority_quorum` annotators wins with `Medium` confidence and
//! names its dissenters; everything else is escalated and left
//! unresolved. The engine never fabricates a resolution for a tie — that
//! decision belongs to a human expert.

use indexmap::IndexMap;

use crate::record::{Confidence, Modality};
use crate::report::{AgreementRow, IssueKind, QaIssue};
use crate::types::{AnnotatorId, LabelValue, RecordId};

/// Candidate labels proposed for one record by independent annotators.
///
/// Vote order is insertion order and is preserved in dissenter listings.
#[derive(Clone, Debug)]
pub struct LabelVotes {
    /// Record the votes apply to.
    pub record_id: RecordId,
    /// Modality of that record (used for issue bucketing).
    pub modality: Modality,
    /// Annotator to proposed-label mapping.
    pub votes: IndexMap<AnnotatorId, LabelValue>,
}

/// Result of resolving one vote set.
#[derive(Clone, Debug)]
pub struct AgreementOutcome {
    /// Agreement summary row for the report.
    pub row: AgreementRow,
    /// `MajorityResolved` or `EscalationRequired` findings, if any.
    pub issues: Vec<QaIssue>,
}

/// Resolve one vote set under the given quorum.
pub fn resolve_votes(votes: &LabelVotes, quorum: usize) -> AgreementOutcome {
    let total = votes.votes.len();

    if total == 0 {
        return escalate(votes, "no candidate labels were supplied");
    }

    let mut tally: IndexMap<&str, usize> = IndexMap::new();
    for label in votes.votes.values() {
        *tally.entry(label.as_str()).or_insert(0) += 1;
    }

    if tally.len() == 1 {
        let label = votes.votes.values().next().expect("non-empty votes");
        return AgreementOutcome {
            row: AgreementRow {
                record_id: votes.record_id.clone(),
                annotators: total,
                resolved_label: Some(label.clone()),
                confidence: Some(Confidence::High),
            },
            issues: Vec::new(),
        };
    }

    // Strict majority: more than half the candidates, and enough
    // annotators for majority rule to apply at all.
    let majority = tally
        .iter()
        .find(|(_, count)| **count * 2 > total)
        .map(|(label, _)| label.to_string());

    match majority {
        Some(winner) if total >= quorum => {
            let dissenters: Vec<&str> = votes
                .votes
                .iter()
                .filter(|(_, label)| *label != &winner)
                .map(|(annotator, _)| annotator.as_str())
                .collect();
            let issue = QaIssue::new(
                votes.record_id.clone(),
                votes.modality,
                IssueKind::MajorityResolved,
                format!(
                    "label '{winner}' won by majority; dissenting annotators: {}",
                    dissenters.join(", ")
                ),
            );
            AgreementOutcome {
                row: AgreementRow {
                    record_id: votes.record_id.clone(),
                    annotators: total,
                    resolved_label: Some(winner),
                    confidence: Some(Confidence::Medium),
                },
                issues: vec![issue],
            }
        }
        Some(_) => escalate(
            votes,
            &format!("majority rule requires at least {quorum} annotators, got {total}"),
        ),
        None => escalate(votes, "no label reached a strict majority"),
    }
}

fn escalate(votes: &LabelVotes, reason: &str) -> AgreementOutcome {
    let issue = QaIssue::new(
        votes.record_id.clone(),
        votes.modality,
        IssueKind::EscalationRequired,
        format!("{reason}; expert decision required"),
    );
    AgreementOutcome {
        row: AgreementRow {
            record_id: votes.record_id.clone(),
            annotators: votes.votes.len(),
            resolved_label: None,
            confidence: None,
        },
        issues: vec![issue],
    }
}
