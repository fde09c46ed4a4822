use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::AnnotationRecord;
use crate::types::LabelValue;

/// Aggregate skew metrics for per-label annotation counts.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSkew {
    pub total: usize,
    pub labels: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub max_share: f64,
    pub ratio: f64,
    pub per_label: Vec<LabelShare>,
}

/// Per-label share of the kept set for distribution inspection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelShare {
    pub label: LabelValue,
    pub count: usize,
    pub share: f64,
}

/// Count class labels across records, preserving first-seen order.
pub fn label_counts<'a>(
    records: impl IntoIterator<Item = &'a AnnotationRecord>,
) -> IndexMap<LabelValue, usize> {
    let mut counts: IndexMap<LabelValue, usize> = IndexMap::new();
    for record in records {
        if let Some(label) = record.payload.class_label() {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Compute skew metrics from per-label counts.
pub fn label_skew(counts: &IndexMap<LabelValue, usize>) -> Option<LabelSkew> {
    if counts.is_empty() {
        return None;
    }
    let total: usize = counts.values().sum();
    let labels = counts.len();
    let min = *counts.values().min().expect("counts non-empty");
    let max = *counts.values().max().expect("counts non-empty");
    let mean = total as f64 / labels as f64;
    let max_share = if total == 0 {
        0.0
    } else {
        max as f64 / total as f64
    };
    let ratio = if min == 0 {
        f64::INFINITY
    } else {
        max as f64 / min as f64
    };
    let mut per_label: Vec<LabelShare> = counts
        .iter()
        .map(|(label, count)| LabelShare {
            label: label.clone(),
            count: *count,
            share: if total == 0 {
                0.0
            } else {
                *count as f64 / total as f64
            },
        })
        .collect();
    per_label.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    Some(LabelSkew {
        total,
        labels,
        min,
        max,
        mean,
        max_share,
        ratio,
        per_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts_of(pairs: &[(&str, usize)]) -> IndexMap<LabelValue, usize> {
        pairs
            .iter()
            .map(|(label, count)| (label.to_string(), *count))
            .collect()
    }

    #[test]
    fn label_skew_reports_balance() {
        let counts = counts_of(&[("cat", 2), ("dog", 2)]);
        let skew = label_skew(&counts).expect("skew");
        assert_eq!(skew.total, 4);
        assert_eq!(skew.labels, 2);
        assert!((skew.ratio - 1.0).abs() < 1e-6);
        assert!((skew.max_share - 0.5).abs() < 1e-6);
        assert!(skew.per_label.iter().all(|entry| entry.count == 2));
    }

    #[test]
    fn label_skew_reports_imbalance() {
        let counts = counts_of(&[("cat", 22), ("dog", 2)]);
        let skew = label_skew(&counts).expect("skew");
        assert!((skew.ratio - 11.0).abs() < 1e-6);
        assert_eq!(skew.per_label[0].label, "cat");
        assert_eq!(skew.per_label[0].count, 22);
    }

    #[test]
    fn label_skew_is_none_for_empty_counts() {
        assert_eq!(label_skew(&IndexMap::new()), None);
    }
}
