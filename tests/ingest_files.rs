use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use annoqa::{
    export, Confidence, EngineConfig, IssueKind, Modality, QaEngine, QaError, SourceMap,
};

const COCO_DOCUMENT: &str = r#"{
    "images": [
        {"id": 1, "file_name": "cat_001.jpg", "width": 100, "height": 100},
        {"id": 2, "file_name": "dog_001.jpg"}
    ],
    "annotations": [
        {"id": 10, "image_id": 1, "category_id": 1,
         "bbox": [-5.0, 10.0, 20.0, 20.0], "confidence": "high"},
        {"id": 11, "image_id": 2, "category_id": 2,
         "bbox": [5.0, 5.0, 50.0, 50.0], "confidence": "medium"},
        {"id": 12, "image_id": 1, "category_id": 1}
    ],
    "categories": [
        {"id": 1, "name": "cat"},
        {"id": 2, "name": "dog"}
    ]
}"#;

const TEXT_CSV: &str = "text,label,confidence,notes\n\
    I loved it,positive,high,\n\
    It was fine,neutral,,\n";

const AUDIO_CSV: &str = "audio_file,start_time,end_time,speaker,transcription,confidence\n\
    a.wav,0.0,2.5,speaker_a,hello there,high\n\
    b.wav,1.0,3.0,,quiet aside,medium\n";

fn write_fixture(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn engine() -> QaEngine {
    QaEngine::new(EngineConfig::default()).expect("default config is valid")
}

#[test]
fn full_run_over_all_three_sources() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sources = SourceMap {
        image_annotations: vec![write_fixture(dir.path(), "labels.json", COCO_DOCUMENT)],
        text_annotations: vec![write_fixture(dir.path(), "text_labels.csv", TEXT_CSV)],
        audio_annotations: vec![write_fixture(dir.path(), "audio_labels.csv", AUDIO_CSV)],
    };

    let report = engine().run_files(&sources).expect("run");

    // Annotation 12 has no bbox, so 2 image + 2 text + 2 audio survive.
    assert_eq!(report.kept.len(), 6);
    assert!(report.excluded.is_empty());

    let image_ids: Vec<_> = report
        .kept
        .iter()
        .filter(|record| record.modality() == Modality::Image)
        .map(|record| record.id.as_str())
        .collect();
    assert_eq!(image_ids, ["image:10", "image:11"]);

    assert!(report.issues.iter().any(|issue| {
        issue.kind == IssueKind::Unparseable && issue.record_id == "image:12"
    }));
    // Boundary box on annotation 10 clips in place.
    assert!(report.issues.iter().any(|issue| {
        issue.kind == IssueKind::ClippedCoordinate && issue.record_id == "image:10"
    }));
    // Row 2 of the text csv has no confidence value.
    assert!(report.issues.iter().any(|issue| {
        issue.kind == IssueKind::DefaultedField
            && issue.modality == Modality::Text
            && issue.detail.contains("confidence")
    }));
    let neutral = report
        .kept
        .iter()
        .find(|record| record.id.ends_with("text_labels.csv:2"))
        .expect("neutral row");
    assert_eq!(neutral.confidence, Confidence::Medium);
    // Row 2 of the audio csv has an empty speaker column.
    assert!(report.issues.iter().any(|issue| {
        issue.kind == IssueKind::DefaultedField
            && issue.modality == Modality::Audio
            && issue.detail.contains("[Unknown]")
    }));
}

#[test]
fn missing_file_fails_the_whole_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sources = SourceMap {
        text_annotations: vec![dir.path().join("does_not_exist.csv")],
        ..SourceMap::default()
    };
    match engine().run_files(&sources) {
        Err(QaError::SourceUnreadable { source, .. }) => {
            assert!(source.ends_with("does_not_exist.csv"));
        }
        other => panic!("expected SourceUnreadable, got {other:?}"),
    }
}

#[test]
fn invalid_coco_document_fails_the_whole_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(
        dir.path(),
        "labels.json",
        r#"{"images": [], "annotations": []}"#,
    );
    let sources = SourceMap {
        image_annotations: vec![path],
        ..SourceMap::default()
    };
    match engine().run_files(&sources) {
        Err(QaError::DocumentInvalid { details, .. }) => {
            assert!(details.contains("categories"));
        }
        other => panic!("expected DocumentInvalid, got {other:?}"),
    }
}

#[test]
fn skewed_label_distribution_raises_run_scoped_warning() {
    let mut csv = String::from("text,label,confidence\n");
    for index in 0..22 {
        writeln!(csv, "sample number {index},positive,high").expect("write row");
    }
    writeln!(csv, "a dissenting sample,negative,high").expect("write row");
    writeln!(csv, "another dissenting sample,negative,high").expect("write row");

    let dir = tempfile::tempdir().expect("tempdir");
    let sources = SourceMap {
        text_annotations: vec![write_fixture(dir.path(), "text_labels.csv", &csv)],
        ..SourceMap::default()
    };
    let report = engine().run_files(&sources).expect("run");

    let imbalance: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::ClassImbalance)
        .collect();
    assert_eq!(imbalance.len(), 1);
    assert_eq!(imbalance[0].record_id, "*");
    assert_eq!(imbalance[0].modality, Modality::Text);
    assert!(imbalance[0].detail.contains("11.0x"));

    let distribution = report
        .summary
        .label_distributions
        .iter()
        .find(|distribution| distribution.modality == Modality::Text)
        .expect("text distribution");
    assert_eq!(distribution.labels[0].label, "positive");
    assert_eq!(distribution.labels[0].count, 22);
    assert_eq!(distribution.labels[1].count, 2);
}

#[test]
fn balanced_label_distribution_raises_no_warning() {
    let csv = "text,label,confidence\n\
        good one,positive,high\n\
        bad one,negative,high\n";
    let dir = tempfile::tempdir().expect("tempdir");
    let sources = SourceMap {
        text_annotations: vec![write_fixture(dir.path(), "text_labels.csv", csv)],
        ..SourceMap::default()
    };
    let report = engine().run_files(&sources).expect("run");
    assert!(!report
        .issues
        .iter()
        .any(|issue| issue.kind == IssueKind::ClassImbalance));
}

#[test]
fn csv_exports_carry_the_documented_columns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sources = SourceMap {
        image_annotations: vec![write_fixture(dir.path(), "labels.json", COCO_DOCUMENT)],
        ..SourceMap::default()
    };
    let report = engine().run_files(&sources).expect("run");

    let log = export::qa_log_csv(&report).expect("qa log");
    let mut lines = log.lines();
    assert_eq!(lines.next(), Some("record_id,kind,severity,detail"));
    assert!(lines.clone().count() >= 2);
    assert!(lines.any(|line| line.starts_with("image:12,unparseable,error,")));

    let agreement = export::agreement_csv(&report).expect("agreement");
    assert_eq!(
        agreement.lines().next(),
        Some("record_id,annotators,resolved_label,confidence")
    );
}
