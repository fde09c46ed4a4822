/// Unique record identifier (stable across runs).
/// Examples: `image:17`, `text:annotations/text_labels.csv:3`
pub type RecordId = String;
/// Reference to the media file that owns a record (never the file bytes).
/// Examples: `photos/cat_001.jpg`, `clips/interview_02.wav`
pub type SourceRef = String;
/// A label value drawn from a modality's label set.
/// Examples: `cat`, `positive`, `ORG`
pub type LabelValue = String;
/// Identifier for an annotator who proposed a label.
/// Examples: `annotator_1`, `alice`
pub type AnnotatorId = String;
/// Speaker identity for diarization segments.
/// Examples: `speaker_a`, `[Unknown]`, `[Overlap]`
pub type SpeakerId = String;
/// Language tag attached to text records.
/// Examples: `en`, `es`, `und`
pub type LanguageTag = String;
/// Human-readable issue detail text.
/// Example: `x clipped from -5.000000 to 0.000000`
pub type Detail = String;
