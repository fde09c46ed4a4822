/// Fixed business-rule defaults stated by the annotation guidelines.
pub mod policy {
    /// Minimum bounding-box width/height in pixels after clipping.
    pub const MIN_BOX_SIZE_PX: f64 = 10.0;
    /// Default image width used when a COCO image entry omits dimensions.
    pub const DEFAULT_IMAGE_WIDTH: u32 = 640;
    /// Default image height used when a COCO image entry omits dimensions.
    pub const DEFAULT_IMAGE_HEIGHT: u32 = 480;
    /// Minimum diarization segment length in seconds.
    pub const MIN_SEGMENT_SECONDS: f64 = 1.0;
    /// Minimum number of annotators required to invoke majority rule.
    pub const MAJORITY_QUORUM: usize = 3;
    /// Relative tolerance for declared vs computed bounding-box area.
    pub const AREA_TOLERANCE: f64 = 0.01;
    /// Visibility fraction below which a record is excluded.
    pub const VISIBILITY_THRESHOLD: f64 = 0.5;
    /// Max/min label-count ratio above which class imbalance is reported.
    pub const IMBALANCE_RATIO_LIMIT: f64 = 10.0;
}

/// Explicit speaker markers permitted on diarization records.
pub mod speakers {
    /// Marker for segments whose speaker could not be identified.
    pub const UNKNOWN: &str = "[Unknown]";
    /// Marker for segments where multiple speakers overlap.
    pub const OVERLAP: &str = "[Overlap]";
}

/// Canonical fallback label values.
pub mod labels {
    /// Category id substituted when a COCO annotation omits `category_id`.
    pub const UNKNOWN_CATEGORY_ID: i64 = 0;
    /// Category name used when a category id has no catalog entry.
    pub const UNKNOWN_CATEGORY_NAME: &str = "unknown";
    /// Language tag substituted when a text record omits `language`.
    pub const UNDETERMINED_LANGUAGE: &str = "und";
}

/// Column names required by the documented CSV input shapes.
pub mod csv_columns {
    /// Columns that must be present in a text annotation CSV header.
    pub const TEXT_REQUIRED: [&str; 2] = ["text", "label"];
    /// Columns that must be present in an audio annotation CSV header.
    pub const AUDIO_REQUIRED: [&str; 5] = [
        "audio_file",
        "start_time",
        "end_time",
        "speaker",
        "transcription",
    ];
    /// Optional text column carrying an explicit span start offset.
    pub const SPAN_START: &str = "span_start";
    /// Optional text column carrying an explicit span end offset.
    pub const SPAN_END: &str = "span_end";
}

/// Structural requirements for COCO documents.
pub mod coco {
    /// Required top-level keys; a document missing any of these is invalid.
    pub const REQUIRED_KEYS: [&str; 3] = ["images", "annotations", "categories"];
    /// Source reference substituted when an annotation points at an
    /// image id absent from the `images` catalog.
    pub const UNKNOWN_SOURCE: &str = "[unknown]";
}

/// Constants used when building deduplication comparison keys.
pub mod dedup {
    /// Separator between comparison-key fields.
    /// Example key: `image|photos/a.jpg|3|cat|10.000000|20.000000|30.000000|40.000000`
    pub const KEY_DELIMITER: char = '|';
}

/// Constants used by the report builder.
pub mod report {
    /// Record id used for run-scoped issues that reference no single record.
    pub const RUN_SCOPE_RECORD_ID: &str = "*";
}
