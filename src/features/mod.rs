// src/features/mod.rs
// Per-commit feature extraction
//
// - metadata: identity and timing
// - message: trailer counts
// - diff: file impact and directory complexity
// - record: the flat row assembled from all of the above

pub mod diff;
pub mod message;
pub mod metadata;
pub mod record;

pub use diff::{DiffFeatures, extract_diff_features, score_diff, score_patch};
pub use message::{MessageAnalyzer, TrailerCounts};
pub use metadata::{CommitMetadata, extract_commit_metadata, normalize_epoch, stripped_message};
pub use record::{FeatureRecord, format_float};
