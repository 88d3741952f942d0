// src/lib.rs
// fixtrail - commit feature extraction and bug-fix labeling for git histories

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod features;
pub mod filter;
pub mod git;
pub mod labels;
pub mod table;

pub use error::{FixtrailError, Result};
pub use extractor::{FeatureExtractor, FeatureOptions, FeatureStream, PatchVolume};
