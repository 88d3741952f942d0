// src/config/mod.rs
// Configuration and shared lookup tables

pub mod env;
pub mod file;
pub mod tables;

pub use env::EnvConfig;
pub use file::{DEFAULT_MIN_CHANGED_LINES, DEFAULT_RANGE, ExtractConfig, FixtrailConfig};
pub use tables::{DEFAULT_HASH_KEY_LEN, FeatureTables, FileImpact, Trailer};
