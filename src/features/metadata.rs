// src/features/metadata.rs
// Identity and timing features of a single commit

use crate::git::short_hash;
use chrono::{DateTime, FixedOffset};
use git2::{Commit, Signature};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMetadata {
    pub commit_hash: String,
    pub author: String,
    pub author_date: i64,
    pub committer: String,
    pub commit_date: i64,
    /// commit_date - author_date; negative when a commit was backdated or rebased
    pub commit_delay: i64,
    pub message_length: usize,
}

/// Read a signature time as calendar time in its own offset, then back as UTC seconds.
///
/// The result is `seconds + offset * 60`: the local wall-clock reading placed
/// on the UTC axis. Offsets chrono cannot represent leave the value untouched.
pub fn normalize_epoch(seconds: i64, offset_minutes: i32) -> i64 {
    let Some(offset) = FixedOffset::east_opt(offset_minutes * 60) else {
        return seconds;
    };
    let Some(utc) = DateTime::from_timestamp(seconds, 0) else {
        return seconds;
    };
    utc.with_timezone(&offset).naive_local().and_utc().timestamp()
}

fn signature_epoch(signature: &Signature<'_>) -> i64 {
    let when = signature.when();
    normalize_epoch(when.seconds(), when.offset_minutes())
}

fn signature_name(signature: &Signature<'_>) -> String {
    String::from_utf8_lossy(signature.name_bytes()).into_owned()
}

/// Commit message with surrounding whitespace removed
pub fn stripped_message(commit: &Commit<'_>) -> String {
    String::from_utf8_lossy(commit.message_bytes()).trim().to_string()
}

pub fn extract_commit_metadata(commit: &Commit<'_>, key_len: usize) -> CommitMetadata {
    let author = commit.author();
    let committer = commit.committer();

    let author_date = signature_epoch(&author);
    let commit_date = signature_epoch(&committer);

    CommitMetadata {
        commit_hash: short_hash(&commit.id(), key_len),
        author: signature_name(&author),
        author_date,
        committer: signature_name(&committer),
        commit_date,
        commit_delay: commit_date - author_date,
        message_length: stripped_message(commit).chars().count(),
    }
}
