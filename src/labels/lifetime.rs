// src/labels/lifetime.rs
// Days between a buggy commit and the commit that fixed it

use crate::error::{FixtrailError, Result};
use crate::git::{CommitWalk, RevisionRange, short_hash};
use crate::labels::FixesScanner;
use git2::{Commit, ErrorCode, Repository};
use tracing::{debug, info, warn};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days from `bug` to `fix` by commit time, rounded toward negative infinity
pub fn lifetime_days(bug: &Commit<'_>, fix: &Commit<'_>) -> i64 {
    (fix.time().seconds() - bug.time().seconds()).div_euclid(SECONDS_PER_DAY)
}

/// Lifetime in days of every resolvable `Fixes:` reference in the range.
///
/// References that do not resolve to a commit are skipped with a warning, and
/// fixes that predate the commit they name are dropped.
pub fn extract_bug_lifetimes(
    repo: &Repository,
    range: &RevisionRange,
    scanner: &FixesScanner,
) -> Result<Vec<i64>> {
    let mut lifetimes = Vec::new();
    let mut unresolved = 0usize;

    for fix in CommitWalk::new(repo, range, true)? {
        let fix = fix?;
        let message = String::from_utf8_lossy(fix.message_bytes());

        for reference in scanner.raw_references(&message) {
            let Some(bug) = find_referenced(repo, reference)? else {
                warn!(
                    fix = %short_hash(&fix.id(), scanner.key_len()),
                    reference,
                    "Fixes: target not found, skipping"
                );
                unresolved += 1;
                continue;
            };

            let days = lifetime_days(&bug, &fix);
            if days < 0 {
                debug!(fix = %short_hash(&fix.id(), scanner.key_len()), reference, days, "Fix predates its target");
                continue;
            }
            lifetimes.push(days);
        }
    }

    info!(range = %range, lifetimes = lifetimes.len(), unresolved, "Extracted bug lifetimes");
    Ok(lifetimes)
}

/// Look up an abbreviated hash. Missing, ambiguous or non-commit targets yield `None`.
fn find_referenced<'repo>(repo: &'repo Repository, reference: &str) -> Result<Option<Commit<'repo>>> {
    let object = match repo.revparse_single(reference) {
        Ok(object) => object,
        Err(e) if is_unresolvable(&e) => return Ok(None),
        Err(e) => return Err(FixtrailError::Git(e)),
    };

    match object.peel_to_commit() {
        Ok(commit) => Ok(Some(commit)),
        Err(e) if is_unresolvable(&e) => Ok(None),
        Err(e) => Err(FixtrailError::Git(e)),
    }
}

fn is_unresolvable(e: &git2::Error) -> bool {
    matches!(
        e.code(),
        ErrorCode::NotFound | ErrorCode::Ambiguous | ErrorCode::InvalidSpec | ErrorCode::Peel
    )
}
