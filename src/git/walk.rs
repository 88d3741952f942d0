// src/git/walk.rs
// Lazy commit traversal over a revision range

use crate::error::Result;
use crate::git::range::RevisionRange;
use git2::{Commit, Oid, Repository, Revwalk, Sort};
use tracing::debug;

/// Lazy, finite walk over the commits of a revision range.
///
/// Commits come out newest first (git2 time sorting), so two walks over the
/// same range of an unchanged repository yield the same sequence. Each call
/// to [`CommitWalk::new`] starts over; dropping the walk early costs nothing
/// for the unvisited part of the range.
pub struct CommitWalk<'repo> {
    repo: &'repo Repository,
    revwalk: Revwalk<'repo>,
    include_merges: bool,
}

impl<'repo> CommitWalk<'repo> {
    pub fn new(repo: &'repo Repository, range: &RevisionRange, include_merges: bool) -> Result<Self> {
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;

        match range {
            RevisionRange::Single(rev) => {
                revwalk.push(resolve(repo, rev)?)?;
            }
            RevisionRange::TwoDot { from, to } => {
                revwalk.push(resolve(repo, to)?)?;
                revwalk.hide(resolve(repo, from)?)?;
            }
            RevisionRange::ThreeDot { left, right } => {
                let left = resolve(repo, left)?;
                let right = resolve(repo, right)?;
                revwalk.push(left)?;
                revwalk.push(right)?;

                // Unrelated histories have no merge base; the walk is then the union
                match repo.merge_bases(left, right) {
                    Ok(bases) => {
                        for base in bases.iter() {
                            revwalk.hide(*base)?;
                        }
                    }
                    Err(e) if e.code() == git2::ErrorCode::NotFound => {
                        debug!(range = %range, "No merge base, walking both sides");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(Self {
            repo,
            revwalk,
            include_merges,
        })
    }
}

/// Resolve a revision (branch, tag, hash, `HEAD~3`) to a commit id
pub fn resolve(repo: &Repository, rev: &str) -> Result<Oid> {
    let commit = repo.revparse_single(rev)?.peel_to_commit()?;
    Ok(commit.id())
}

impl<'repo> Iterator for CommitWalk<'repo> {
    type Item = Result<Commit<'repo>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let oid = match self.revwalk.next()? {
                Ok(oid) => oid,
                Err(e) => return Some(Err(e.into())),
            };

            let commit = match self.repo.find_commit(oid) {
                Ok(commit) => commit,
                Err(e) => return Some(Err(e.into())),
            };

            if !self.include_merges && commit.parent_count() > 1 {
                continue;
            }

            return Some(Ok(commit));
        }
    }
}
