// src/git/patch.rs
// Unified diff parsing into per-file change records

use crate::error::{FixtrailError, Result};
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("hunk header regex is valid")
});

/// How a file was touched by a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileChangeKind {
    Added,
    Deleted,
    Modified,
    Unknown,
}

/// One file section of a unified diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchedFile {
    /// Pre-image path without the `a/` prefix; `None` for `/dev/null`
    pub source: Option<String>,
    /// Post-image path without the `b/` prefix; `None` for `/dev/null`
    pub target: Option<String>,
    pub added: usize,
    pub removed: usize,
    pub hunks: usize,
    new_file: bool,
    deleted_file: bool,
    renamed: bool,
    mode_changed: bool,
    binary: bool,
    saw_source_line: bool,
    saw_target_line: bool,
}

impl PatchedFile {
    pub fn is_added_file(&self) -> bool {
        self.new_file || (self.saw_source_line && self.source.is_none())
    }

    pub fn is_removed_file(&self) -> bool {
        self.deleted_file || (self.saw_target_line && self.target.is_none())
    }

    pub fn is_modified_file(&self) -> bool {
        self.source.is_some()
            && self.target.is_some()
            && (self.hunks > 0 || self.renamed || self.mode_changed || self.binary)
    }

    /// Classification, first matching predicate wins
    pub fn kind(&self) -> FileChangeKind {
        if self.is_added_file() {
            FileChangeKind::Added
        } else if self.is_removed_file() {
            FileChangeKind::Deleted
        } else if self.is_modified_file() {
            FileChangeKind::Modified
        } else {
            FileChangeKind::Unknown
        }
    }

    /// Post-image path, or the pre-image path for a removed file
    pub fn path(&self) -> &str {
        if self.is_removed_file() {
            self.source.as_deref().or(self.target.as_deref()).unwrap_or("")
        } else {
            self.target.as_deref().or(self.source.as_deref()).unwrap_or("")
        }
    }

    /// Path segment before the first separator, or the whole path
    pub fn top_level_dir(&self) -> &str {
        let path = self.path();
        path.split_once('/').map_or(path, |(top, _)| top)
    }
}

/// A parsed unified diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    pub files: Vec<PatchedFile>,
}

impl PatchSet {
    pub fn added(&self) -> usize {
        self.files.iter().map(|f| f.added).sum()
    }

    pub fn removed(&self) -> usize {
        self.files.iter().map(|f| f.removed).sum()
    }

    pub fn changed_lines(&self) -> usize {
        self.added() + self.removed()
    }
}

/// Lines still expected by the hunk being read
struct OpenHunk {
    source_left: usize,
    target_left: usize,
}

impl OpenHunk {
    fn is_done(&self) -> bool {
        self.source_left == 0 && self.target_left == 0
    }
}

/// Parse `git diff` / unified diff text.
///
/// Fails on malformed hunk headers, hunks whose body disagrees with the line
/// counts in their header, and hunk content outside any file section.
pub fn parse_unified_diff(text: &str) -> Result<PatchSet> {
    let mut files: Vec<PatchedFile> = Vec::new();
    let mut current: Option<PatchedFile> = None;
    let mut hunk: Option<OpenHunk> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(open) = hunk.as_mut() {
            let file = current
                .as_mut()
                .ok_or_else(|| FixtrailError::diff_parse(line_no, "hunk without file"))?;

            match line.chars().next() {
                Some('+') => {
                    open.target_left = open
                        .target_left
                        .checked_sub(1)
                        .ok_or_else(|| FixtrailError::diff_parse(line_no, "hunk is longer than expected"))?;
                    file.added += 1;
                }
                Some('-') => {
                    open.source_left = open
                        .source_left
                        .checked_sub(1)
                        .ok_or_else(|| FixtrailError::diff_parse(line_no, "hunk is longer than expected"))?;
                    file.removed += 1;
                }
                // Context, or a context line whose leading space was stripped
                Some(' ') | None => {
                    if open.source_left == 0 || open.target_left == 0 {
                        return Err(FixtrailError::diff_parse(line_no, "hunk is longer than expected"));
                    }
                    open.source_left -= 1;
                    open.target_left -= 1;
                }
                Some('\\') => {}
                Some(_) => {
                    return Err(FixtrailError::diff_parse(line_no, "hunk is shorter than expected"));
                }
            }

            if open.is_done() {
                hunk = None;
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("diff --git ") {
            files.extend(current.take());
            let (source, target) = split_git_header(rest);
            current = Some(PatchedFile {
                source,
                target,
                ..PatchedFile::default()
            });
        } else if let Some(rest) = line.strip_prefix("--- ") {
            // Plain unified diffs have no `diff --git` line to open a section
            if current.as_ref().is_none_or(|f| f.saw_source_line) {
                files.extend(current.take());
                current = Some(PatchedFile::default());
            }
            if let Some(file) = current.as_mut() {
                file.source = strip_path(rest, "a/");
                file.saw_source_line = true;
            }
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            let file = current
                .as_mut()
                .filter(|f| f.saw_source_line)
                .ok_or_else(|| FixtrailError::diff_parse(line_no, "target file line without source line"))?;
            file.target = strip_path(rest, "b/");
            file.saw_target_line = true;
        } else if line.starts_with("@@") {
            let file = current
                .as_mut()
                .ok_or_else(|| FixtrailError::diff_parse(line_no, "hunk before any file header"))?;
            let caps = HUNK_HEADER
                .captures(line)
                .ok_or_else(|| FixtrailError::diff_parse(line_no, "malformed hunk header"))?;
            let source_len = hunk_len(caps.get(2).map(|m| m.as_str()), line_no)?;
            let target_len = hunk_len(caps.get(4).map(|m| m.as_str()), line_no)?;

            file.hunks += 1;
            let open = OpenHunk {
                source_left: source_len,
                target_left: target_len,
            };
            if !open.is_done() {
                hunk = Some(open);
            }
        } else if line.starts_with(['+', '-', ' ']) {
            let reason = if current.as_ref().is_some_and(|f| f.hunks > 0) {
                "hunk is longer than expected"
            } else {
                "content outside of any hunk"
            };
            return Err(FixtrailError::diff_parse(line_no, reason));
        } else if let Some(file) = current.as_mut() {
            apply_extended_header(file, line);
        }
    }

    if hunk.is_some() {
        return Err(FixtrailError::diff_parse(
            text.lines().count(),
            "hunk is shorter than expected",
        ));
    }

    files.extend(current);
    Ok(PatchSet { files })
}

fn hunk_len(raw: Option<&str>, line_no: usize) -> Result<usize> {
    match raw {
        None => Ok(1),
        Some(raw) => raw
            .parse()
            .map_err(|_| FixtrailError::diff_parse(line_no, "hunk length out of range")),
    }
}

/// Extended git headers between `diff --git` and the first hunk
fn apply_extended_header(file: &mut PatchedFile, line: &str) {
    if line.starts_with("new file mode") {
        file.new_file = true;
        file.source = None;
    } else if line.starts_with("deleted file mode") {
        file.deleted_file = true;
        file.target = None;
    } else if let Some(path) = line
        .strip_prefix("rename from ")
        .or_else(|| line.strip_prefix("copy from "))
    {
        file.renamed = true;
        file.source = Some(unquote(path).to_string());
    } else if let Some(path) = line
        .strip_prefix("rename to ")
        .or_else(|| line.strip_prefix("copy to "))
    {
        file.renamed = true;
        file.target = Some(unquote(path).to_string());
    } else if line.starts_with("old mode") || line.starts_with("new mode") {
        file.mode_changed = true;
    } else if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
        file.binary = true;
    }
}

/// Split `a/x b/y` from a `diff --git` header
fn split_git_header(rest: &str) -> (Option<String>, Option<String>) {
    match rest.rsplit_once(" b/") {
        Some((source, target)) => {
            let source = unquote(source);
            let source = source.strip_prefix("a/").unwrap_or(source);
            (Some(source.to_string()), Some(target.trim_end_matches('"').to_string()))
        }
        None => (None, None),
    }
}

fn strip_path(raw: &str, prefix: &str) -> Option<String> {
    // Classic diff appends a tab and a timestamp
    let raw = raw.split('\t').next().unwrap_or(raw).trim_end();
    let raw = unquote(raw);
    if raw == "/dev/null" {
        return None;
    }
    Some(raw.strip_prefix(prefix).unwrap_or(raw).to_string())
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_AND_MODIFIED: &str = "\
diff --git a/kernel/a.c b/kernel/a.c
new file mode 100644
index 0000000..3b18e51
--- /dev/null
+++ b/kernel/a.c
@@ -0,0 +1,3 @@
+int a;
+int b;
+int c;
diff --git a/drivers/b.c b/drivers/b.c
index 3b18e51..4e4cbd4 100644
--- a/drivers/b.c
+++ b/drivers/b.c
@@ -1,3 +1,3 @@
 int x;
-int y;
+int z;
 int w;
";

    #[test]
    fn test_parse_new_and_modified() {
        let patch = parse_unified_diff(NEW_AND_MODIFIED).unwrap();
        assert_eq!(patch.files.len(), 2);

        let new = &patch.files[0];
        assert_eq!(new.kind(), FileChangeKind::Added);
        assert_eq!(new.path(), "kernel/a.c");
        assert_eq!(new.top_level_dir(), "kernel");
        assert_eq!(new.added, 3);

        let modified = &patch.files[1];
        assert_eq!(modified.kind(), FileChangeKind::Modified);
        assert_eq!(modified.top_level_dir(), "drivers");
        assert_eq!((modified.added, modified.removed), (1, 1));

        assert_eq!(patch.changed_lines(), 5);
    }

    #[test]
    fn test_parse_deleted_file() {
        let diff = "\
diff --git a/fs/old.c b/fs/old.c
deleted file mode 100644
index 3b18e51..0000000
--- a/fs/old.c
+++ /dev/null
@@ -1,2 +0,0 @@
-int a;
-int b;
";
        let patch = parse_unified_diff(diff).unwrap();
        let file = &patch.files[0];
        assert_eq!(file.kind(), FileChangeKind::Deleted);
        assert_eq!(file.path(), "fs/old.c");
        assert_eq!(file.removed, 2);
    }

    #[test]
    fn test_parse_rename_without_content() {
        let diff = "\
diff --git a/mm/x.c b/mm/y.c
similarity index 100%
rename from mm/x.c
rename to mm/y.c
";
        let patch = parse_unified_diff(diff).unwrap();
        let file = &patch.files[0];
        assert_eq!(file.kind(), FileChangeKind::Modified);
        assert_eq!(file.path(), "mm/y.c");
        assert_eq!(patch.changed_lines(), 0);
    }

    #[test]
    fn test_header_only_section_is_unknown() {
        let diff = "diff --git a/README b/README\n";
        let patch = parse_unified_diff(diff).unwrap();
        assert_eq!(patch.files[0].kind(), FileChangeKind::Unknown);
        assert_eq!(patch.files[0].top_level_dir(), "README");
    }

    #[test]
    fn test_no_newline_marker_and_crlf() {
        let diff = "--- a/x\r\n+++ b/x\r\n@@ -1 +1 @@\r\n-old\r\n\\ No newline at end of file\r\n+new\r\n\\ No newline at end of file\r\n";
        let patch = parse_unified_diff(diff).unwrap();
        assert_eq!(patch.files[0].kind(), FileChangeKind::Modified);
        assert_eq!(patch.changed_lines(), 2);
    }

    #[test]
    fn test_short_hunk_is_error() {
        let diff = "\
--- a/x
+++ b/x
@@ -1,3 +1,3 @@
 a
-b
";
        let err = parse_unified_diff(diff).unwrap_err();
        assert!(matches!(err, FixtrailError::DiffParse { .. }));
        assert!(err.to_string().contains("shorter"));
    }

    #[test]
    fn test_long_hunk_is_error() {
        let diff = "\
--- a/x
+++ b/x
@@ -1 +1 @@
-a
+b
+c
";
        let err = parse_unified_diff(diff).unwrap_err();
        assert!(err.to_string().contains("longer"));
    }

    #[test]
    fn test_malformed_hunk_header_is_error() {
        let diff = "--- a/x\n+++ b/x\n@@ -x +1 @@\n";
        assert!(parse_unified_diff(diff).is_err());
    }

    #[test]
    fn test_target_without_source_is_error() {
        assert!(parse_unified_diff("+++ b/x\n").is_err());
    }

    #[test]
    fn test_empty_diff() {
        let patch = parse_unified_diff("").unwrap();
        assert!(patch.files.is_empty());
        assert_eq!(patch.changed_lines(), 0);
    }
}
