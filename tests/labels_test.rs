//! Integration tests for cross-reference labels, tool mentions and bug lifetimes


use fixtrail::config::FixtrailConfig;
use fixtrail::export;
use fixtrail::git::RevisionRange;
use fixtrail::labels::ToolPolicy;
use fixtrail::{FeatureExtractor, FeatureOptions};
use git2::{Oid, Time};
use test_utils::{BASE_TIME, TestRepo, fixes_message, key};

fn extractor(repo: &TestRepo) -> FeatureExtractor {
    FeatureExtractor::open(repo.path(), &FixtrailConfig::default()).unwrap()
}

fn head() -> RevisionRange {
    RevisionRange::parse("HEAD").unwrap()
}

struct History {
    repo: TestRepo,
    bug: Oid,
    unrelated: Oid,
    fix: Oid,
}

/// root, bug, unrelated change, fix of bug (mentions syzbot)
fn history() -> History {
    let mut repo = TestRepo::new();
    repo.commit("Initial import", &[("drivers/p.c", Some("probe v0\n"))]);
    let bug = repo.commit("drivers: add probe", &[("drivers/p.c", Some("probe v1\n"))]);
    let unrelated = repo.commit("docs: update howto", &[("Documentation/howto.rst", Some("howto\n"))]);
    let fix = repo.commit(
        &fixes_message(
            "drivers: repair probe",
            bug,
            "Reported-by: syzbot+123@syzkaller.appspotmail.com",
        ),
        &[("drivers/p.c", Some("probe v2\n"))],
    );
    History {
        repo,
        bug,
        unrelated,
        fix,
    }
}

#[test]
fn test_fixed_index_contains_referenced_commit() {
    let h = history();
    let index = extractor(&h.repo).find_fixed_commits(&head()).unwrap();

    assert_eq!(index.len(), 1);
    assert!(index.contains(&key(h.bug)));
    assert!(!index.contains(&key(h.fix)));
}

#[test]
fn test_cross_reference_labels_are_independent() {
    let h = history();
    let extractor = extractor(&h.repo);
    let fixed = extractor.find_fixed_commits(&head()).unwrap();
    let options = FeatureOptions {
        fixed: Some(&fixed),
        ..FeatureOptions::default()
    };

    let label = |oid| {
        extractor
            .get_full_feature_vector(&h.repo.find(oid), &options)
            .unwrap()
            .label
    };
    assert_eq!(label(h.bug), 1);
    assert_eq!(label(h.fix), 0);
    assert_eq!(label(h.unrelated), 0);
}

#[test]
fn test_heuristic_labels_without_index() {
    let h = history();
    let extractor = extractor(&h.repo);

    assert_eq!(extractor.label_commit(&h.repo.find(h.fix)), 1);
    assert_eq!(extractor.label_commit(&h.repo.find(h.bug)), 0);

    let record = extractor
        .get_full_feature_vector(&h.repo.find(h.fix), &FeatureOptions::default())
        .unwrap();
    assert_eq!(record.label, 1);
    assert_eq!(record.trailers.reported_by, 1);
    assert_eq!(record.trailers.signed_off, 1);
}

#[test]
fn test_tool_index_keys_subset_of_fixed_index() {
    let mut h = history();
    h.repo.commit(
        &fixes_message("docs: fix typo", h.unrelated, ""),
        &[("Documentation/howto.rst", Some("how to\n"))],
    );
    let extractor = extractor(&h.repo);

    let fixed = extractor.find_fixed_commits(&head()).unwrap();
    let tools = extractor
        .find_fixed_commits_with_tool_indication(&head(), ToolPolicy::Last)
        .unwrap();

    assert_eq!(tools.len(), 2);
    assert!(tools.keys().all(|k| fixed.contains(k)));
    assert_eq!(tools.get(&key(h.bug)), Some(1));
    assert_eq!(tools.get(&key(h.unrelated)), Some(0));
}

#[test]
fn test_tool_policies_for_multiple_fixers() {
    let mut h = history();
    // Newer fixer without a tool mention; the older one mentions syzbot
    h.repo.commit(
        &fixes_message("drivers: repair probe again", h.bug, ""),
        &[("drivers/p.c", Some("probe v3\n"))],
    );
    let extractor = extractor(&h.repo);
    let bug = key(h.bug);

    let tool = |policy| {
        extractor
            .find_fixed_commits_with_tool_indication(&head(), policy)
            .unwrap()
            .tool_found(&bug)
    };
    assert_eq!(tool(ToolPolicy::Last), 1);
    assert_eq!(tool(ToolPolicy::First), 0);
    assert_eq!(tool(ToolPolicy::Any), 1);
}

#[test]
fn test_ortho_export() {
    let h = history();
    let extractor = extractor(&h.repo);
    let fixed = extractor.find_fixed_commits(&head()).unwrap();
    let tools = extractor
        .find_fixed_commits_with_tool_indication(&head(), ToolPolicy::Last)
        .unwrap();
    let options = FeatureOptions {
        fixed: Some(&fixed),
        tools: Some(&tools),
        with_message: false,
    };

    let dir = tempfile::TempDir::new().unwrap();
    let out = dir.path().join("ortho.csv");
    let stats = export::export_ortho(&extractor, &head(), options, &out).unwrap();
    assert_eq!(stats.rows, 3);

    let text = std::fs::read_to_string(&out).unwrap();
    let expected = format!(
        "commit_hash,label,tool_found\n{},0,0\n{},0,0\n{},1,1\n",
        key(h.fix),
        key(h.unrelated),
        key(h.bug)
    );
    assert_eq!(text, expected);
}

#[test]
fn test_feature_export_with_tool_column() {
    let h = history();
    let extractor = extractor(&h.repo);
    let fixed = extractor.find_fixed_commits(&head()).unwrap();
    let tools = extractor
        .find_fixed_commits_with_tool_indication(&head(), ToolPolicy::Last)
        .unwrap();
    let options = FeatureOptions {
        fixed: Some(&fixed),
        tools: Some(&tools),
        with_message: false,
    };

    let mut out = Vec::new();
    let stats = export::write_features(&mut out, extractor.features(&head(), options).unwrap(), true, false).unwrap();
    assert_eq!(stats.rows, 3);

    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().next().unwrap().ends_with(",label,tool_found"));
    let bug_row = text.lines().find(|l| l.starts_with(&key(h.bug))).unwrap();
    assert!(bug_row.ends_with(",1,1"));
}

#[test]
fn test_bug_lifetimes() {
    let mut repo = TestRepo::new();
    repo.commit("Initial import", &[("mm/a.c", Some("a\n"))]);
    let bug_time = BASE_TIME + 10 * 3_600;
    let bug = repo.commit_at(
        "mm: add cache",
        &[("mm/a.c", Some("a\nb\n"))],
        Time::new(bug_time, 0),
        Time::new(bug_time, 0),
    );

    // 3 days and 5 hours later
    let fix_time = bug_time + 3 * 86_400 + 5 * 3_600;
    repo.commit_at(
        &fixes_message("mm: repair cache", bug, ""),
        &[("mm/a.c", Some("a\nc\n"))],
        Time::new(fix_time, 0),
        Time::new(fix_time, 0),
    );

    let unknown_time = fix_time + 3_600;
    repo.commit_at(
        "mm: repair something\n\nFixes: deadbeefdead (\"gone\")\n",
        &[("mm/a.c", Some("a\nd\n"))],
        Time::new(unknown_time, 0),
        Time::new(unknown_time, 0),
    );

    // A fix that names a commit made after it
    let tip = repo.head().unwrap();
    let future = repo.side_commit_at(tip, "mm: later", &[("mm/z.c", Some("z\n"))], Time::new(fix_time + 30 * 86_400, 0));
    let early_time = unknown_time + 3_600;
    repo.commit_at(
        &fixes_message("mm: odd fix", future, ""),
        &[("mm/a.c", Some("a\ne\n"))],
        Time::new(early_time, 0),
        Time::new(early_time, 0),
    );

    let lifetimes = extractor(&repo).extract_bug_lifetimes(&head()).unwrap();
    assert_eq!(lifetimes, vec![3]);
}

#[test]
fn test_shorter_key_len_is_respected() {
    let h = history();
    let mut config = FixtrailConfig::default();
    config.extract.hash_key_len = 8;
    let extractor = FeatureExtractor::open(h.repo.path(), &config).unwrap();

    let index = extractor.find_fixed_commits(&head()).unwrap();
    assert!(index.contains(&h.bug.to_string()[..8]));

    let record = extractor
        .get_full_feature_vector(&h.repo.find(h.bug), &FeatureOptions::default())
        .unwrap();
    assert_eq!(record.metadata.commit_hash.len(), 8);
}
