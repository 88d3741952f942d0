//! Integration tests for commit traversal, filtering and feature extraction


use fixtrail::config::FixtrailConfig;
use fixtrail::export;
use fixtrail::git::RevisionRange;
use fixtrail::{FeatureExtractor, FeatureOptions, FixtrailError};
use git2::Time;
use std::path::Path;
use test_utils::{BASE_TIME, TestRepo, key};

fn extractor(repo: &TestRepo) -> FeatureExtractor {
    FeatureExtractor::open(repo.path(), &FixtrailConfig::default()).unwrap()
}

fn head() -> RevisionRange {
    RevisionRange::parse("HEAD").unwrap()
}

/// root: drivers/b.c; second: new kernel/a.c, modified drivers/b.c
fn kernel_drivers_repo() -> (TestRepo, git2::Oid, git2::Oid) {
    let mut repo = TestRepo::new();
    let root = repo.commit("Initial import", &[("drivers/b.c", Some("int b;\n"))]);
    let second = repo.commit(
        "kernel: add a\n\nSigned-off-by: Ada <ada@example.com>\nReviewed-by: Rev <rev@example.com>\n",
        &[
            ("kernel/a.c", Some("int a;\n")),
            ("drivers/b.c", Some("int b;\nint c;\n")),
        ],
    );
    (repo, root, second)
}

#[test]
fn test_fixture_trees_hold_file_contents() {
    let (mut repo, _, second) = kernel_drivers_repo();
    {
        let tree = repo.find(second).tree().unwrap();
        let entry = tree.get_path(Path::new("drivers/b.c")).unwrap();
        let blob = repo.repo.find_blob(entry.id()).unwrap();
        assert_eq!(blob.content(), b"int b;\nint c;\n");
    }

    let dropped = repo.commit("kernel: drop a", &[("kernel/a.c", None)]);
    let tree = repo.find(dropped).tree().unwrap();
    assert!(tree.get_path(Path::new("kernel/a.c")).is_err());
    assert!(tree.get_path(Path::new("drivers/b.c")).is_ok());
}

#[test]
fn test_diff_features_kernel_and_drivers() {
    let (repo, _, second) = kernel_drivers_repo();
    let extractor = extractor(&repo);
    let commit = repo.find(second);

    let diff = extractor.extract_diff_features(&commit).unwrap();
    assert_eq!(diff.files_changed, 2);
    assert_eq!(diff.file_impact, 7);
    assert_eq!(diff.dir_complexity, 11.25);
}

#[test]
fn test_full_feature_vector() {
    let (repo, _, second) = kernel_drivers_repo();
    let extractor = extractor(&repo);
    let commit = repo.find(second);

    let record = extractor
        .get_full_feature_vector(&commit, &FeatureOptions::default())
        .unwrap();
    assert_eq!(record.metadata.commit_hash, key(second));
    assert_eq!(record.metadata.author, "Ada Author");
    assert_eq!(record.metadata.committer, "Carl Committer");
    assert_eq!(record.trailers.signed_off, 1);
    assert_eq!(record.trailers.reviewed_by, 1);
    assert_eq!(record.trailers.by_sum, 2);
    assert_eq!(record.label, 0);
    assert_eq!(record.tool_found, None);
    assert_eq!(record.message, None);
}

#[test]
fn test_root_commit_is_not_informative() {
    let (repo, root, second) = kernel_drivers_repo();
    let extractor = extractor(&repo);

    assert!(!extractor.is_informative(&repo.find(root)).unwrap());
    assert!(extractor.is_informative(&repo.find(second)).unwrap());

    match extractor.extract_diff_features(&repo.find(root)) {
        Err(FixtrailError::Precondition { parents, .. }) => assert_eq!(parents, 0),
        other => panic!("expected precondition error, got {other:?}"),
    }
}

#[test]
fn test_empty_commit_is_not_informative() {
    let (mut repo, _, _) = kernel_drivers_repo();
    let empty = repo.commit("Retrigger CI", &[]);
    let extractor = extractor(&repo);

    assert!(!extractor.is_informative(&repo.find(empty)).unwrap());
}

#[test]
fn test_merge_commits_excluded_from_walk() {
    let (mut repo, root, _) = kernel_drivers_repo();
    let side = repo.side_commit(root, "Side work", &[("lib/c.c", Some("int c;\n"))]);
    let merge = repo.merge(side, "Merge branch 'side'");
    let extractor = extractor(&repo);

    let plain: Vec<_> = extractor
        .get_commits(&head())
        .unwrap()
        .map(|c| c.unwrap().id())
        .collect();
    assert_eq!(plain.len(), 3);
    assert!(!plain.contains(&merge));

    let all: Vec<_> = extractor
        .get_all_commits(&head())
        .unwrap()
        .map(|c| c.unwrap().id())
        .collect();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0], merge);

    assert!(!extractor.is_informative(&repo.find(merge)).unwrap());
    assert!(matches!(
        extractor.extract_diff_features(&repo.find(merge)),
        Err(FixtrailError::Precondition { parents: 2, .. })
    ));
}

#[test]
fn test_walk_is_newest_first_and_restartable() {
    let (mut repo, root, second) = kernel_drivers_repo();
    let third = repo.commit("mm: tune", &[("mm/x.c", Some("int x;\n"))]);
    let extractor = extractor(&repo);

    let first: Vec<_> = extractor.get_commits(&head()).unwrap().map(|c| c.unwrap().id()).collect();
    let again: Vec<_> = extractor.get_commits(&head()).unwrap().map(|c| c.unwrap().id()).collect();
    assert_eq!(first, vec![third, second, root]);
    assert_eq!(first, again);

    let mut lazy = extractor.get_commits(&head()).unwrap();
    assert_eq!(lazy.next().unwrap().unwrap().id(), third);
}

#[test]
fn test_two_and_three_dot_ranges() {
    let (mut repo, root, second) = kernel_drivers_repo();
    repo.tag("v1", root);
    let side = repo.side_commit(second, "Side", &[("fs/s.c", Some("s\n"))]);
    let main = repo.commit("Main", &[("fs/m.c", Some("m\n"))]);
    let extractor = extractor(&repo);

    let ids = |spec: &str| -> Vec<git2::Oid> {
        extractor
            .get_commits(&RevisionRange::parse(spec).unwrap())
            .unwrap()
            .map(|c| c.unwrap().id())
            .collect()
    };

    assert_eq!(ids("v1..HEAD"), vec![main, second]);
    let symmetric = ids(&format!("{side}...{main}"));
    assert_eq!(symmetric.len(), 2);
    assert!(symmetric.contains(&side) && symmetric.contains(&main));
}

#[test]
fn test_unknown_revision_is_an_error() {
    let (repo, _, _) = kernel_drivers_repo();
    let extractor = extractor(&repo);
    assert!(matches!(
        extractor.get_commits(&RevisionRange::parse("v9.9..HEAD").unwrap()),
        Err(FixtrailError::Git(_))
    ));
}

#[test]
fn test_metadata_normalizes_offsets() {
    let (mut repo, _, _) = kernel_drivers_repo();
    let author = Time::new(BASE_TIME + 100_000, 120);
    let committer = Time::new(BASE_TIME + 100_060, 0);
    let oid = repo.commit_at("  mm: backdated  \n\nbody\n", &[("mm/y.c", Some("y\n"))], author, committer);
    let extractor = extractor(&repo);

    let metadata = extractor.extract_commit_metadata(&repo.find(oid));
    assert_eq!(metadata.author_date, BASE_TIME + 100_000 + 7_200);
    assert_eq!(metadata.commit_date, BASE_TIME + 100_060);
    assert_eq!(metadata.commit_delay, 60 - 7_200);
    assert_eq!(metadata.message_length, "mm: backdated  \n\nbody".len());
}

#[test]
fn test_strict_filter_drops_small_diffs() {
    let (mut repo, _, _) = kernel_drivers_repo();
    let small = repo.commit("drivers: tweak", &[("drivers/b.c", Some("int b;\nint d;\n"))]);

    let lenient = extractor(&repo);
    assert!(lenient.is_informative(&repo.find(small)).unwrap());

    let mut config = FixtrailConfig::default();
    config.extract.strict = true;
    let strict = FeatureExtractor::open(repo.path(), &config).unwrap();
    assert!(!strict.is_informative(&repo.find(small)).unwrap());

    let big = repo.commit(
        "drivers: rewrite",
        &[("drivers/b.c", Some("1\n2\n3\n4\n5\n6\n"))],
    );
    let strict = FeatureExtractor::open(repo.path(), &config).unwrap();
    assert!(strict.is_informative(&repo.find(big)).unwrap());
}

#[test]
fn test_deleted_file_scores_zero_impact() {
    let (mut repo, _, _) = kernel_drivers_repo();
    let oid = repo.commit("kernel: drop a", &[("kernel/a.c", None)]);
    let extractor = extractor(&repo);

    let diff = extractor.extract_diff_features(&repo.find(oid)).unwrap();
    assert_eq!(diff.files_changed, 1);
    assert_eq!(diff.file_impact, 0);
    assert_eq!(diff.dir_complexity, 9.0);
}

#[test]
fn test_export_is_idempotent() {
    let (mut repo, _, _) = kernel_drivers_repo();
    repo.commit("net: fix leak", &[("net/n.c", Some("n\n"))]);
    let extractor = extractor(&repo);
    let out = tempfile::TempDir::new().unwrap();
    let first = out.path().join("first.csv");
    let second = out.path().join("second.csv");

    let options = FeatureOptions {
        with_message: true,
        ..FeatureOptions::default()
    };
    let stats = export::export_features(&extractor, &head(), options, &first).unwrap();
    export::export_features(&extractor, &head(), options, &second).unwrap();

    // Root commit is not informative
    assert_eq!(stats.rows, 2);
    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);

    let text = String::from_utf8(a).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with("commit_hash,author,author_date,committer,commit_date,commit_delay,message_length,"));
    assert!(header.ends_with(",files_changed,file_impact,dir_complexity,label,message"));
    assert!(text.contains("net: fix leak"));
}

#[test]
fn test_patch_volume_between_tags() {
    let mut repo = TestRepo::new();
    let v1 = repo.commit("v1", &[("a", Some("1\n"))]);
    repo.tag("v1", v1);
    repo.commit("one", &[("a", Some("2\n"))]);
    let v2 = repo.commit("two", &[("a", Some("3\n"))]);
    repo.tag("v2", v2);
    let side = repo.side_commit(v2, "side", &[("b", Some("b\n"))]);
    repo.commit("three", &[("a", Some("4\n"))]);
    let v3 = repo.merge(side, "Merge side");
    repo.tag("v3", v3);
    let extractor = extractor(&repo);

    let volumes = extractor.patch_volume(&["v1", "v2", "v3"]).unwrap();
    assert_eq!(volumes.len(), 2);
    assert_eq!(volumes[0].version, "v2");
    assert_eq!(volumes[0].patches, 2);
    assert_eq!(volumes[1].version, "v3");
    assert_eq!(volumes[1].patches, 3);

    assert!(extractor.patch_volume(&["v1"]).is_err());
}

#[test]
fn test_inspect_first_record_of_stream() {
    let (repo, _, second) = kernel_drivers_repo();
    let extractor = extractor(&repo);

    let options = FeatureOptions {
        with_message: true,
        ..FeatureOptions::default()
    };
    let mut stream = extractor.features(&head(), options).unwrap();
    let record = stream.next().unwrap().unwrap();
    assert_eq!(record.metadata.commit_hash, key(second));
    assert!(record.message.unwrap().starts_with("kernel: add a"));
    assert!(stream.next().is_none());
}

#[test]
fn test_strict_stream_matches_direct_extraction() {
    let (mut repo, _, _) = kernel_drivers_repo();
    repo.commit("drivers: tweak", &[("drivers/b.c", Some("int b;\nint d;\n"))]);
    let big = repo.commit("mm: rewrite", &[("mm/x.c", Some("1\n2\n3\n4\n5\n6\n"))]);

    let mut config = FixtrailConfig::default();
    config.extract.strict = true;
    let extractor = FeatureExtractor::open(repo.path(), &config).unwrap();
    let options = FeatureOptions::default();

    let streamed: Vec<_> = extractor
        .features(&head(), options)
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    // Only the six-line rewrite reaches the threshold of five changed lines
    let direct = extractor
        .get_full_feature_vector(&repo.find(big), &options)
        .unwrap();
    assert_eq!(streamed, vec![direct]);
    assert_eq!(streamed[0].diff.file_impact, 5);
}
