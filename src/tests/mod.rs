//! Tests against real repositories.
//! Each test:
//! - sets up a temporary git repository in a temporary directory
//! - runs some git commands and file operations
//! - asserts what the library reports about it
//! - cleans up the temporary directory
//!
//! It is useful when debugging to sometimes manually inspect a test-case.
//! ```rust`
//! dbg!(&ctx.dir.path());
//! ctx.dir.leak();
//! ````
//!

use std::fs;

mod helpers;

use crate::{
    git::VersionControl,
    path_set::PathSet,
    status::{self, classify},
};
use helpers::{RepoTestContext, commit, run};
use pretty_assertions::assert_eq;

fn paths(paths: &[&str]) -> PathSet {
    paths.iter().copied().collect()
}

const NO_FILTERS: &[&str] = &[];

#[test]
fn fresh_init_has_no_head() {
    let ctx = RepoTestContext::setup_init();

    assert_eq!(ctx.git().resolve_reference("HEAD").unwrap(), None);
    assert_eq!(ctx.git().latest_commit().unwrap(), None);
}

#[test]
fn untracked_file_in_empty_repo() {
    let ctx = RepoTestContext::setup_init();
    ctx.write("x.txt", "hello\n");

    let model = classify(&ctx.git(), NO_FILTERS, false, false);

    assert_eq!(model.modified_count, 0);
    assert_eq!(model.added_count, 0);
    assert_eq!(model.removed_count, 0);
    assert_eq!(model.renamed_count, 0);
    assert_eq!(model.untracked_paths, paths(&["x.txt"]));
}

#[test]
fn staged_and_unstaged_edit_counts_once() {
    let ctx = RepoTestContext::setup_init();
    commit(ctx.path(), "a.txt", "one\n");
    ctx.write("a.txt", "two\n");
    run(ctx.path(), &["git", "add", "a.txt"]);
    ctx.write("a.txt", "three\n");

    let model = classify(&ctx.git(), NO_FILTERS, false, false);

    assert_eq!(model.modified_count, 1);
    assert_eq!(model.tracked_paths, paths(&["a.txt"]));
}

#[test]
fn staged_new_and_deleted_files() {
    let ctx = RepoTestContext::setup_init();
    commit(ctx.path(), "old.txt", "old contents\n");
    ctx.write("new.txt", "completely different\n");
    run(ctx.path(), &["git", "add", "new.txt"]);
    run(ctx.path(), &["git", "rm", "-q", "old.txt"]);

    let model = classify(&ctx.git(), NO_FILTERS, false, false);

    assert_eq!(model.added_count, 1);
    assert_eq!(model.removed_count, 1);
    assert!(model.rename_targets.is_empty());
}

#[test]
fn ignored_files_are_reported_separately() {
    let ctx = RepoTestContext::setup_init();
    commit(ctx.path(), ".gitignore", "*.log\ntarget/\n");
    ctx.write("debug.log", "noise\n");
    ctx.write("target/out.bin", "binary\n");
    ctx.write("notes.txt", "keep\n");

    let model = classify(&ctx.git(), NO_FILTERS, false, false);

    assert_eq!(model.ignored_paths, paths(&["debug.log", "target"]));
    assert_eq!(model.untracked_paths, paths(&["notes.txt"]));
}

#[test]
fn untracked_files_hidden_by_git_config() {
    let ctx = RepoTestContext::setup_init();
    commit(ctx.path(), "a.txt", "a\n");
    run(ctx.path(), &["git", "config", "status.showUntrackedFiles", "no"]);
    ctx.write("b.txt", "b\n");

    let model = classify(&ctx.git(), NO_FILTERS, false, false);

    assert!(model.untracked_paths.is_empty());
}

#[test]
fn summary_of_clean_repo() {
    let ctx = RepoTestContext::setup_init();
    commit(ctx.path(), "a.txt", "a\n");
    commit(ctx.path(), "src/b.rs", "fn main() {}\n");

    let summary = status::summarize(&ctx.git()).unwrap();

    assert!(!summary.has_changes());
    assert_eq!(summary.all_tracked, paths(&["a.txt", "src/b.rs"]));

    let latest = summary.latest_commit.unwrap();
    assert_eq!(latest.message, "add src/b.rs");
    assert_eq!(latest.short_hash.len(), 7);
    assert_eq!(latest.date.to_rfc3339(), "2024-02-18T14:00:00+01:00");
}

#[test]
fn summary_sees_deleted_file() {
    let ctx = RepoTestContext::setup_init();
    commit(ctx.path(), "a.txt", "a\n");
    fs::remove_file(ctx.dir.child("a.txt")).unwrap();

    let summary = status::summarize(&ctx.git()).unwrap();

    assert!(summary.has_changes());
    assert_eq!(summary.missing, paths(&["a.txt"]));
}
