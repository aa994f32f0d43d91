use std::cell::RefCell;
use std::path::Path;

use super::{relative, tree};
use crate::{evaluate, evaluate_all, evaluate_all_with, parse_rules, Observer, Rule, ScanOptions};

fn plan(rules: &str, base: &Path) -> Vec<String> {
    let rules = parse_rules(rules).unwrap();
    let targets = evaluate(&rules, base, &ScanOptions::default()).unwrap();
    relative(base, &targets)
}

#[test]
fn test_same_tree_same_plan() {
    let (_tmp, base) = tree(&[
        "a/Cargo.toml",
        "a/target/debug/x",
        "b/node_modules/y.js",
        "b/package.json",
        "c/app.log",
    ]);
    let rules = parse_rules(
        "skip node_modules\n\
         delete target when exists Cargo.toml\n\
         delete node_modules when exists package.json\n\
         delete **/*.log",
    )
    .unwrap();

    let first = evaluate(&rules, &base, &ScanOptions::default()).unwrap();
    let second = evaluate(&rules, &base, &ScanOptions::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        relative(&base, &first),
        vec!["a/target", "b/node_modules", "c/app.log"]
    );
}

#[test]
fn test_skipped_directory_is_a_target_but_not_its_contents() {
    let (_tmp, base) = tree(&[
        "app/package.json",
        "app/index.js",
        "app/node_modules/y.js",
        "app/node_modules/lib/x.js",
    ]);
    let found = plan(
        "skip node_modules\n\
         delete node_modules when exists package.json\n\
         delete **/*.js",
        &base,
    );
    assert_eq!(found, vec!["app/index.js", "app/node_modules"]);
    assert!(!found.iter().any(|p| p.starts_with("app/node_modules/")));
}

#[test]
fn test_ignored_directory_is_never_a_target() {
    let (_tmp, base) = tree(&[".git/HEAD", ".git/hooks/pre-commit", "src/.git/config"]);
    let found = plan("ignore .git\ndelete .git\ndelete HEAD\ndelete **/config", &base);
    assert!(found.is_empty(), "{found:?}");
}

#[test]
fn test_caller_patterns_behave_like_rules() {
    let (_tmp, base) = tree(&["vendor/a.log", "b.log", ".cache/c.log"]);
    let rules = parse_rules("delete **/*.log").unwrap();
    let options = ScanOptions {
        ignore: vec![".cache".into()],
        skip: vec!["vendor".into()],
        ..Default::default()
    };
    let targets = evaluate(&rules, &base, &options).unwrap();
    assert_eq!(relative(&base, &targets), vec!["b.log"]);
}

#[test]
fn test_cargo_workspace_locations() {
    let (_tmp, base) = tree(&[
        "workspace/Cargo.toml",
        "workspace/crate1/Cargo.toml",
        "workspace/crate1/target/",
        "workspace/crate2/target/",
    ]);

    assert_eq!(
        plan("delete target when exists Cargo.toml", &base),
        vec!["workspace/crate1/target"]
    );
    // the parent of a crate directory is the workspace root
    assert_eq!(
        plan("delete target when parent exists Cargo.toml", &base),
        vec!["workspace/crate1/target", "workspace/crate2/target"]
    );
}

#[test]
fn test_parent_location_is_relative_to_visited_directory() {
    let (_tmp, base) = tree(&[
        "workspace/Cargo.toml",
        "workspace/crate1/target/",
        "loose/crate2/target/",
    ]);
    assert_eq!(
        plan("delete target when parent exists Cargo.toml", &base),
        vec!["workspace/crate1/target"]
    );
}

#[test]
fn test_parents_reach_up_to_base() {
    let (_tmp, base) = tree(&[".sweep-root", "a/b/c/cache/"]);
    assert_eq!(
        plan("delete cache when parents exists .sweep-root", &base),
        vec!["a/b/c/cache"]
    );
}

#[test]
fn test_child_children_and_sibling() {
    let (_tmp, base) = tree(&[
        "proj/src/main.c",
        "proj/build/",
        "deep/a/b/main.c",
        "deep/build/",
        "web/app/dist/",
        "web/lib/package.json",
        "solo/app/dist/",
    ]);
    assert_eq!(plan("delete build when child exists main.c", &base), vec!["proj/build"]);
    assert_eq!(
        plan("delete build when children exists main.c", &base),
        vec!["deep/build", "proj/build"]
    );
    assert_eq!(
        plan("delete dist when sibling exists package.json", &base),
        vec!["web/app/dist"]
    );
}

#[test]
fn test_and_requires_both() {
    let (_tmp, base) = tree(&[
        "full/Cargo.toml",
        "full/src/",
        "full/target/",
        "manifest/Cargo.toml",
        "manifest/target/",
        "sources/src/",
        "sources/target/",
    ]);
    assert_eq!(
        plan("delete target when exists Cargo.toml and exists src", &base),
        vec!["full/target"]
    );
}

#[test]
fn test_and_chain_of_three() {
    let (_tmp, base) = tree(&[
        "x/a", "x/b", "x/c", "x/out/", "y/a", "y/b", "y/out/",
    ]);
    assert_eq!(
        plan("delete out when exists a and exists b and exists c", &base),
        vec!["x/out"]
    );
}

#[test]
fn test_not_excludes_marked_directories() {
    let (_tmp, base) = tree(&[
        "one/Cargo.toml",
        "one/target/",
        "two/Cargo.toml",
        "two/keep.txt",
        "two/target/",
    ]);
    assert_eq!(
        plan(
            "delete target when exists Cargo.toml and not exists keep.txt",
            &base
        ),
        vec!["one/target"]
    );
}

#[test]
fn test_quoted_targets() {
    let (_tmp, base) = tree(&["My Documents/", "notes.txt"]);
    assert_eq!(plan("delete \"My Documents\"", &base), vec!["My Documents"]);
}

#[test]
fn test_multiple_bases_union() {
    let (_tmp_a, a) = tree(&["x.log", "keep.txt"]);
    let (_tmp_b, b) = tree(&["y.log"]);
    let rules = parse_rules("delete *.log").unwrap();

    let targets = evaluate_all(&rules, [&a, &b], &ScanOptions::default()).unwrap();
    assert!(targets.contains(&a.join("x.log")));
    assert!(targets.contains(&b.join("y.log")));
    assert_eq!(targets.len(), 2);
}

#[test]
fn test_overlapping_bases_deduplicate() {
    let (_tmp, base) = tree(&["sub/x.log"]);
    let rules = parse_rules("delete *.log").unwrap();
    let targets =
        evaluate_all(&rules, [base.clone(), base.join("sub")], &ScanOptions::default()).unwrap();
    assert_eq!(targets.len(), 1);
}

#[test]
fn test_relative_base_is_canonicalized() {
    let (_tmp, base) = tree(&["inner/x.log"]);
    let rules = parse_rules("delete *.log").unwrap();
    let targets = evaluate(&rules, base.join("inner/../inner"), &ScanOptions::default()).unwrap();
    assert_eq!(targets.into_iter().collect::<Vec<_>>(), vec![base.join("inner/x.log")]);
}

#[derive(Default)]
struct Events(RefCell<Vec<String>>);

impl Observer for Events {
    fn scan_started(&self, rule_count: usize) {
        self.0.borrow_mut().push(format!("start {rule_count}"));
    }

    fn target_found(&self, path: &Path, rule: &Rule, _directory: &Path) {
        let name = path.file_name().unwrap().to_string_lossy();
        self.0.borrow_mut().push(format!("found {name} by `{rule}`"));
    }

    fn scan_completed(&self, count: usize) {
        self.0.borrow_mut().push(format!("done {count}"));
    }
}

#[test]
fn test_observer_sees_scan_and_does_not_change_results() {
    let (_tmp, base) = tree(&["a.log", "b.log"]);
    let rules = parse_rules("delete *.log\ndelete a.log").unwrap();

    let events = Events::default();
    let observed = evaluate_all_with(&rules, [&base], &ScanOptions::default(), &events).unwrap();
    let plain = evaluate(&rules, &base, &ScanOptions::default()).unwrap();
    assert_eq!(observed, plain);

    assert_eq!(
        events.0.into_inner(),
        vec![
            "start 2",
            "found a.log by `delete *.log`",
            "found b.log by `delete *.log`",
            "done 2",
        ]
    );
}
