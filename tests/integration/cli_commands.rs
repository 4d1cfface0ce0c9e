//! Binary-level tests of the command surface.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;

struct Workspace {
    dir: tempfile::TempDir,
    database: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let database = dir.path().join("catalogue.db");
        let workspace = Self { dir, database };
        let output = workspace.run(&["init"]);
        assert!(output.status.success(), "init failed: {output:?}");
        workspace
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn touch(&self, name: &str) {
        fs::write(self.path().join(name), b"content").unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::cargo_bin("quarry")
            .unwrap()
            .current_dir(self.path())
            .env_remove("QUARRY_DB")
            .arg("--database")
            .arg(&self.database)
            .args(args)
            .output()
            .unwrap()
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(output.status.success(), "command {args:?} failed: {output:?}");
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

#[test]
fn init_tag_and_query_roundtrip() {
    let ws = Workspace::new();
    ws.touch("a.mp3");
    ws.touch("b.txt");

    ws.stdout(&["tag", "a.mp3", "music", "mp3"]);
    ws.stdout(&["tag", "b.txt", "document"]);

    let listed = ws.stdout(&["files", "music"]);
    assert!(listed.contains("a.mp3"));
    assert!(!listed.contains("b.txt"));

    // no query lists everything
    let listed = ws.stdout(&["files"]);
    assert!(listed.contains("a.mp3"));
    assert!(listed.contains("b.txt"));

    // juxtaposition and keywords agree
    assert_eq!(
        ws.stdout(&["files", "music", "mp3"]),
        ws.stdout(&["files", "music", "and", "mp3"])
    );
}

#[test]
fn unknown_names_warn_but_the_query_still_runs() {
    let ws = Workspace::new();
    ws.touch("a.mp3");
    ws.stdout(&["tag", "a.mp3", "music"]);

    let output = ws.run(&["files", "nosuch"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such tag 'nosuch'"));
    assert!(output.stdout.is_empty());

    let output = ws.run(&["files", "music", "year==1999"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no such tag 'year'"));
    assert!(stderr.contains("no such value '1999'"));
}

#[test]
fn malformed_queries_fail_with_a_parse_error() {
    let ws = Workspace::new();

    let output = ws.run(&["files", "(music"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not parse query"));
    assert!(stderr.contains("unexpected token: EOF"));

    let output = ws.run(&["files", "music))"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unexpected token: ')'"));
}

#[test]
fn implications_are_honored_and_listed() {
    let ws = Workspace::new();
    ws.touch("song.mp3");
    ws.stdout(&["tag", "song.mp3", "mp3"]);
    ws.stdout(&["imply", "mp3", "music"]);

    assert!(ws.stdout(&["files", "music"]).contains("song.mp3"));
    assert!(ws.stdout(&["files", "--explicit", "music"]).is_empty());
    assert!(ws.stdout(&["files", "music", "and", "not", "mp3"]).is_empty());

    assert_eq!(ws.stdout(&["imply"]).trim(), "mp3 -> music");

    let tags = ws.stdout(&["tags", "song.mp3"]);
    assert!(tags.contains("mp3"));
    assert!(tags.contains("music (implied)"));

    ws.stdout(&["imply", "--delete", "mp3", "music"]);
    assert!(ws.stdout(&["files", "music"]).is_empty());
}

#[test]
fn untag_removes_taggings_and_orphaned_files() {
    let ws = Workspace::new();
    ws.touch("a.mp3");
    ws.stdout(&["tag", "a.mp3", "music", "mp3"]);

    ws.stdout(&["untag", "a.mp3", "music"]);
    assert!(ws.stdout(&["files", "music"]).is_empty());
    assert!(ws.stdout(&["files", "mp3"]).contains("a.mp3"));

    // removing the last tagging drops the file from the catalogue
    ws.stdout(&["untag", "a.mp3", "mp3"]);
    assert!(ws.stdout(&["files"]).is_empty());
}

#[test]
fn tags_and_values_listings() {
    let ws = Workspace::new();
    ws.touch("a.mp3");
    ws.stdout(&["tag", "a.mp3", "music", "year=2017"]);

    let tags = ws.stdout(&["tags"]);
    assert!(tags.contains("music"));
    assert!(tags.contains("year"));

    let tags = ws.stdout(&["tags", "a.mp3"]);
    assert!(tags.contains("year=2017"));

    assert_eq!(ws.stdout(&["values", "year"]).trim(), "2017");
    assert_eq!(ws.stdout(&["values"]).trim(), "2017");
}

#[test]
fn count_prints_the_number_of_matches() {
    let ws = Workspace::new();
    ws.touch("a.mp3");
    ws.touch("b.mp3");
    ws.stdout(&["tag", "a.mp3", "music"]);
    ws.stdout(&["tag", "b.mp3", "music"]);

    assert_eq!(ws.stdout(&["files", "--count", "music"]).trim(), "2");
    assert_eq!(ws.stdout(&["files", "--count", "nosuch2"]).trim(), "0");
}

#[test]
fn json_output_is_well_formed() {
    let ws = Workspace::new();
    ws.touch("a.mp3");
    ws.stdout(&["tag", "a.mp3", "music"]);

    let stdout = ws.stdout(&["files", "--format", "json", "music"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0]["path"].as_str().unwrap().contains("a.mp3"));
}

#[test]
fn comparison_queries_through_the_cli() {
    let ws = Workspace::new();
    for (name, year) in [("old.mp3", "2000"), ("new.mp3", "2017")] {
        ws.touch(name);
        ws.stdout(&["tag", name, &format!("year={year}")]);
    }

    let listed = ws.stdout(&["files", "year>2015"]);
    assert!(listed.contains("new.mp3"));
    assert!(!listed.contains("old.mp3"));

    let listed = ws.stdout(&["files", "year", "lt", "2015"]);
    assert!(listed.contains("old.mp3"));
    assert!(!listed.contains("new.mp3"));
}

#[test]
fn ignore_case_flag_folds_names() {
    let ws = Workspace::new();
    ws.touch("a.mp3");
    ws.stdout(&["tag", "a.mp3", "Music"]);

    assert!(ws.stdout(&["files", "music"]).is_empty());
    assert!(ws.stdout(&["files", "--ignore-case", "music"]).contains("a.mp3"));
}
