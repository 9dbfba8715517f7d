//! Exit-code and usage behavior of the binary. Nothing here needs network
//! access, yt-dlp, or ffmpeg: validation failures abort before any external
//! tool is touched, and the empty-sweep path short-circuits before the
//! ffmpeg probe.

use assert_cmd::Command;
use predicates::prelude::*;

fn ripped() -> Command {
    Command::cargo_bin("ripped").unwrap()
}

#[test]
fn no_tokens_after_mode_is_usage_error() {
    ripped()
        .arg("video")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage: ripped"));
}

#[test]
fn unknown_mode_is_user_error() {
    ripped()
        .args(["bogus", "max", "http://example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mode must be one of"));
}

#[test]
fn bad_quality_is_user_error() {
    ripped()
        .args(["video", "bad", "http://example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("quality must be"));
}

#[test]
fn bad_url_is_user_error() {
    ripped()
        .args(["video", "720", "not-a-url"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("URL must start with http"));
}

#[test]
fn convert_without_path_is_usage_error() {
    ripped()
        .arg("convert")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage: ripped convert <path>"));
}

#[test]
fn convert_missing_path_is_user_error() {
    ripped()
        .args(["convert", "this-path-does-not-exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn convert_empty_directory_reports_nothing_to_do() {
    let dir = tempfile::tempdir().unwrap();
    ripped()
        .args(["convert", &dir.path().to_string_lossy()])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("No webm/mkv files found"));
}

#[test]
fn menu_exits_cleanly_on_closed_stdin() {
    ripped()
        .arg("menu")
        .write_stdin("")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Goodbye."));
}

#[test]
fn menu_explicit_exit_choice() {
    ripped()
        .write_stdin("6\n")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Goodbye."));
}

#[test]
fn version_flag_works() {
    ripped().arg("--version").assert().success();
}
