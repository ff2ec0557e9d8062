#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("movie"))
        .stdout(predicate::str::contains("watchlist"))
        .stdout(predicate::str::contains("review"));
}

#[test]
fn test_movie_show_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.args(["movie", "show", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--language"));
}

#[test]
fn test_movie_show_missing_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.args(["movie", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id"));
}

#[test]
fn test_movie_show_zero_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.args(["movie", "show", "--id", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid movie id"));
}

#[test]
fn test_movie_trailer_non_numeric_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.args(["movie", "trailer", "--id", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid movie id"));
}

#[test]
fn test_movie_show_without_token() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.env_remove("TMDB_API_TOKEN")
        .args(["--dir", dir.path().to_str().unwrap()])
        .args(["movie", "show", "--id", "550"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "TMDB_API_TOKEN environment variable is required",
        ));
}

#[test]
fn test_review_add_rating_out_of_range() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.args(["--dir", dir.path().to_str().unwrap()])
        .args([
            "review", "add", "--id", "550", "--rating", "0", "--comment", "Great",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "rating must be between 1 and 10 (got 0)",
        ));
}

#[test]
fn test_review_add_blank_comment() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.args(["--dir", dir.path().to_str().unwrap()])
        .args(["review", "add", "--id", "550", "--rating", "8", "--comment", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("comment must not be empty"));
}

#[test]
fn test_review_delete_missing_review_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.args(["review", "delete", "--id", "550"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--review"));
}

#[test]
fn test_watchlist_toggle_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinelog");
    cmd.args(["watchlist", "toggle", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--id"));
}
