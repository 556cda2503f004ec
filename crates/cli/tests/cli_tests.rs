//! Command-line tests for the offline paths of `bookswipe`.

use assert_cmd::Command;
use predicates::prelude::*;

fn bookswipe() -> Command {
    let mut cmd = Command::cargo_bin("bookswipe").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("GROQ_API_KEY");
    cmd
}

#[test]
fn test_rails_lists_every_rail() {
    bookswipe()
        .arg("rails")
        .assert()
        .success()
        .stdout(predicate::str::contains("dark-academia"))
        .stdout(predicate::str::contains("Trending This Week"))
        .stdout(predicate::str::contains("cozy fantasy"));
}

#[test]
fn test_blurb_without_key_uses_fallback() {
    bookswipe()
        .args(["blurb", "--title", "Murder at the Vicarage", "--author", "Agatha Christie"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "A gripping mystery by Agatha Christie.",
        ));
}

#[test]
fn test_blurb_condenses_description() {
    bookswipe()
        .args([
            "blurb",
            "--title",
            "Dune",
            "--author",
            "Frank Herbert",
            "--description",
            "A desert planet and its spice.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Discover a desert planet and its spice."));
}

#[test]
fn test_offline_search() {
    bookswipe()
        .args(["--offline", "search", "--query", "weir"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project Hail Mary (2021) by Andy Weir"))
        .stdout(predicate::str::contains("Fourth Wing").not());
}

#[test]
fn test_offline_swipe_session() {
    bookswipe()
        .args(["--offline", "swipe"])
        .write_stdin("l\np\nd -150\nd 30\nf\nm\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Liked 'Project Hail Mary'"))
        .stdout(predicate::str::contains("Passed on 'Book Lovers'"))
        .stdout(predicate::str::contains("Passed on 'Lessons in Chemistry'"))
        .stdout(predicate::str::contains("snapped back"))
        .stdout(predicate::str::contains("Pages: 528"))
        .stdout(predicate::str::contains("1 book(s) liked this session"));
}

#[test]
fn test_conflicting_deck_options_are_rejected() {
    bookswipe()
        .args(["--offline", "swipe", "--query", "x", "--rail", "dark-academia"])
        .assert()
        .failure();
}

#[test]
fn test_unknown_rail_is_rejected() {
    bookswipe()
        .args(["--offline", "swipe", "--rail", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown rail"));
}
