use assert_cmd::Command;
use predicates::prelude::*;

fn solver() -> Command {
    Command::cargo_bin("solver-cli").unwrap()
}

#[test]
fn solves_4x4_and_reports_a_white_win() {
    let dir = tempfile::tempdir().unwrap();
    solver()
        .current_dir(dir.path())
        .args(["--board-size", "4", "--tt-entries", "100003", "--no-save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result=1"));
}

#[test]
fn progress_lines_carry_move_stacks_and_fill() {
    let dir = tempfile::tempdir().unwrap();
    solver()
        .current_dir(dir.path())
        .args(["--board-size", "4", "--tt-entries", "100003", "--no-save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/3").and(predicate::str::contains("%")))
        .stdout(predicate::str::is_match(r"(?m)^\[\d+\]\t").unwrap());
}

#[test]
fn saves_and_reloads_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let tt = dir.path().join("tp.data");
    let tt_arg = tt.to_str().unwrap();

    solver()
        .current_dir(dir.path())
        .args(["--board-size", "4", "--tt-entries", "100003", "--tt-file", tt_arg])
        .assert()
        .success();
    assert!(tt.exists());

    // the second run loads the dump and reaches the same result
    solver()
        .current_dir(dir.path())
        .args(["--board-size", "4", "--tt-entries", "100003", "--tt-file", tt_arg, "--no-save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result=1"));
}

#[test]
fn count_boards_prints_the_sizing_table() {
    solver()
        .args(["--board-size", "4", "--count-boards"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Possible 4x4 boards"))
        .stdout(predicate::str::contains("total"));
}

#[test]
fn rejects_a_table_too_small_for_the_board() {
    solver()
        .args(["--board-size", "8", "--tt-entries", "100003", "--no-load", "--no-save"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot address"));
}

#[test]
fn rejects_out_of_range_board_size() {
    solver().args(["--board-size", "9"]).assert().failure();
    solver().args(["--board-size", "3"]).assert().failure();
}
