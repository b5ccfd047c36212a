use std::path::PathBuf;
use std::process::{Command, Output};

fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_puzzleboard-cli"));
    command.env_remove("PUZZLEBOARD_STORE").env_remove("PUZZLEBOARD_CATALOG");
    command
}

fn temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("puzzleboard-cli-{tag}-{}.json", std::process::id()))
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn presets_list_grid_sizes() {
    let output = cli().arg("presets").output().expect("run cli");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("easy: 12 pieces (3x4)"));
    assert!(stdout.contains("medium: 20 pieces (4x5)"));
    assert!(stdout.contains("hard: 42 pieces (6x7)"));
}

#[test]
fn catalog_marks_weekly_pick() {
    let path = temp_file("catalog");
    std::fs::write(
        &path,
        r#"{"puzzles":[{"id":"a","title":"Alpha","imageUrl":"https://img.test/a.jpg"},{"id":"b","title":"Beta","imageUrl":"https://img.test/b.jpg"}]}"#,
    )
    .expect("write catalog");
    // one week after 2025-01-01
    let output = cli()
        .args(["catalog", "--file"])
        .arg(&path)
        .args(["--now-ms", "1736294400000"])
        .output()
        .expect("run cli");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("  a | Alpha | https://img.test/a.jpg?w=1200&q=70&auto=format&fit=crop"));
    assert!(stdout.contains("* b | Beta |"));
    let _ = std::fs::remove_file(path);
}

#[test]
fn simulate_solves_and_keeps_best() {
    let store = temp_file("simulate");
    let _ = std::fs::remove_file(&store);
    let run = |elapsed: &str| {
        cli()
            .args(["simulate", "--difficulty", "medium", "--seed", "0x5EED", "--elapsed-ms", elapsed, "--store"])
            .arg(&store)
            .output()
            .expect("run cli")
    };

    let first = stdout_of(&run("75000"));
    assert!(first.contains("placed 20/20 progress 100%"), "{first}");
    assert!(first.contains("aligned 20/20 at home 20 offset (0, 0)"), "{first}");
    assert!(first.contains("completed in 01:15 after 40 drags (new best); Best: 01:15"), "{first}");

    let slower = stdout_of(&run("90000"));
    assert!(slower.contains("(best unchanged); Best: 01:15"), "{slower}");

    let best = stdout_of(&cli().args(["best", "--puzzle", "local-default", "--store"]).arg(&store).output().expect("run cli"));
    assert!(best.contains("local-default medium: Best: 01:15"), "{best}");
    assert!(best.contains("local-default easy: Best: --:--"), "{best}");
    let _ = std::fs::remove_file(store);
}

#[test]
fn force_win_only_records_when_asked() {
    let store = temp_file("force-win");
    let _ = std::fs::remove_file(&store);
    let plain = stdout_of(&cli().args(["force-win", "--store"]).arg(&store).output().expect("run cli"));
    assert!(plain.contains("new best: false"), "{plain}");
    assert!(plain.contains("Best: --:--"), "{plain}");

    let recorded = stdout_of(
        &cli()
            .args(["force-win", "--update-best", "--elapsed-ms", "42000", "--store"])
            .arg(&store)
            .output()
            .expect("run cli"),
    );
    assert!(recorded.contains("new best: true"), "{recorded}");
    assert!(recorded.contains("Best: 00:42"), "{recorded}");
    let _ = std::fs::remove_file(store);
}

#[test]
fn zero_time_best_is_kept_as_a_record() {
    let store = temp_file("zero-best");
    let _ = std::fs::remove_file(&store);
    let run = |elapsed: &str| {
        cli()
            .args(["force-win", "--update-best", "--elapsed-ms", elapsed, "--store"])
            .arg(&store)
            .output()
            .expect("run cli")
    };

    let instant = stdout_of(&run("0"));
    assert!(instant.contains("new best: true"), "{instant}");
    assert!(instant.contains("Best: 00:00"), "{instant}");

    let slower = stdout_of(&run("5000"));
    assert!(slower.contains("new best: false"), "{slower}");
    assert!(slower.contains("Best: 00:00"), "{slower}");
    let _ = std::fs::remove_file(store);
}

#[test]
fn unknown_puzzle_is_an_error() {
    let output = cli().args(["simulate", "--puzzle", "nope", "--store"]).arg(temp_file("unknown")).output().expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown puzzle: nope"));
}
