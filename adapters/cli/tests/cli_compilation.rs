use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "trio-tiles"])
        .status()
        .expect("failed to invoke cargo check for trio-tiles CLI binary");

    assert!(status.success(), "cargo check --bin trio-tiles should succeed");
}

#[test]
fn cli_prints_bundled_configuration() {
    let output = Command::new(env!("CARGO_BIN_EXE_trio-tiles"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["--config", "config/default.toml", "--print-config"])
        .output()
        .expect("failed to run trio-tiles");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("match_threshold = 3"), "{stdout}");
}

#[test]
fn cli_autoplay_clears_the_board() {
    let output = Command::new(env!("CARGO_BIN_EXE_trio-tiles"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to run trio-tiles");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Trio Tiles."), "{stdout}");
    assert!(stdout.contains("removed: 9, remaining: 0"), "{stdout}");
}
