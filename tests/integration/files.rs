//! Lowering from files on disk

use macrolower::lower_file;
use macrolower::middle::{PassKind, Pipeline};
use macrolower::util::config::{resolve_config, PROJECT_CONFIG_FILE};
use std::fs;

#[test]
fn test_lower_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("op.asm");
    fs::write(&path, "    btqnz t0, -1, .done\n.done:\n    ret\n").unwrap();

    let out = lower_file(&path, &Pipeline::default()).unwrap();
    assert_eq!(out, "    bqneq t0, 0, .done\n.done:\n    ret\n");
}

#[test]
fn test_missing_file_has_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.asm");
    let err = lower_file(&path, &Pipeline::default()).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read:"));
}

#[test]
fn test_project_config_selects_passes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(PROJECT_CONFIG_FILE),
        "[pipeline]\npasses = [\"not\"]\n",
    )
    .unwrap();
    let path = dir.path().join("op.asm");
    fs::write(&path, "    noti t0\n    btiz t0, t1, .L\n").unwrap();

    let config = resolve_config(None, dir.path()).unwrap();
    assert_eq!(config.pipeline.passes, vec![PassKind::Not]);

    let out = lower_file(&path, &config.pipeline.to_pipeline()).unwrap();
    assert_eq!(out, "    xori -1, t0\n    btiz t0, t1, .L\n");
}

#[test]
fn test_explicit_config_wins() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(PROJECT_CONFIG_FILE),
        "[pipeline]\npasses = [\"not\"]\n",
    )
    .unwrap();
    let explicit = dir.path().join("other.toml");
    fs::write(&explicit, "[pipeline]\npasses = [\"mul-overflow\", \"bit-test\"]\n").unwrap();

    let config = resolve_config(Some(explicit.as_path()), dir.path()).unwrap();
    assert_eq!(config.pipeline.passes, vec![PassKind::MulOverflow, PassKind::BitTest]);
}
