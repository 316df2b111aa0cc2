use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use wildgrove_core::{roll_loot, Seed};

fn unique_temp_dir(label: &str) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("wildgrove_cli_{label}_{timestamp}"));
    std::fs::create_dir_all(&dir).expect("temp dir create");
    dir
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("wildgrove.toml");
    let config = format!(
        "world_seed = 11\nwidth = 3\nheight = 3\nticks = 50\nsaves_dir = {:?}\ncontent_packs_dir = {:?}\n",
        dir.join("saves").display().to_string(),
        dir.join("packs").display().to_string(),
    );
    std::fs::write(&path, config).expect("write config");
    path
}

fn wildgrove(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wildgrove"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("run wildgrove")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "wildgrove failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn loot_command_matches_library_roll() {
    let dir = unique_temp_dir("loot");
    let config = write_config(&dir);

    let out = stdout(&wildgrove(
        &config,
        &["loot", "--seed", "12345", "--base-chance", "40", "--rarity", "3", "--difficulty", "2"],
    ));
    let value: Value = serde_json::from_str(out.trim()).expect("json output");
    let expected = serde_json::to_value(roll_loot(Seed::new(12345), 40.0, 3, 2)).unwrap();
    assert_eq!(value, expected);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn simulate_is_reproducible_and_saves_resume() {
    let dir = unique_temp_dir("simulate");
    let config = write_config(&dir);

    let first = stdout(&wildgrove(&config, &["simulate", "--json"]));
    let second = stdout(&wildgrove(&config, &["simulate", "--json"]));
    assert_eq!(first, second);
    for line in first.lines() {
        let value: Value = serde_json::from_str(line).expect("json line");
        assert!(value["message"]["text"].is_string());
    }

    stdout(&wildgrove(&config, &["simulate", "--ticks", "20", "--save", "slot_a"]));
    let listing = stdout(&wildgrove(&config, &["saves", "list"]));
    assert!(listing.contains("slot_a"));

    let resumed = stdout(&wildgrove(
        &config,
        &["simulate", "--resume", "slot_a", "--ticks", "5"],
    ));
    assert!(resumed.contains("tick 25"));

    stdout(&wildgrove(&config, &["saves", "delete", "slot_a"]));
    assert!(!wildgrove(&config, &["saves", "delete", "slot_a"]).status.success());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_loot_table_is_an_error() {
    let dir = unique_temp_dir("table");
    let config = write_config(&dir);
    let output = wildgrove(&config, &["loot", "--table", "nope"]);
    assert!(!output.status.success());
    std::fs::remove_dir_all(&dir).ok();
}
