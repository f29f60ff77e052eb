use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const REGISTRY: &str = r#"{
    "entities": {
        "PLAYER": { "type": { "ref": 0 } },
        "ENEMY": { "type": { "ref": 1 } },
        "ENEMY_ALT": { "type": { "ref": 1 } }
    }
}"#;

/// 临时工作目录：包含注册表与指向它的配置文件。
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("rtype.json"), REGISTRY).unwrap();
    fs::write(
        dir.path().join("rlevel.toml"),
        format!(
            "[logging]\nlevel = \"error\"\n\n[export]\nserver_game_config = {:?}\noutput_dir = {:?}\n",
            dir.path().join("rtype.json").to_string_lossy(),
            dir.path().join("maps").to_string_lossy(),
        ),
    )
    .unwrap();
    dir
}

fn rlevel(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rlevel").expect("binary exists");
    cmd.current_dir(dir)
        .env_remove("RLEVEL_CONFIG")
        .arg("--config")
        .arg(dir.join("rlevel.toml"));
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn new_place_and_inspect() {
    let dir = workspace();
    let map = dir.path().join("level.json");
    let game = dir.path().join("rtype.json");

    rlevel(dir.path())
        .arg("new")
        .arg(&map)
        .args(["--background", "background_3.png", "--game"])
        .arg(&game)
        .assert()
        .success();
    rlevel(dir.path())
        .arg("place")
        .arg(&map)
        .args(["ENEMY", "120.5", "-40"])
        .assert()
        .success();

    let level = read_json(&map);
    assert_eq!(level["map"]["id"], 3);
    assert_eq!(level["waves"][0]["name"], "ENEMY");
    assert_eq!(level["waves"][0]["ref"], 1);
    assert_eq!(level["waves"][0]["y"], -40.0);

    rlevel(dir.path())
        .arg("inspect")
        .arg(&map)
        .assert()
        .success()
        .stdout(predicate::str::contains("ENEMY ref=1"))
        .stdout(predicate::str::contains("background_3.png"));
}

#[test]
fn new_refuses_to_overwrite_without_force() {
    let dir = workspace();
    let map = dir.path().join("level.json");
    fs::write(&map, "{}").unwrap();

    rlevel(dir.path()).arg("new").arg(&map).assert().failure();
    rlevel(dir.path())
        .arg("new")
        .arg(&map)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn move_and_remove_use_decoded_ids() {
    let dir = workspace();
    let map = dir.path().join("level.json");
    fs::write(
        &map,
        r#"{"waves":[{"x":1,"y":1,"name":"PLAYER"},{"x":2,"y":2,"name":"ENEMY"}]}"#,
    )
    .unwrap();

    rlevel(dir.path())
        .arg("move")
        .arg(&map)
        .args(["1", "50", "60"])
        .assert()
        .success();
    rlevel(dir.path())
        .arg("remove")
        .arg(&map)
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("PLAYER"));

    let level = read_json(&map);
    let waves = level["waves"].as_array().unwrap();
    assert_eq!(waves.len(), 1);
    assert_eq!(waves[0]["name"], "ENEMY");
    assert_eq!(waves[0]["x"], 50.0);

    rlevel(dir.path())
        .arg("remove")
        .arg(&map)
        .arg("9")
        .assert()
        .failure();
}

#[test]
fn export_writes_runtime_levels() {
    let dir = workspace();
    let map = dir.path().join("level.json");
    fs::write(
        &map,
        r#"{"map":{"id":5},"waves":[{"x":10,"y":20,"name":"PLAYER"},{"x":30,"y":40,"name":"UFO"}]}"#,
    )
    .unwrap();

    rlevel(dir.path()).arg("export").arg(&map).assert().success();

    let server = read_json(&dir.path().join("maps/level_5-server.json"));
    assert_eq!(server["level_data"][0]["ref"], 0);
    assert_eq!(server["level_data"][1]["ref"], -1);
    assert_eq!(server["level_data"][1]["position"]["x"], 30.0);

    let client = read_json(&dir.path().join("maps/level_5-client.json"));
    assert_eq!(client["game"], "config/game/client-rtype.json");
    assert!(client.get("level_data").is_none());
}

#[test]
fn refs_lists_inverse_with_greatest_name() {
    let dir = workspace();
    rlevel(dir.path())
        .arg("refs")
        .arg(dir.path().join("rtype.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 -> ENEMY_ALT"))
        .stdout(predicate::str::contains("ENEMY -> 1"));
}

#[test]
fn malformed_map_is_inspected_as_default() {
    let dir = workspace();
    let map = dir.path().join("broken.json");
    fs::write(&map, "{ this is not json").unwrap();

    rlevel(dir.path())
        .arg("inspect")
        .arg(&map)
        .assert()
        .success()
        .stdout(predicate::str::contains("800x600"))
        .stdout(predicate::str::contains("malformed level document"));
}

#[test]
fn missing_map_fails() {
    let dir = workspace();
    rlevel(dir.path())
        .arg("inspect")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}
