use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn workbook(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_workbook"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

fn init(home: &Path, name: &str) {
    workbook(home)
        .args(["init", "--name", name, "--owner", "u1"])
        .assert()
        .success()
        .stdout(contains(format!("Created workspace '{name}'")));
}

fn document(home: &Path, extra: &[&str]) -> Value {
    let output = workbook(home)
        .args(extra)
        .args(["show", "--json"])
        .output()
        .expect("run show");
    assert!(output.status.success(), "show failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("show --json emits JSON")
}

fn page_names(doc: &Value, group: usize) -> Vec<String> {
    doc["groups"][group]["pages"]
        .as_array()
        .expect("pages array")
        .iter()
        .map(|p| p["name"].as_str().expect("name").to_string())
        .collect()
}

#[test]
fn init_writes_workspace_document() {
    let home = TempDir::new().expect("home");
    init(home.path(), "Home");

    let doc = document(home.path(), &[]);
    assert_eq!(doc["name"], "Home");
    assert_eq!(doc["ownerId"], "u1");
    let id = doc["id"].as_str().expect("id");
    assert!(home
        .path()
        .join(format!(".workbook/workspaces/{id}.json"))
        .is_file());
}

#[test]
fn blank_owner_is_rejected() {
    let home = TempDir::new().expect("home");
    workbook(home.path())
        .args(["init", "--name", "Home", "--owner", "  "])
        .assert()
        .failure()
        .stderr(contains("must not be blank"));
}

#[test]
fn commands_without_workspace_explain_next_step() {
    let home = TempDir::new().expect("home");
    workbook(home.path())
        .arg("show")
        .assert()
        .failure()
        .stderr(contains("No workspaces found"));
}

#[test]
fn tasks_page_workflow() {
    let home = TempDir::new().expect("home");
    init(home.path(), "Home");

    workbook(home.path())
        .args(["group", "add", "Chores"])
        .assert()
        .success();
    workbook(home.path())
        .args(["page", "add", "chores", "Today", "--kind", "tasks"])
        .assert()
        .success()
        .stdout(contains("Added tasks page 'Today'"));
    workbook(home.path())
        .args([
            "page",
            "set-data",
            "Chores",
            "Today",
            "--json",
            concat!(
                r#"{"tasks":[{"id":"t1","title":"Dishes","completed":true},"#,
                r#"{"id":"t2","title":"Laundry","completed":false}]}"#,
            ),
        ])
        .assert()
        .success();

    workbook(home.path())
        .args(["page", "show", "Chores", "Today"])
        .assert()
        .success()
        .stdout(contains("1/2 done"))
        .stdout(contains("Laundry"));

    workbook(home.path())
        .args(["search", "TODAY"])
        .assert()
        .success()
        .stdout(contains("Chores").and(contains("Today")));
    workbook(home.path())
        .args(["search", "   "])
        .assert()
        .success()
        .stdout(contains("No pages match"));
}

#[test]
fn invalid_payload_is_rejected_and_nothing_changes() {
    let home = TempDir::new().expect("home");
    init(home.path(), "Home");
    workbook(home.path())
        .args(["group", "preset", "finance"])
        .assert()
        .success()
        .stdout(contains("Added 'Finance' with 2 pages"));
    let before = document(home.path(), &[]);

    workbook(home.path())
        .args([
            "page",
            "set-data",
            "Finance",
            "Budget",
            "--json",
            r#"{"items":[{"id":"b1","description":"rent","type":"expense","date":"2024-01-01"}]}"#,
        ])
        .assert()
        .failure()
        .stderr(contains("invalid budget payload"));

    assert_eq!(document(home.path(), &[]), before);
}

#[test]
fn set_data_reads_payload_file() {
    let home = TempDir::new().expect("home");
    init(home.path(), "Home");
    workbook(home.path())
        .args(["group", "preset", "personal"])
        .assert()
        .success();
    let payload = home.path().join("calendar.json");
    fs::write(
        &payload,
        r#"{"events":[{"id":"e1","title":"Dentist","date":"2024-03-01","startTime":"09:30"}]}"#,
    )
    .expect("write payload");

    workbook(home.path())
        .args(["page", "set-data", "Personal", "Calendar", "--file"])
        .arg(&payload)
        .assert()
        .success();
    workbook(home.path())
        .args(["page", "show", "Personal", "Calendar", "--json"])
        .assert()
        .success()
        .stdout(contains("Dentist"));
}

#[test]
fn move_and_reorder_pages() {
    let home = TempDir::new().expect("home");
    init(home.path(), "Home");
    workbook(home.path())
        .args(["group", "preset", "work"])
        .assert()
        .success();
    workbook(home.path())
        .args(["group", "add", "Later"])
        .assert()
        .success();

    workbook(home.path())
        .args(["page", "move", "Work", "Bugs", "Later"])
        .assert()
        .success()
        .stdout(contains("at position 0"));
    workbook(home.path())
        .args(["page", "reorder", "Work", "0", "2"])
        .assert()
        .success();

    let doc = document(home.path(), &[]);
    assert_eq!(page_names(&doc, 0), ["Sprint", "Roadmap", "Board"]);
    assert_eq!(page_names(&doc, 1), ["Bugs"]);
    let positions: Vec<u64> = doc["groups"][0]["pages"]
        .as_array()
        .expect("pages")
        .iter()
        .map(|p| p["position"].as_u64().expect("position"))
        .collect();
    assert_eq!(positions, [0, 1, 2]);

    workbook(home.path())
        .args(["page", "reorder", "Work", "0", "9"])
        .assert()
        .failure()
        .stderr(contains("out of range"));
}

#[test]
fn group_commands_update_tree() {
    let home = TempDir::new().expect("home");
    init(home.path(), "Home");
    for name in ["A", "B"] {
        workbook(home.path())
            .args(["group", "add", name])
            .assert()
            .success();
    }
    workbook(home.path()).args(["group", "move", "0", "1"]).assert().success();
    workbook(home.path()).args(["group", "rename", "a", "Alpha"]).assert().success();
    workbook(home.path())
        .args(["group", "toggle", "Alpha"])
        .assert()
        .success()
        .stdout(contains("collapsed"));
    workbook(home.path()).args(["group", "favorite", "B"]).assert().success();

    let doc = document(home.path(), &[]);
    assert_eq!(doc["groups"][0]["name"], "B");
    assert_eq!(doc["groups"][0]["favorite"], true);
    assert_eq!(doc["groups"][1]["name"], "Alpha");
    assert_eq!(doc["groups"][1]["expanded"], false);

    workbook(home.path()).args(["group", "delete", "B"]).assert().success();
    let doc = document(home.path(), &[]);
    assert_eq!(doc["groups"].as_array().expect("groups").len(), 1);

    workbook(home.path())
        .args(["group", "rename", "Missing", "X"])
        .assert()
        .failure()
        .stderr(contains("no group with id or name 'Missing'"));
}

#[test]
fn favorites_lists_marked_pages() {
    let home = TempDir::new().expect("home");
    init(home.path(), "Home");
    workbook(home.path())
        .args(["group", "preset", "fitness"])
        .assert()
        .success();
    workbook(home.path())
        .arg("favorites")
        .assert()
        .success()
        .stdout(contains("No favorite pages"));

    workbook(home.path())
        .args(["page", "favorite", "Fitness", "Meals"])
        .assert()
        .success()
        .stdout(contains("marked as favorite"));
    workbook(home.path())
        .arg("favorites")
        .assert()
        .success()
        .stdout(contains("Meals").and(contains("Workouts").not()));
}

#[test]
fn multiple_workspaces_need_explicit_selection() {
    let home = TempDir::new().expect("home");
    init(home.path(), "One");
    init(home.path(), "Two");

    workbook(home.path())
        .arg("show")
        .assert()
        .failure()
        .stderr(contains("Multiple workspaces found"));

    let listing = fs::read_dir(home.path().join(".workbook/workspaces")).expect("workspaces dir");
    let ids: Vec<String> = listing
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name();
            name.to_str()
                .and_then(|n| n.strip_suffix(".json"))
                .map(String::from)
        })
        .collect();
    assert_eq!(ids.len(), 2);
    for id in &ids {
        let doc = document(home.path(), &["--workspace", id]);
        assert_eq!(doc["id"], id.as_str());
    }
}

#[test]
fn unknown_kind_is_a_usage_error() {
    let home = TempDir::new().expect("home");
    init(home.path(), "Home");
    workbook(home.path()).args(["group", "add", "G"]).assert().success();
    workbook(home.path())
        .args(["page", "add", "G", "P", "--kind", "spreadsheet"])
        .assert()
        .failure()
        .stderr(contains("unknown template kind 'spreadsheet'"));
}

#[test]
fn config_seeds_presets_on_init() {
    let home = TempDir::new().expect("home");
    let dir = home.path().join(".workbook");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("config.yaml"), "seed_presets: [personal, study]\n").expect("write config");

    workbook(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(contains("seed_presets").and(contains("study")));

    init(home.path(), "Home");
    let doc = document(home.path(), &[]);
    let groups: Vec<&str> = doc["groups"]
        .as_array()
        .expect("groups")
        .iter()
        .map(|g| g["name"].as_str().expect("name"))
        .collect();
    assert_eq!(groups, ["Personal", "Study"]);
}

#[test]
fn malformed_config_is_reported() {
    let home = TempDir::new().expect("home");
    let dir = home.path().join(".workbook");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("config.yaml"), "persistence: floppy\n").expect("write config");

    workbook(home.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(contains("config.yaml"));
}
