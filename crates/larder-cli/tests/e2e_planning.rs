//! E2E CLI tests covering:
//! - `larder plan` from typed lists and from the stored inventory
//! - Shopping list grouping, purchase links, and `--share` export
//! - `larder classify`, `larder suggest`
//! - `larder config show/set/unset` and malformed config handling

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn larder_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("larder"));
    cmd.current_dir(dir);
    cmd.env("LARDER_DB", dir.join("inventory.sqlite3"));
    cmd.env("LARDER_CONFIG", dir.join("config.toml"));
    cmd.env("LARDER_LOG", "error");
    cmd.env_remove("LARDER_FORMAT");
    cmd
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = larder_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

fn shopping_names(plan: &Value) -> Vec<String> {
    plan["shopping"]
        .as_array()
        .expect("shopping array")
        .iter()
        .flat_map(|group| group["items"].as_array().expect("items").iter())
        .map(|item| item["name"].as_str().expect("name").to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[test]
fn typed_lists_drive_a_protein_plan() {
    let dir = TempDir::new().expect("tempdir");
    let plan = run_json(
        dir.path(),
        &["plan", "--expiring", "chicken, rice", "--no-inventory"],
    );

    assert_eq!(plan["branch"], "protein");
    assert_eq!(plan["wasteSaved"], "1.0 kg");
    assert_eq!(plan["day1"]["name"], "Pan-Seared chicken with rice");
    assert_eq!(
        plan["tip"],
        "Refrigerate immediately; cook within 2 days"
    );
    assert_eq!(
        plan["shoppingList"],
        serde_json::json!(["Soy Sauce", "Ginger", "Cooking Oil", "Garlic"])
    );
    assert_eq!(
        shopping_names(&plan),
        ["Garlic", "Soy Sauce", "Ginger", "Cooking Oil"]
    );
}

#[test]
fn stocked_priority_items_are_planned_first() {
    let dir = TempDir::new().expect("tempdir");
    run_json(dir.path(), &["add", "garlic, olive oil"]);
    run_json(dir.path(), &["add", "salmon", "--priority"]);

    let plan = run_json(dir.path(), &["plan"]);
    assert_eq!(plan["branch"], "protein");
    assert!(
        plan["day1"]["name"]
            .as_str()
            .expect("day1 name")
            .starts_with("Pan-Seared Salmon with ")
    );
    assert_eq!(shopping_names(&plan), ["Soy Sauce", "Ginger"]);

    let group = &plan["shopping"][0];
    assert_eq!(group["bucket"], "Pantry");
    assert_eq!(
        group["items"][0]["link"],
        "https://blinkit.com/s/?q=Soy%20Sauce"
    );
}

#[test]
fn nothing_expiring_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    run_json(dir.path(), &["add", "milk"]);

    let output = larder_cmd(dir.path())
        .args(["plan", "--json"])
        .output()
        .expect("plan should not crash");
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(err["error"]["error_code"], "E2007");
}

#[test]
fn share_prints_grouped_plain_text() {
    let dir = TempDir::new().expect("tempdir");
    larder_cmd(dir.path())
        .args(["plan", "-e", "spinach", "--no-inventory", "--share"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[Produce]\n- Garlic\n"))
        .stdout(predicate::str::contains("[Pantry]\n- Cooking Oil\n"));
}

#[test]
fn share_with_nothing_to_buy_says_so() {
    let dir = TempDir::new().expect("tempdir");
    larder_cmd(dir.path())
        .args([
            "plan",
            "-e",
            "apple",
            "-p",
            "oil, garlic, honey, cinnamon",
            "--no-inventory",
            "--share",
        ])
        .assert()
        .success()
        .stdout("No extra shopping needed! Use your pantry.\n");
}

#[test]
fn configured_purchase_url_is_used_for_links() {
    let dir = TempDir::new().expect("tempdir");
    run_json(
        dir.path(),
        &["config", "set", "shopping.purchase_url", "https://shop.test/?q="],
    );

    let plan = run_json(dir.path(), &["plan", "-e", "milk", "--no-inventory"]);
    let link = plan["shopping"][0]["items"][0]["link"]
        .as_str()
        .expect("link");
    assert!(link.starts_with("https://shop.test/?q="), "{link}");
}

// ---------------------------------------------------------------------------
// Classify / suggest
// ---------------------------------------------------------------------------

#[test]
fn classify_reports_rule_order_and_fallbacks() {
    let dir = TempDir::new().expect("tempdir");
    let rows = run_json(dir.path(), &["classify", "black pepper, eggplant, avocado, widget"]);
    let categories: Vec<&str> = rows
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["category"].as_str().expect("category"))
        .collect();
    assert_eq!(categories, ["veg", "protein", "known", "other"]);
    assert_eq!(rows[3]["storage_hint"], "Check label for storage instructions");
}

#[test]
fn suggest_matches_prefixes_case_insensitively() {
    let dir = TempDir::new().expect("tempdir");
    let names = run_json(dir.path(), &["suggest", "SA"]);
    assert_eq!(names, serde_json::json!(["Salmon"]));

    let all = run_json(dir.path(), &["suggest"]);
    assert_eq!(all.as_array().map(Vec::len), Some(11));
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn config_show_reports_resolved_store_path() {
    let dir = TempDir::new().expect("tempdir");
    let shown = run_json(dir.path(), &["config", "show"]);
    let store = shown["store_path"].as_str().expect("store_path");
    assert!(store.ends_with("inventory.sqlite3"));
    assert_eq!(shown["resolved_output"], "json");
    assert_eq!(shown["user"]["shopping"]["purchase_url"], "https://blinkit.com/s/?q=");
}

#[test]
fn config_set_and_unset_edit_the_user_file() {
    let dir = TempDir::new().expect("tempdir");
    run_json(dir.path(), &["config", "set", "output", "text"]);
    let raw = std::fs::read_to_string(dir.path().join("config.toml")).expect("config written");
    assert!(raw.contains("output = \"text\""));

    larder_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resolved_output=text"));

    run_json(dir.path(), &["config", "unset", "output"]);
    let raw = std::fs::read_to_string(dir.path().join("config.toml")).expect("config kept");
    assert!(!raw.contains("output"));
}

#[test]
fn malformed_config_fails_with_code() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("config.toml"), "output = [").expect("write config");

    larder_cmd(dir.path())
        .args(["list", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1002"));
}
