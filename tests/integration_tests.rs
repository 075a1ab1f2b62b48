//! Integration tests for the dcalc CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DRILLS_CSV: &str = "\
Implant Brand,Implant System,Implant Diameter,Drill Kit Name,Drill Kit Item Number,Drill Kit Link to Purchase,Drill 1 Name,Drill 1 Link to Purchase,Drill 2 Name
Neodent,GM,3.5,GM Surgical Kit,110.250,http://kit,Pilot,http://pilot,No Drill Sequence
Neodent,GM,4.3,GM Surgical Kit,110.250,-,Pilot,-,
AlphaBrand Y1,A1,4.0,Alpha Kit,A-1,,Lance,,
Zimvie X100,TSX,4.1,TSX Kit,Z-9,http://z,Starter,http://s,
";

const DRIVERS_CSV: &str = "\
Implant Brand,Implant System,Item Name,Item Number,Link to Purchase
Neodent,GM,GM Torque Driver,105.1,http://driver
Neodent,GM,GM Torque Driver Long,105.2,http://driver-long
Zimvie X100,TSX,TSX Driver,Z-D,-
";

const SCANBODIES_CSV: &str = "\
Implant Brand,Implant System,Implant Platform,Item Name,Scanbody Item Number,Manufacturer,Rx
Neodent,GM,NP,GM Scanbody,SB-100,Elos,Ask lab
";

/// Home directory with no user config, shared by every test command
fn isolated_home() -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("dcalc-home")
}

/// Helper to get a dcalc command isolated from the caller's environment
fn dcalc() -> Command {
    let home = isolated_home();
    let mut cmd = Command::cargo_bin("dcalc").unwrap();
    cmd.env_remove("DCALC_STORE")
        .env_remove("DCALC_BATCH_SIZE")
        .env_remove("DCALC_LOG")
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("HOME", &home);
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    dcalc().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to import CSV text into a calculator type
fn import(tmp: &TempDir, calculator_type: &str, csv: &str) {
    let path = tmp.path().join(format!("{}.csv", calculator_type));
    fs::write(&path, csv).unwrap();
    dcalc()
        .current_dir(tmp.path())
        .args(["import", calculator_type])
        .arg(&path)
        .assert()
        .success();
}

/// Helper to create a project with drills, drivers and scanbodies loaded
fn setup_catalog() -> TempDir {
    let tmp = setup_test_project();
    import(&tmp, "DrillKitAndSequence", DRILLS_CSV);
    import(&tmp, "MasterImplantDriver", DRIVERS_CSV);
    import(&tmp, "Scanbodies", SCANBODIES_CSV);
    tmp
}

/// Run a command that must succeed and parse its stdout as JSON
fn json_output(tmp: &TempDir, args: &[&str]) -> Value {
    let output = dcalc()
        .current_dir(tmp.path())
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    dcalc()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized dcalc project"));

    assert!(tmp.path().join(".dcalc/config.yaml").exists());
    assert!(tmp.path().join(".dcalc/calculators.yaml").exists());
    assert!(tmp.path().join(".dcalc/store.db").exists());
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_test_project();

    dcalc()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();

    dcalc()
        .current_dir(tmp.path())
        .args(["calc", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a dcalc project"));
}

#[test]
fn test_project_flag_selects_project() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();

    dcalc()
        .current_dir(elsewhere.path())
        .arg("--project")
        .arg(tmp.path())
        .args(["calc", "list", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DrillKitAndSequence"));
}

// ============================================================================
// Calculator types and import
// ============================================================================

#[test]
fn test_calc_list_includes_every_builtin_type() {
    let tmp = setup_test_project();

    let list = json_output(&tmp, &["calc", "list"]);
    let types: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"DrillKitAndSequence"));
    assert!(types.contains(&"Crown Materials"));

    let crowns = list
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["type"] == "Crown Materials")
        .unwrap();
    assert_eq!(crowns["collection"], "crown_materials");
    assert_eq!(crowns["records"], 0);
}

#[test]
fn test_import_reports_rows_and_batches() {
    let tmp = setup_test_project();
    let path = tmp.path().join("drills.csv");
    fs::write(&path, DRILLS_CSV).unwrap();

    dcalc()
        .current_dir(tmp.path())
        .args(["import", "DrillKitAndSequence"])
        .arg(&path)
        .args(["--batch-size", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 4 row(s)"));

    let report = json_output(
        &tmp,
        &["import", "DrillKitAndSequence", path.to_str().unwrap(), "--batch-size", "3"],
    );
    assert_eq!(report["rowsInserted"], 4);
    assert_eq!(report["replaced"], 4);
    assert_eq!(report["batches"], 2);
}

#[test]
fn test_import_from_stdin() {
    let tmp = setup_test_project();

    dcalc()
        .current_dir(tmp.path())
        .args(["import", "MasterImplantDriver", "-"])
        .write_stdin(DRIVERS_CSV)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 row(s)"));
}

#[test]
fn test_import_unknown_type_fails() {
    let tmp = setup_test_project();
    let path = tmp.path().join("x.csv");
    fs::write(&path, "a,b\n1,2\n").unwrap();

    dcalc()
        .current_dir(tmp.path())
        .args(["import", "Widgets"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Widgets data does not exist"));
}

#[test]
fn test_batch_size_from_environment() {
    let tmp = setup_test_project();
    let path = tmp.path().join("drills.csv");
    fs::write(&path, DRILLS_CSV).unwrap();

    let output = dcalc()
        .current_dir(tmp.path())
        .env("DCALC_BATCH_SIZE", "1")
        .args(["import", "DrillKitAndSequence"])
        .arg(&path)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["batches"], 4);
}

// ============================================================================
// Quiz resolution
// ============================================================================

#[test]
fn test_options_orders_prioritized_brands_first() {
    let tmp = setup_catalog();

    let brands = json_output(
        &tmp,
        &["options", "DrillKitAndSequence", "-F", "Implant Brand"],
    );
    assert_eq!(brands, json!(["Zimvie X100", "Neodent", "AlphaBrand Y1"]));
}

#[test]
fn test_options_tuples_and_tsv() {
    let tmp = setup_catalog();

    let tuples = json_output(
        &tmp,
        &[
            "options",
            "DrillKitAndSequence",
            "-a",
            "Implant Brand=Neodent",
            "-F",
            "Implant System",
            "-F",
            "Drill Kit Name",
        ],
    );
    assert_eq!(
        tuples,
        json!([{"Implant System": "GM", "Drill Kit Name": "GM Surgical Kit"}])
    );

    dcalc()
        .current_dir(tmp.path())
        .args([
            "options",
            "DrillKitAndSequence",
            "-a",
            "Implant Brand=Neodent",
            "-F",
            "Implant Diameter",
            "--format",
            "tsv",
        ])
        .assert()
        .success()
        .stdout("3.5\n4.3\n");
}

#[test]
fn test_answers_are_case_sensitive() {
    let tmp = setup_catalog();

    let values = json_output(
        &tmp,
        &[
            "options",
            "DrillKitAndSequence",
            "-a",
            "Implant Brand=neodent",
            "-F",
            "Implant System",
        ],
    );
    assert_eq!(values, json!([]));
}

#[test]
fn test_unknown_answer_field_is_rejected() {
    let tmp = setup_catalog();

    dcalc()
        .current_dir(tmp.path())
        .args(["options", "DrillKitAndSequence", "-a", "Colour=Blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Colour"));
}

#[test]
fn test_user_config_comes_from_config_home() {
    let tmp = setup_catalog();
    let config_home = tmp.path().join("xdg");
    fs::create_dir_all(config_home.join("dcalc")).unwrap();
    fs::write(config_home.join("dcalc/config.yaml"), "lenient_answers: true\n").unwrap();

    dcalc()
        .current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", &config_home)
        .args(["options", "DrillKitAndSequence", "-a", "Drill Kit Name=TSX Kit"])
        .args(["-F", "Implant Brand", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Zimvie X100"));

    assert!(!isolated_home().join(".config/dcalc/config.yaml").exists());
    dcalc()
        .current_dir(tmp.path())
        .args(["options", "DrillKitAndSequence", "-a", "Drill Kit Name=TSX Kit"])
        .assert()
        .failure();
}

#[test]
fn test_lenient_answers_from_project_config() {
    let tmp = setup_catalog();
    fs::write(tmp.path().join(".dcalc/config.yaml"), "lenient_answers: true\n").unwrap();

    let values = json_output(
        &tmp,
        &[
            "options",
            "DrillKitAndSequence",
            "-a",
            "Drill Kit Name=TSX Kit",
            "-F",
            "Implant Brand",
        ],
    );
    assert_eq!(values, json!(["Zimvie X100"]));
}

#[test]
fn test_next_lists_only_unanswered_fields() {
    let tmp = setup_catalog();

    let next = json_output(
        &tmp,
        &["next", "DrillKitAndSequence", "-a", "Implant Brand=Neodent"],
    );
    let fields: Vec<&str> = next
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["Implant System", "Implant Diameter", "Implant Length", "Bone Density"]
    );
    assert_eq!(next[0]["values"], json!(["GM"]));
    assert_eq!(next[2]["values"], json!([]));
}

#[test]
fn test_resolve_cross_references_driver() {
    let tmp = setup_catalog();

    let response = json_output(
        &tmp,
        &[
            "resolve",
            "DrillKitAndSequence",
            "-a",
            "Implant Brand=Neodent",
            "-a",
            "Implant System=GM",
            "-a",
            "Implant Diameter=3.5",
            "-F",
            "Drill Kit Name",
            "-o",
            "MasterImplantDriver",
        ],
    );

    assert_eq!(response["result"], json!(["GM Surgical Kit"]));
    let group = &response["quizResponse"][0];
    assert_eq!(group["label"], "Implant Driver");
    assert_eq!(group["info"][0]["itemName"], "GM Torque Driver");
    assert_eq!(group["info"][0]["itemNumber"], "105.1");
    assert_eq!(group["info"][0]["quantity"], 1);
}

#[test]
fn test_resolve_formats_own_drill_sequence() {
    let tmp = setup_catalog();

    let response = json_output(
        &tmp,
        &[
            "resolve",
            "DrillKitAndSequence",
            "-a",
            "Implant Brand=Neodent",
            "-a",
            "Implant Diameter=3.5",
            "-o",
            "DrillKitAndSequence",
        ],
    );

    let groups = response["quizResponse"].as_array().unwrap();
    assert_eq!(groups[0]["label"], "Implant Drill Kit");
    assert_eq!(groups[1]["label"], "Drill Sequence");
    let drills = groups[1]["info"].as_array().unwrap();
    assert_eq!(drills.len(), 1);
    assert_eq!(drills[0]["itemName"], "Pilot");
    assert_eq!(drills[0]["quantity"], 1);
}

#[test]
fn test_resolve_placeholder_link_has_no_quantity() {
    let tmp = setup_catalog();

    let response = json_output(
        &tmp,
        &[
            "resolve",
            "DrillKitAndSequence",
            "-a",
            "Implant Brand=Zimvie X100",
            "-o",
            "MasterImplantDriver",
        ],
    );
    let item = &response["quizResponse"][0]["info"][0];
    assert_eq!(item["link"], "-");
    assert_eq!(item["quantity"], Value::Null);
}

#[test]
fn test_resolve_without_output_has_no_quiz_response() {
    let tmp = setup_catalog();

    let response = json_output(&tmp, &["resolve", "MasterImplantDriver"]);
    assert!(response.get("quizResponse").is_none());
    assert_eq!(response["result"].as_array().unwrap().len(), 3);
}

#[test]
fn test_resolve_request_from_stdin() {
    let tmp = setup_catalog();
    let request = json!({
        "calculatorType": "Scanbodies",
        "quiz": {"Implant Brand": "Neodent"},
        "fields": ["Implant Platform"],
        "output": "Scanbodies"
    });

    let output = dcalc()
        .current_dir(tmp.path())
        .args(["resolve", "--request", "-"])
        .write_stdin(request.to_string())
        .output()
        .unwrap();
    assert!(output.status.success());

    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["result"], json!(["NP"]));
    let item = &response["quizResponse"][0]["info"][0];
    assert_eq!(item["itemName"], "GM Scanbody");
    assert_eq!(item["Manufacturer"], "Elos");
    assert_eq!(item["RX"], "Ask lab");
}

#[test]
fn test_resolve_unknown_output_type_fails() {
    let tmp = setup_catalog();

    dcalc()
        .current_dir(tmp.path())
        .args(["resolve", "DrillKitAndSequence", "-o", "Widgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Widgets data does not exist"));
}

#[test]
fn test_lookup_exactly_one() {
    let tmp = setup_catalog();

    let record = json_output(
        &tmp,
        &["lookup", "MasterImplantDriver", "-a", "Implant System=TSX"],
    );
    assert_eq!(record["Item Name"], "TSX Driver");

    dcalc()
        .current_dir(tmp.path())
        .args(["lookup", "MasterImplantDriver", "-a", "Implant System=GM"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MasterImplantDriver"));

    dcalc()
        .current_dir(tmp.path())
        .args(["lookup", "MasterImplantDriver", "-a", "Implant System=CM"])
        .assert()
        .failure();
}

// ============================================================================
// Search and store
// ============================================================================

#[test]
fn test_search_matches_searchable_fields() {
    let tmp = setup_catalog();

    dcalc()
        .current_dir(tmp.path())
        .args(["search", "sb-1"])
        .assert()
        .success()
        .stdout("Scanbodies\n");

    // Drill kits are not searchable even though they mention Neodent
    let matches = json_output(&tmp, &["search", "NEODENT"]);
    assert_eq!(matches, json!(["Scanbodies"]));
}

#[test]
fn test_search_without_match_is_empty() {
    let tmp = setup_catalog();

    let matches = json_output(&tmp, &["search", "Straumann"]);
    assert_eq!(matches, json!([]));

    dcalc()
        .current_dir(tmp.path())
        .args(["search", "100%"])
        .arg("--count")
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_store_status_and_clear() {
    let tmp = setup_catalog();

    let status = json_output(&tmp, &["store", "status"]);
    assert_eq!(status["totalRecords"], 8);

    dcalc()
        .current_dir(tmp.path())
        .args(["store", "clear", "MasterImplantDriver"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 3 record(s)"));

    let status = json_output(&tmp, &["store", "status"]);
    assert_eq!(status["totalRecords"], 5);
}

#[test]
fn test_store_path_from_environment() {
    let tmp = setup_test_project();
    let other = tmp.path().join("elsewhere.db");
    let path = tmp.path().join("drivers.csv");
    fs::write(&path, DRIVERS_CSV).unwrap();

    dcalc()
        .current_dir(tmp.path())
        .env("DCALC_STORE", &other)
        .args(["import", "MasterImplantDriver"])
        .arg(&path)
        .assert()
        .success();

    assert!(other.exists());
    let status = json_output(&tmp, &["store", "status"]);
    assert_eq!(status["totalRecords"], 0);
}
