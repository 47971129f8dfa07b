use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_snapshot(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("records.json");
    let records = json!({
        "schema_version": 1,
        "foundations": [
            {
                "ein": 111111111,
                "organization_name": "Harbor Light Foundation",
                "tax_period_end": "2022-12",
                "city": "Boston",
                "state": "MA"
            },
            {
                "ein": "22-2222222",
                "organization_name": "Prairie Fund",
                "tax_period_end": "2022-12",
                "city": "Topeka",
                "state": "KS"
            }
        ],
        "grants": [
            {"foundation_ein": 111111111, "recipient_name": "Harbor School", "recipient_city": "Boston", "recipient_state": "MA", "grant_amount": 5000, "grant_purpose": "Education"},
            {"foundation_ein": 111111111, "recipient_name": "Coast Clinic", "recipient_city": "Portland", "recipient_state": "ME", "grant_amount": "1,500"},
            {"foundation_ein": 222222222, "recipient_name": "Wheat Library", "recipient_city": "Wichita", "recipient_state": "KS", "grant_amount": 800}
        ],
        "officers": [
            {"ein": 111111111, "name": "Ada Harbor", "title": "President", "tax_period_end": "2022-12"}
        ]
    });
    fs::write(&path, serde_json::to_vec_pretty(&records).unwrap()).unwrap();
    path
}

#[allow(deprecated)]
fn grantscope(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("grantscope").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("GRANTSCOPE_CONFIG")
        .env_remove("GRANTSCOPE_DATA");
    cmd
}

fn run(workdir: &Path, args: &[&str]) -> (bool, Value) {
    let output = grantscope(workdir).args(args).output().expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).unwrap_or_else(|_| {
        panic!(
            "stdout is not JSON: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    });
    (output.status.success(), body)
}

#[test]
fn command_json_searches_grants() {
    let temp = tempdir().unwrap();
    let data = write_snapshot(temp.path());
    let request = r#"{"action":"search_grants","payload":{"state":"ma"}}"#;

    let (ok, body) = run(
        temp.path(),
        &["--data", data.to_str().unwrap(), "command", "--json", request],
    );

    assert!(ok, "{body}");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["results"][0]["foundation_name"], "Harbor Light Foundation");
    assert_eq!(body["data"]["results"][0]["grant_amount"], 5000);
    assert_eq!(body["meta"]["provider"], "file");
}

#[test]
fn search_subcommand_maps_flags_to_payload() {
    let temp = tempdir().unwrap();
    let data = write_snapshot(temp.path());

    let (ok, body) = run(
        temp.path(),
        &[
            "--data",
            data.to_str().unwrap(),
            "search",
            "--min-amount",
            "1000",
            "--per-page",
            "1",
        ],
    );

    assert!(ok, "{body}");
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["per_page"], 1);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["results"][0]["grant_amount"], 5000);
}

#[test]
fn stats_subcommand_reports_dataset_totals() {
    let temp = tempdir().unwrap();
    let data = write_snapshot(temp.path());

    let (ok, body) = run(temp.path(), &["--data", data.to_str().unwrap(), "stats"]);

    assert!(ok, "{body}");
    assert_eq!(body["data"]["total_grants"], 3);
    assert_eq!(body["data"]["total_amount"], 7300);
    assert_eq!(body["data"]["total_foundations"], 2);
}

#[test]
fn unknown_foundation_exits_nonzero_with_not_found() {
    let temp = tempdir().unwrap();
    let data = write_snapshot(temp.path());

    let (ok, body) = run(
        temp.path(),
        &["--data", data.to_str().unwrap(), "foundation", "99-0000001"],
    );

    assert!(!ok);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "not_found");
}

#[test]
fn foundation_detail_accepts_dashed_ein() {
    let temp = tempdir().unwrap();
    let data = write_snapshot(temp.path());

    let (ok, body) = run(
        temp.path(),
        &["--data", data.to_str().unwrap(), "foundation", "22-2222222"],
    );

    assert!(ok, "{body}");
    assert_eq!(body["data"]["grant_count"], 1);
    assert_eq!(body["data"]["total_amount"], 800);
}

#[test]
fn names_and_officers_subcommands() {
    let temp = tempdir().unwrap();
    let data = write_snapshot(temp.path());
    let data = data.to_str().unwrap();

    let (ok, body) = run(temp.path(), &["--data", data, "names", "prairie"]);
    assert!(ok, "{body}");
    assert_eq!(body["data"], json!(["Prairie Fund"]));

    let (ok, body) = run(temp.path(), &["--data", data, "officers", "111111111"]);
    assert!(ok, "{body}");
    assert_eq!(body["data"][0]["name"], "Ada Harbor");
}

#[test]
fn config_file_in_working_directory_supplies_data_path() {
    let temp = tempdir().unwrap();
    write_snapshot(temp.path());
    fs::write(
        temp.path().join("grantscope.toml"),
        "data_path = \"records.json\"\nmax_per_page = 1\n",
    )
    .unwrap();

    let (ok, body) = run(temp.path(), &["search", "--per-page", "50"]);

    assert!(ok, "{body}");
    assert_eq!(body["data"]["per_page"], 1);
    assert_eq!(body["data"]["total"], 3);
}

#[test]
fn missing_snapshot_fails_with_context() {
    let temp = tempdir().unwrap();

    grantscope(temp.path())
        .args(["--data", "nope.json", "stats"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to open record snapshot"));
}

#[test]
fn inverted_amount_bounds_are_rejected() {
    let temp = tempdir().unwrap();
    let data = write_snapshot(temp.path());

    let (ok, body) = run(
        temp.path(),
        &[
            "--data",
            data.to_str().unwrap(),
            "search",
            "--min-amount",
            "900",
            "--max-amount",
            "100",
        ],
    );

    assert!(!ok);
    assert_eq!(body["error"]["code"], "invalid_request");
}
