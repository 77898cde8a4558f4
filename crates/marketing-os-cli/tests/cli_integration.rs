use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use jsonschema::JSONSchema;
use serde_json::Value;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|err| panic!("clock should be >= UNIX_EPOCH: {err}"))
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}-{now}"));
    fs::create_dir_all(&dir)
        .unwrap_or_else(|err| panic!("failed to create temp dir {}: {err}", dir.display()));
    dir
}

fn run_mos_with_env<I, S>(args: I, env: &[(&str, &str)]) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(env!("CARGO_BIN_EXE_mos"));
    command
        .args(args)
        .env_remove("MOS_CONFIG_PATH")
        .env_remove("MOS_LOG")
        .env("MOS_LOAD_DELAY_MS", "5");
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().unwrap_or_else(|err| panic!("failed to execute mos binary: {err}"))
}

fn run_mos<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_mos_with_env(args, &[])
}

fn parse_success(output: &Output) -> Value {
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "mos command failed (status={}):\nstdout:\n{}\nstderr:\n{}",
            output.status, stdout, stderr
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    serde_json::from_str(&stdout)
        .unwrap_or_else(|err| panic!("stdout is not valid JSON: {err}\nstdout:\n{stdout}"))
}

fn run_json<I, S>(args: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    parse_success(&run_mos(args))
}

fn as_u64(value: &Value, key: &str) -> u64 {
    value
        .get(key)
        .and_then(Value::as_u64)
        .unwrap_or_else(|| panic!("missing integer field `{key}` in payload: {value}"))
}

fn as_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing string field `{key}` in payload: {value}"))
}

fn items(value: &Value) -> &Vec<Value> {
    value
        .get("items")
        .and_then(Value::as_array)
        .unwrap_or_else(|| panic!("missing `items` array in payload: {value}"))
}

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|err| panic!("failed to canonicalize repo root: {err}"))
}

fn read_json_file(path: &Path) -> Value {
    let body = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read JSON file {}: {err}", path.display()));
    serde_json::from_str(&body)
        .unwrap_or_else(|err| panic!("failed to parse JSON file {}: {err}", path.display()))
}

fn validate_schema(schema_file: &str, instance: &Value) {
    let schema_path = repo_root().join("contracts/v1/schemas").join(schema_file);
    let schema_json = read_json_file(&schema_path);
    let compiled = JSONSchema::compile(&schema_json)
        .unwrap_or_else(|err| panic!("failed to compile schema {}: {err}", schema_path.display()));

    let errors = compiled
        .validate(instance)
        .err()
        .map(|iter| iter.map(|err| err.to_string()).collect::<Vec<_>>());
    if let Some(errors) = errors {
        panic!("schema validation failed for {}:\n{}", schema_file, errors.join("\n"));
    }
}

#[test]
fn every_contract_schema_compiles() {
    let schema_dir = repo_root().join("contracts/v1/schemas");
    let entries = fs::read_dir(&schema_dir)
        .unwrap_or_else(|err| panic!("failed to list {}: {err}", schema_dir.display()));
    let mut compiled = 0;
    for entry in entries {
        let path = entry.unwrap_or_else(|err| panic!("failed to read schema entry: {err}")).path();
        if path.extension().and_then(OsStr::to_str) != Some("json") {
            continue;
        }
        let schema_json = read_json_file(&path);
        if let Err(err) = JSONSchema::compile(&schema_json) {
            panic!("failed to compile schema {}: {err}", path.display());
        }
        compiled += 1;
    }
    assert_eq!(compiled, 7);
}

#[test]
fn routes_lists_every_view_with_contract_version() {
    let routes = run_json(["routes"]);
    validate_schema("cli.routes.v1.json", &routes);
    assert_eq!(as_str(&routes, "contract_version"), "cli.v1");
    assert_eq!(as_str(&routes, "current"), "users");

    let entries = routes
        .get("routes")
        .and_then(Value::as_array)
        .unwrap_or_else(|| panic!("routes should be an array: {routes}"));
    assert!(entries.iter().any(|entry| {
        entry.get("path").and_then(Value::as_str) == Some("/signalscope/drift")
            && entry.get("view").and_then(Value::as_str) == Some("drift-scanner")
    }));
}

#[test]
fn view_applies_filters_sort_and_paging() {
    let viewers = run_json(["view", "users", "--filter", "role=Viewer"]);
    validate_schema("cli.view.v1.json", &viewers);
    assert_eq!(as_u64(&viewers, "total_items"), 2);
    let names = items(&viewers).iter().map(|item| as_str(item, "name")).collect::<Vec<_>>();
    assert_eq!(names, vec!["Jordan Blake", "Tomás Ortega"]);

    let sms = run_json(["view", "triggers", "--filter", "channel=SMS"]);
    assert_eq!(as_u64(&sms, "total_items"), 1);
    assert_eq!(as_str(&items(&sms)[0], "channel"), "SMS");

    let everyone = run_json(["view", "users", "--filter", "role=all"]);
    assert_eq!(as_u64(&everyone, "total_items"), 6);

    let drifting = run_json(["view", "drift-scanner", "--range", "drift_score=40..80"]);
    validate_schema("cli.view.v1.json", &drifting);
    let ids = items(&drifting).iter().map(|item| as_u64(item, "id")).collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 2, 6]);

    let paged = run_json(["view", "journeys", "--sort", "audience_size", "--desc", "--page", "9"]);
    assert_eq!(as_u64(&paged, "page"), 1);
    assert_eq!(as_u64(&items(&paged)[0], "id"), 1);
}

#[test]
fn view_fingerprint_is_stable_across_runs() {
    let first = run_json(["view", "triggers", "--search", "email"]);
    let second = run_json(["view", "triggers", "--search", "EMAIL"]);
    assert_eq!(as_str(&first, "fingerprint"), as_str(&second, "fingerprint"));
    assert_eq!(as_u64(&first, "total_items"), 2);
}

#[test]
fn small_page_size_from_config_file_splits_results() {
    let sandbox = unique_temp_dir("mos-cli-config");
    let config_path = sandbox.join("console.yaml");
    fs::write(&config_path, "page_size: 2\n")
        .unwrap_or_else(|err| panic!("failed to write config {}: {err}", config_path.display()));
    let config_arg = config_path.to_string_lossy().to_string();

    let page = run_json(["--config", config_arg.as_str(), "view", "audit-log", "--page", "3"]);
    assert_eq!(as_u64(&page, "page_size"), 2);
    assert_eq!(as_u64(&page, "total_pages"), 3);
    let ids = items(&page).iter().map(|item| as_u64(item, "id")).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 1]);

    let _ = fs::remove_dir_all(&sandbox);
}

#[test]
fn unknown_view_and_invalid_config_exit_non_zero() {
    let output = run_mos(["view", "campaigns"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown view"));

    let output = run_mos(["view", "users", "--filter", "email=dana@signal.example"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be filtered by `email`"));

    let output = run_mos_with_env(["routes"], &[("MOS_SUCCESS_PROBABILITY", "2")]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("success_probability"));
}

#[test]
fn permissions_set_cascades_and_show_is_consistent() {
    let revoked = run_json([
        "permissions",
        "set",
        "--role",
        "Editor",
        "--module",
        "Signal Studio",
        "--permission",
        "view",
        "--granted",
        "false",
    ]);
    validate_schema("cli.permissions-set.v1.json", &revoked);
    assert_eq!(
        revoked.get("permissions"),
        Some(&serde_json::json!({ "View": false, "Edit": false, "Admin": false }))
    );

    let granted = run_json([
        "permissions",
        "set",
        "--role",
        "Viewer",
        "--module",
        "SignalCore",
        "--permission",
        "admin",
        "--granted",
        "true",
    ]);
    assert_eq!(
        granted.get("permissions"),
        Some(&serde_json::json!({ "View": true, "Edit": true, "Admin": true }))
    );

    let shown = run_json(["permissions", "show"]);
    validate_schema("cli.permissions-show.v1.json", &shown);
    let roles = shown
        .get("roles")
        .and_then(Value::as_array)
        .unwrap_or_else(|| panic!("roles should be an array: {shown}"));
    assert_eq!(roles.len(), 4);
    for role in roles {
        for module in role.get("modules").and_then(Value::as_array).into_iter().flatten() {
            let row = &module["permissions"];
            let view = row["View"].as_bool().unwrap_or(false);
            let edit = row["Edit"].as_bool().unwrap_or(false);
            let admin = row["Admin"].as_bool().unwrap_or(false);
            assert!((!admin || edit) && (!edit || view), "inconsistent row: {module}");
        }
    }

    let output = run_mos(["permissions", "show", "--role", "Ghost"]);
    assert!(!output.status.success());
}

#[test]
fn trigger_add_assigns_next_id_and_rejects_duplicates() {
    let added = run_json(["triggers", "add", "--name", "Webinar Registered", "--event", "webinar.registered"]);
    validate_schema("cli.trigger-add.v1.json", &added);
    assert_eq!(as_u64(&added, "id"), 6);
    assert_eq!(as_u64(&added, "total"), 6);

    let sms = run_json(["triggers", "add", "--name", "SMS Opt-out", "--event", "sms.opt_out", "--channel", "sms"]);
    validate_schema("cli.trigger-add.v1.json", &sms);
    assert_eq!(sms["trigger"]["channel"], "SMS");

    let duplicate = run_mos(["triggers", "add", "--name", "email opened", "--event", "email.opened"]);
    assert!(!duplicate.status.success());
    let stderr = String::from_utf8_lossy(&duplicate.stderr);
    assert!(stderr.contains("already exists"), "stderr: {stderr}");
    assert!(duplicate.stdout.is_empty());

    let blank = run_mos(["triggers", "add", "--name", "   ", "--event", "x.y"]);
    assert!(!blank.status.success());
    assert!(String::from_utf8_lossy(&blank.stderr).contains("name is required"));
}

#[test]
fn webhook_test_reports_delivery_or_failure() {
    let delivered = parse_success(&run_mos_with_env(
        ["webhooks", "test", "--id", "1"],
        &[("MOS_SUCCESS_PROBABILITY", "1")],
    ));
    validate_schema("cli.webhook-test.v1.json", &delivered);
    assert_eq!(as_str(&delivered, "status"), "delivered");

    let failed = parse_success(&run_mos_with_env(
        ["webhooks", "test", "--id", "2"],
        &[("MOS_SUCCESS_PROBABILITY", "0")],
    ));
    validate_schema("cli.webhook-test.v1.json", &failed);
    assert_eq!(as_str(&failed, "status"), "failed");

    let missing = run_mos(["webhooks", "test", "--id", "404"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("record not found"));
}

#[test]
fn upload_respects_size_limit() {
    let accepted = run_json(["upload", "--name", "brief.pdf", "--size", "2048"]);
    assert_eq!(as_str(&accepted, "state"), "ready");

    let rejected = run_mos_with_env(
        ["upload", "--name", "brief.pdf", "--size", "2048"],
        &[("MOS_MAX_UPLOAD_BYTES", "1024")],
    );
    assert!(!rejected.status.success());
    assert!(String::from_utf8_lossy(&rejected.stderr).contains("limited to 1024 bytes"));
}

#[test]
fn atomize_splits_and_recombines() {
    let atomized = run_json([
        "atomize",
        "--text",
        "Big news! Our spring sale starts today. Ready to save?",
        "--select",
        "0,2",
    ]);
    validate_schema("cli.atomize.v1.json", &atomized);
    let atoms = atomized
        .get("atoms")
        .and_then(Value::as_array)
        .unwrap_or_else(|| panic!("atoms should be an array: {atomized}"));
    assert_eq!(atoms.len(), 3);
    assert_eq!(as_str(&atomized, "recombined"), "Big news! Ready to save?");
}
