use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const FLASK_APP: &str = r#"
from flask import Flask

app = Flask(__name__)

@app.route('/users')
def get_users():
    return "Users"

@app.route('/items/<int:item_id>')
def get_item(item_id):
    return f"Item {item_id}"
"#;

const SCHEMA: &str = r#"
openapi: 3.0.0
info:
  title: Example API
  version: 1.0.0
paths:
  /users:
    get:
      summary: Get all users
  /items/{item_id}:
    get:
      summary: Get a specific item
      parameters:
        - name: item_id
          in: path
          required: true
"#;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_codeintel-api-endpoint-validator"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to run validator binary")
}

fn project(app: &str, schema_name: &str, schema: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let code = temp_dir.path().join("code");
    fs::create_dir(&code).unwrap();
    fs::write(code.join("app.py"), app).unwrap();
    fs::write(temp_dir.path().join(schema_name), schema).unwrap();
    temp_dir
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_help_exits_zero() {
    let temp_dir = TempDir::new().unwrap();
    let output = run(temp_dir.path(), &["-h"]);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("CODE_PATH"));
    assert!(text.contains("SCHEMA_PATH"));
    assert!(text.contains("--verbose"));
}

#[test]
fn test_missing_arguments_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = run(temp_dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_documented_endpoints_pass() {
    let temp_dir = project(FLASK_APP, "openapi.yaml", SCHEMA);
    let output = run(temp_dir.path(), &["--no-security", "code", "openapi.yaml"]);

    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
    assert!(stdout(&output).contains("API Endpoint Validation Passed."));
}

#[test]
fn test_verbose_flag_logs_to_stderr() {
    let temp_dir = project(FLASK_APP, "openapi.yaml", SCHEMA);
    let output = run(temp_dir.path(), &["-v", "--no-security", "code", "openapi.yaml"]);

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Verbose logging enabled."));
}

#[test]
fn test_undocumented_endpoint_fails() {
    let app = format!(
        "{FLASK_APP}\n@app.route('/orders', methods=['POST'])\ndef create_order():\n    pass\n"
    );
    let temp_dir = project(&app, "openapi.yaml", SCHEMA);
    let output = run(temp_dir.path(), &["--no-security", "code", "openapi.yaml"]);

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("API Endpoint Validation Failed:"));
    assert!(text.contains("Endpoint '/orders' (defined in"));
    assert!(text.contains("not found in schema."));
}

#[test]
fn test_unsupported_schema_format_is_operational_error() {
    let temp_dir = project(FLASK_APP, "schema.txt", SCHEMA);
    let output = run(temp_dir.path(), &["code", "schema.txt"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Only YAML (.yaml, .yml) and JSON (.json) are supported."));
}

#[test]
fn test_missing_schema_and_code_path() {
    let temp_dir = project(FLASK_APP, "openapi.yaml", SCHEMA);

    let output = run(temp_dir.path(), &["code", "missing.yaml"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(temp_dir.path(), &["nowhere", "openapi.yaml"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_json_output_with_fail_on_warning() {
    let temp_dir = project(FLASK_APP, "openapi.yaml", SCHEMA);
    let output = run(
        temp_dir.path(),
        &["--json", "--fail-on", "warning", "code", "openapi.yaml"],
    );

    // Operations without security requirements are reported as findings
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["meta"]["entity_type"], "validation_report");
    assert_eq!(value["data"]["endpoints_found"], 2);
    assert_eq!(value["data"]["schema_operations"], 2);

    let findings = value["data"]["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 2);
    assert!(findings.iter().all(|f| f["rule"] == "missing-authentication"));
    assert!(findings.iter().all(|f| f["severity"] == "info"));
    assert_eq!(value["status"], "success");
    assert_eq!(output.status.code(), Some(0));

    let output = run(
        temp_dir.path(),
        &["--json", "--fail-on", "info", "code", "openapi.yaml"],
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "failed");
    assert_eq!(value["exit_code"], 1);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_json_error_envelope() {
    let temp_dir = project(FLASK_APP, "schema.txt", SCHEMA);
    let output = run(temp_dir.path(), &["--json", "code", "schema.txt"]);

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["type"], "error");
    assert_eq!(value["code"], "SCHEMA_ERROR");
}

#[test]
fn test_json_schema_file() {
    let schema = r#"{
        "swagger": "2.0",
        "paths": {
            "/users": {"get": {}},
            "/items/{item_id}": {
                "get": {"parameters": [{"name": "item_id", "in": "path", "required": true}]}
            }
        }
    }"#;
    let temp_dir = project(FLASK_APP, "swagger.json", schema);
    let output = run(temp_dir.path(), &["--no-security", "code", "swagger.json"]);
    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
}

#[test]
fn test_endpoints_command() {
    let temp_dir = project(FLASK_APP, "openapi.yaml", SCHEMA);
    let output = run(temp_dir.path(), &["endpoints", "code"]);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("/users"));
    assert!(text.contains("/items/{item_id}"));
    assert!(text.contains("Found 2 endpoints in 1 file"));
}

#[test]
fn test_init_command() {
    let temp_dir = TempDir::new().unwrap();
    let output = run(temp_dir.path(), &["init"]);
    assert!(output.status.success());

    let config_path = temp_dir.path().join(".codeintel/settings.toml");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[scan]"));
    assert!(content.contains("[validation]"));
    assert!(content.contains("[languages.python]"));
    assert!(temp_dir.path().join(".codeintelignore").exists());

    // a second init without --force refuses to overwrite
    let output = run(temp_dir.path(), &["init"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(temp_dir.path(), &["init", "--force"]);
    assert!(output.status.success());
}

#[test]
fn test_config_command_reads_workspace_settings() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join(".codeintel");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("settings.toml"),
        "version = 2\n[scan]\nparallel_threads = 7\n[validation]\nfail_on = \"warning\"\n",
    )
    .unwrap();

    let output = run(temp_dir.path(), &["config"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("version = 2"));
    assert!(text.contains("parallel_threads = 7"));
    assert!(text.contains("fail_on = \"warning\""));
}

#[test]
fn test_invalid_config_exits_with_error() {
    let temp_dir = project(FLASK_APP, "openapi.yaml", SCHEMA);
    let config = temp_dir.path().join("custom.toml");
    fs::write(&config, "[validation]\nfail_on = \"catastrophic\"\n").unwrap();

    let output = run(
        temp_dir.path(),
        &["-c", config.to_str().unwrap(), "code", "openapi.yaml"],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_global_options_before_subcommand() {
    let temp_dir = project(FLASK_APP, "openapi.yaml", SCHEMA);

    let output = run(temp_dir.path(), &["--json", "endpoints", "code"]);
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["meta"]["entity_type"], "endpoints");
    assert_eq!(value["meta"]["count"], 2);

    let output = run(temp_dir.path(), &["-v", "init"]);
    assert!(output.status.success());
    assert!(temp_dir.path().join(".codeintel/settings.toml").exists());

    let config = temp_dir.path().join("custom.toml");
    fs::write(&config, "[scan]\nparallel_threads = 5\n").unwrap();
    let output = run(temp_dir.path(), &["-c", config.to_str().unwrap(), "config"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("parallel_threads = 5"));
}
