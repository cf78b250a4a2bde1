//! Integration tests for the `scan` command, driven through `run`.

use camino::Utf8PathBuf;
use planguard_lib::Host;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

/// Test host that captures output to in-memory buffers.
#[derive(Debug, Default)]
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
}

impl TestHost {
    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }

    fn exit(&mut self, _code: i32) {}
}

const CONFIG: &str = r#"
[settings]
exclude_paths = ["legacy/**"]

[[rule]]
id = "large_instance"
name = "Large instance"
severity = "error"
resource_type = "aws_instance"
when = "self.instance_type == 't3.large'"
conditions = ["true"]
message = "Instance is too large"
remediation = "Use a t3.micro"

[[rule]]
id = "public_bucket"
name = "Public bucket"
severity = "warning"
resource_type = "aws_s3_*"
conditions = ["has(self.acl) && self.acl == 'public-read'"]
message = "Bucket is public"

[[exception]]
rules = ["public_bucket"]
resource_names = ["site_*"]
reason = "Static website"
approved_by = "security-team"
"#;

struct Fixture {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Fixture {
    fn new(config: &str, resources: &Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::write(root.join("planguard.toml"), config).unwrap();
        fs::write(root.join("resources.json"), resources.to_string()).unwrap();
        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> String {
        self.root.join(name).to_string()
    }

    fn scan(&self, extra: &[&str]) -> (TestHost, planguard_lib::Result<()>) {
        let config = self.path("planguard.toml");
        let resources = self.path("resources.json");
        let mut args = vec!["planguard", "scan", "--config", &config, "--resources", &resources, "--color", "never"];
        args.extend_from_slice(extra);

        let mut host = TestHost::default();
        let result = planguard_lib::run(&mut host, args);
        (host, result)
    }
}

fn resources() -> Value {
    json!({ "resources": [
        { "type": "aws_instance", "name": "big", "file": "compute.tf", "line": 1, "column": 1,
          "attributes": { "instance_type": "t3.large" } },
        { "type": "aws_instance", "name": "small", "file": "compute.tf", "line": 9, "column": 1,
          "attributes": { "instance_type": "t3.micro" } },
        { "type": "aws_instance", "name": "old", "file": "legacy/compute.tf", "line": 1, "column": 1,
          "attributes": { "instance_type": "t3.large" } },
        { "type": "aws_s3_bucket", "name": "site_assets", "file": "storage.tf", "line": 1, "column": 1,
          "attributes": { "acl": "public-read" } },
        { "type": "aws_s3_bucket", "name": "uploads", "file": "storage.tf", "line": 12, "column": 1,
          "attributes": { "acl": "public-read" } }
    ] })
}

#[test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
fn test_text_report_and_failure_on_error() {
    let fixture = Fixture::new(CONFIG, &resources());
    let (host, result) = fixture.scan(&[]);

    let err = result.unwrap_err();
    assert!(err.to_string().contains("1 violation(s) at or above severity 'error'"));

    let output = host.output_str();
    assert!(output.contains("ERRORS: 1"));
    assert!(output.contains("aws_instance.big"));
    assert!(!output.contains("aws_instance.small"));
    assert!(!output.contains("aws_instance.old"));
    assert!(output.contains("WARNINGS: 1"));
    assert!(output.contains("aws_s3_bucket.uploads"));
    assert!(output.contains("EXCEPTED: 1"));
    assert!(output.contains("Total: 2 violation(s) (1 excepted)"));
}

#[test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
fn test_warnings_pass_by_default() {
    let config = CONFIG.replace("when = \"self.instance_type == 't3.large'\"", "when = \"false\"");
    let fixture = Fixture::new(&config, &resources());

    let (host, result) = fixture.scan(&[]);
    result.unwrap();
    assert!(host.output_str().contains("WARNINGS: 1"));

    let (_, result) = fixture.scan(&["--fail-on", "warning"]);
    assert!(result.is_err());
}

#[test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
fn test_fail_on_warning_setting() {
    let config = CONFIG
        .replace("when = \"self.instance_type == 't3.large'\"", "when = \"false\"")
        .replace("[settings]", "[settings]\nfail_on_warning = true");
    let fixture = Fixture::new(&config, &resources());

    let (_, result) = fixture.scan(&[]);
    assert!(result.unwrap_err().to_string().contains("severity 'warning'"));
}

#[test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
fn test_json_report_to_file() {
    let fixture = Fixture::new(CONFIG, &resources());
    let report = fixture.path("report.json");

    let (host, result) = fixture.scan(&["--format", "json", "--output", &report, "--fail-on", "info"]);
    assert!(result.is_err());
    assert!(host.output_buf.is_empty());

    let json: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["summary"], json!({ "errors": 1, "warnings": 1, "info": 0, "excepted": 1 }));
    assert_eq!(json["violations"][0]["rule_id"], "large_instance");
    assert_eq!(json["excepted"][0]["exception"]["reason"], "Static website");
}

#[test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
fn test_sarif_report() {
    let fixture = Fixture::new(CONFIG, &resources());
    let (host, _) = fixture.scan(&["--format", "sarif"]);

    let sarif: Value = serde_json::from_str(&host.output_str()).unwrap();
    let results = sarif["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["level"], "warning");
}

#[test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
fn test_extra_rules_file() {
    let fixture = Fixture::new("", &resources());
    fs::write(
        fixture.root.join("extra.toml"),
        r#"
[[rule]]
id = "reads_file"
name = "Reads file"
severity = "info"
resource_type = "*"
conditions = ["contains_function_call('file')"]
message = "Uses file()"
"#,
    )
    .unwrap();
    fs::write(
        fixture.root.join("resources.json"),
        json!({ "resources": [
            { "type": "aws_instance", "name": "web", "file": "main.tf", "line": 3, "column": 1,
              "raw_expressions": { "user_data": {
                  "kind": "function_call", "name": "base64encode",
                  "args": [{ "kind": "function_call", "name": "file", "args": [{ "kind": "literal", "value": "init.sh" }] }]
              } } }
        ] })
        .to_string(),
    )
    .unwrap();

    let extra = fixture.path("extra.toml");
    let (host, result) = fixture.scan(&["--rules", &extra]);

    result.unwrap();
    let output = host.output_str();
    assert!(output.contains("INFO: 1"));
    assert!(output.contains("Reads file (reads_file)"));
}

#[test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
fn test_evaluation_error_aborts_scan() {
    let config = CONFIG.replace("conditions = [\"true\"]", "conditions = [\"self.no_such_attribute == 1\"]");
    let fixture = Fixture::new(&config, &resources());

    let (host, result) = fixture.scan(&[]);

    assert!(result.unwrap_err().to_string().contains("rule 'large_instance' failed on aws_instance.big"));
    assert!(host.output_buf.is_empty());
}

#[test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
fn test_no_resources_is_clean() {
    let fixture = Fixture::new(CONFIG, &json!({ "resources": [] }));
    let (host, result) = fixture.scan(&[]);

    result.unwrap();
    assert_eq!(host.output_str(), "No violations found\n");
}
