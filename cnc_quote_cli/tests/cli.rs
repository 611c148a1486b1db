use assert_cmd::Command;
use cnc_quote_core::quote::Quote;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config and data directories
fn cncquote(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cncquote").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn quote_json(home: &TempDir, inputs: &[&str], seed: &str) -> Quote {
    let output = cncquote(home)
        .arg("quote")
        .args(inputs)
        .args(["--format", "json", "--seed", seed, "--time-unit", "0", "--no-progress"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_quote_synthetic_file_as_json() {
    let home = TempDir::new().unwrap();
    let quote = quote_json(&home, &["bracket.step:2M"], "7");

    assert!(quote.id.starts_with("QT-"));
    assert_eq!(quote.analysis.files.len(), 1);

    let record = &quote.analysis.files[0];
    assert_eq!(record.name, "bracket.step");
    assert_eq!(record.size, 2 * 1024 * 1024);
    assert_eq!(record.materials.len(), 3);
    assert_eq!(
        record.cost.pricing.market_price,
        2 * record.cost.pricing.total
    );
    assert_eq!(quote.analysis.summary.total_cost, record.cost.pricing.total);
}

#[test]
fn test_same_seed_same_analysis() {
    let home = TempDir::new().unwrap();
    let inputs = ["a.step:1M", "b.stl:3M"];

    let first = quote_json(&home, &inputs, "11");
    let second = quote_json(&home, &inputs, "11");

    assert_eq!(first.analysis, second.analysis);
    assert_eq!(first.competitor_comparison, second.competitor_comparison);
}

#[test]
fn test_quote_csv_has_row_per_file() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["quote", "a.step:1M", "b.igs:512K", "--format", "csv"])
        .args(["--seed", "3", "--time-unit", "0", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("quote_id,file,size,extension"))
        .stdout(predicate::str::contains(",a.step,1048576,step,"))
        .stdout(predicate::str::contains(",b.igs,524288,igs,"));
}

#[test]
fn test_quote_text_output() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["quote", "bracket.step:2M", "--seed", "1", "--time-unit", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quote QT-"))
        .stdout(predicate::str::contains("bracket.step (2.00 MB)"))
        .stdout(predicate::str::contains("Competitors"))
        .stdout(predicate::str::contains("Xometry"));
}

#[test]
fn test_quote_unsupported_file_exits_with_validation_code() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["quote", "model.xyz:1M", "bracket.step:1M", "--time-unit", "0"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Unsupported file format: xyz"))
        .stderr(predicate::str::contains("cncquote validate"));
}

#[test]
fn test_quote_saves_json() {
    let home = TempDir::new().unwrap();
    let target = home.path().join("out").join("quote.json");

    cncquote(&home)
        .args(["quote", "part.stp:1M", "--seed", "5", "--time-unit", "0", "--save"])
        .arg(&target)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved quote to"));

    let saved: Quote = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(saved.analysis.files[0].name, "part.stp");
}

#[test]
fn test_validate_too_many_files() {
    let home = TempDir::new().unwrap();
    let inputs: Vec<String> = (0..11).map(|i| format!("part{i}.step:1M")).collect();

    cncquote(&home)
        .arg("validate")
        .args(&inputs)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("At most 10 files can be uploaded at once"))
        .stdout(predicate::str::contains("Batch rejected"));
}

#[test]
fn test_validate_directory() {
    let home = TempDir::new().unwrap();
    let parts = TempDir::new().unwrap();
    fs::write(parts.path().join("bracket.step"), vec![0u8; 4096]).unwrap();
    fs::write(parts.path().join("readme.txt"), b"ignored").unwrap();

    cncquote(&home)
        .arg("validate")
        .arg(parts.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ bracket.step (4.00 KB)"))
        .stdout(predicate::str::contains("readme.txt").not())
        .stdout(predicate::str::contains("Batch accepted"));
}

#[test]
fn test_validate_all_includes_unsupported() {
    let home = TempDir::new().unwrap();
    let parts = TempDir::new().unwrap();
    fs::write(parts.path().join("bracket.step"), b"solid").unwrap();
    fs::write(parts.path().join("readme.txt"), b"text").unwrap();

    cncquote(&home)
        .args(["validate", "--all", "--format", "json"])
        .arg(parts.path())
        .assert()
        .code(3)
        .stdout(predicate::str::contains("\"valid\": false"))
        .stdout(predicate::str::contains("Unsupported file format: txt"));
}

#[test]
fn test_validate_huge_declared_sizes() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["validate", "a.step:15000000000G", "b.step:15000000000G"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("File a.step exceeds the 50 MB size limit"))
        .stdout(predicate::str::contains("File b.step exceeds the 50 MB size limit"));
}

#[test]
fn test_missing_path_is_filesystem_error() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["validate", "does/not/exist.step"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_bad_size_is_misuse() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["validate", "a.step:huge"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid size 'huge' for a.step"));
}

#[test]
fn test_env_overrides_limits() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .env("CNCQUOTE_PIPELINE__LIMITS__MAX_FILES", "2")
        .args(["validate", "a.step:1", "b.step:1", "c.step:1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("At most 2 files can be uploaded at once"));
}

#[test]
fn test_contact_form_accepted() {
    let home = TempDir::new().unwrap();
    let form = home.path().join("contact.json");
    fs::write(
        &form,
        r#"{
            "name": "Li Wei",
            "email": "li.wei@example.com",
            "phone": "13812345678",
            "message": "Need 50 aluminium brackets",
            "contact_preference": "email",
            "privacy": true
        }"#,
    )
    .unwrap();

    cncquote(&home)
        .args(["form", "contact"])
        .arg(&form)
        .assert()
        .success()
        .stdout(predicate::str::contains("contact form accepted as contact_"));
}

#[test]
fn test_quote_form_rejected() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["form", "quote", "-", "--format", "json"])
        .write_stdin(r#"{"name": "Li Wei", "email": "not-an-email", "quantity": 0}"#)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Please enter a valid email address"))
        .stdout(predicate::str::contains("Please choose a material"))
        .stderr(predicate::str::contains("quote form rejected"));
}

#[test]
fn test_form_with_malformed_json() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["form", "contact", "-"])
        .write_stdin("{ not json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is not a valid contact form"));
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();

    cncquote(&home)
        .args(["config", "set", "pipeline.limits.max_files", "4"])
        .assert()
        .success();

    cncquote(&home)
        .args(["config", "get", "pipeline.limits.max_files"])
        .assert()
        .success()
        .stdout("4\n");

    let config_file = home.path().join("config/cncquote/config.toml");
    assert!(fs::read_to_string(config_file).unwrap().contains("max_files = 4"));
}

#[test]
fn test_config_unknown_key_suggests() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["config", "set", "output.progres_enabled", "false"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Did you mean 'output.progress_enabled'?"));
}

#[test]
fn test_config_list_groups_sections() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[output]"))
        .stdout(predicate::str::contains("[pipeline]"))
        .stdout(predicate::str::contains("limits.max_files = 10"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    cncquote(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cncquote"));
}
