//! End-to-end tests for the drupal-updater CLI
//!
//! These tests verify:
//! - Help and argument handling
//! - Exit codes for unusable projects and config files
//! - A complete run against stand-in composer, drush and git scripts
//! - JSON output on stdout with narration on stderr

#![cfg(unix)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LOCK_BEFORE: &str = r#"{
    "content-hash": "1b4f0e9851971998e732078544c96b36",
    "packages": [
        {"name": "drupal/core", "version": "10.2.0", "type": "drupal-core"},
        {"name": "drupal/token", "version": "1.12.0", "type": "drupal-module"}
    ],
    "packages-dev": []
}
"#;

const LOCK_AFTER: &str = r#"{
    "content-hash": "60b725f10c9c85c70d97880dfe8191b3",
    "packages": [
        {"name": "drupal/core", "version": "10.2.0", "type": "drupal-core"},
        {"name": "drupal/token", "version": "1.13.0", "type": "drupal-module"}
    ],
    "packages-dev": []
}
"#;

const COMPOSER: &str = r#"
case "$*" in
  "show --locked --direct --name-only") printf 'drupal/core\ndrupal/token\n' ;;
  "show drupal/token") printf 'name     : drupal/token\ntype     : drupal-module\n' ;;
  "show --locked --outdated --direct") printf 'drupal/core 10.2.0 ~ 10.3.1\n' ;;
  "show --locked --outdated") printf 'drupal/core 10.2.0 ~ 10.3.1\n' ;;
  "update drupal/token --with-dependencies") cp composer.lock.next composer.lock ;;
  audit*) echo "No security vulnerability advisories found." ;;
esac
"#;

const DRUSH: &str = r#"
case "$1" in
  pm:security) echo "The drush site is not bootstrapped" >&2; exit 1 ;;
esac
case "$2" in
  php:script) cat <<'JSON'
[{"project_name":"ctools","current_version":"8.x-3.7","recommended_version":"None"}]
JSON
  ;;
esac
"#;

const COMPOSER_LOCK_DIFF: &str = r#"
printf '| Production Changes | From   | To     |\n| drupal/token       | 1.12.0 | 1.13.0 |\n'
"#;

/// A composer project whose tools are shell scripts logging every call
struct FakeSite {
    dir: TempDir,
}

impl FakeSite {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let site = Self { dir };
        let root = site.path();

        fs::write(root.join("composer.json"), "{\"name\": \"acme/site\"}\n").unwrap();
        fs::write(root.join("composer.lock"), LOCK_BEFORE).unwrap();
        fs::write(root.join("composer.lock.next"), LOCK_AFTER).unwrap();
        fs::create_dir(root.join("bin")).unwrap();

        site.tool("composer", COMPOSER);
        site.tool("drush", DRUSH);
        site.tool("git", "");
        site.tool("composer-lock-diff", COMPOSER_LOCK_DIFF);

        let bin = root.join("bin");
        let config = format!(
            "environments = [\"@stage\", \"@prod\"]\n\
             \n\
             [tools]\n\
             composer = \"{}\"\n\
             drush = \"{}\"\n\
             git = \"{}\"\n\
             composer_lock_diff = \"{}\"\n",
            bin.join("composer").display(),
            bin.join("drush").display(),
            bin.join("git").display(),
            bin.join("composer-lock-diff").display(),
        );
        fs::write(root.join("drupal-updater.toml"), config).unwrap();
        site
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn log_path(&self) -> PathBuf {
        self.path().join("calls.log")
    }

    fn tool(&self, name: &str, body: &str) {
        let path = self.path().join("bin").join(name);
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"{} $*\" >> '{}'\n{}",
            name,
            self.log_path().display(),
            body
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[test]
fn test_help() {
    let mut cmd = cargo_bin_cmd!("drupal-updater");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("update"));
}

#[test]
fn test_update_help_lists_options() {
    let mut cmd = cargo_bin_cmd!("drupal-updater");
    cmd.args(["update", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--environments"))
        .stdout(predicate::str::contains("--packages"))
        .stdout(predicate::str::contains("--security"))
        .stdout(predicate::str::contains("--no-dev"));
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    let mut cmd = cargo_bin_cmd!("drupal-updater");
    cmd.args(["update", "--quiet", "--verbose"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_missing_lock_file() {
    let dir = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("drupal-updater");
    cmd.arg("update")
        .arg("-C")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("composer.lock not found"));
}

#[test]
fn test_unknown_config_key() {
    let site = FakeSite::new();
    fs::write(site.path().join("drupal-updater.toml"), "enviroments = [\"@prod\"]\n").unwrap();

    let mut cmd = cargo_bin_cmd!("drupal-updater");
    cmd.arg("update")
        .arg("-C")
        .arg(site.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
    assert!(site.calls().is_empty());
}

#[test]
fn test_explicit_package_run() {
    let site = FakeSite::new();

    let mut cmd = cargo_bin_cmd!("drupal-updater");
    let assert = cmd
        .arg("update")
        .arg("-C")
        .arg(site.path())
        .args(["--packages", "drupal/token", "--author", "Bot <bot@example.com>"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.contains("// 1. CONSOLIDATING CONFIGURATION //"));
    assert!(stdout.contains("// 3. UPDATING PACKAGES //"));
    assert!(stdout.contains("/// Updating: drupal/token ///"));
    assert!(stdout.contains("| drupal/token       | 1.12.0 | 1.13.0 |"));
    assert!(stdout.contains("drupal/token: 1.12.0 → 1.13.0 (minor) [drupal]"));
    assert!(!stdout.contains("Unsupported Modules"));

    let calls = site.calls();
    assert!(calls.contains(&"drush @stage cr".to_string()));
    assert!(calls.contains(&"drush @prod cim -y".to_string()));
    assert!(calls.contains(&"composer update drupal/token --with-dependencies".to_string()));
    assert!(calls.contains(&"drush @prod updb -y".to_string()));
    assert!(calls.contains(&"git add composer.json composer.lock web config".to_string()));
    assert!(calls
        .iter()
        .any(|c| c.starts_with("git commit -m UPDATE - drupal/token")));
    assert!(calls
        .iter()
        .any(|c| c.ends_with("--author=Bot <bot@example.com> -n")));
    assert!(!calls.iter().any(|c| c.starts_with("composer show --locked --direct")));

    assert_eq!(
        fs::read_to_string(site.path().join("composer.lock")).unwrap(),
        LOCK_AFTER
    );
    assert!(!site.path().join("composer.drupalupdater.lock").exists());
}

#[test]
fn test_full_run_json_output() {
    let site = FakeSite::new();

    let mut cmd = cargo_bin_cmd!("drupal-updater");
    let assert = cmd
        .arg("update")
        .arg("-C")
        .arg(site.path())
        .args(["--format", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("// 2. CHECKING PACKAGES //"));
    let output = assert.get_output();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["environments"], serde_json::json!(["@stage", "@prod"]));
    assert_eq!(json["summary"]["updated"], 1);
    assert_eq!(json["summary"]["not_changed"], 1);
    assert_eq!(json["packages"][0]["package"], "drupal/core");
    assert_eq!(json["packages"][0]["status"], "not_changed");
    assert_eq!(json["packages"][1]["change"]["to"], "1.13.0");
    assert_eq!(json["lock_diff"]["changed"][0]["name"], "drupal/token");

    let sections = &json["report"]["sections"];
    assert_eq!(sections[0]["title"], "Not Updated Packages (Direct)");
    assert_eq!(sections[3]["title"], "Not Updated Securities (Drupal)");
    assert!(sections[3]["output"]
        .as_str()
        .unwrap()
        .contains("not bootstrapped"));

    let modules = &json["report"]["unsupported_modules"];
    assert_eq!(modules[0]["name"], "ctools");
    assert_eq!(modules[0]["recommended_version"], "None");
    assert_eq!(modules[0]["environments"], serde_json::json!(["@stage", "@prod"]));

    let calls = site.calls();
    assert!(calls.contains(&"composer show --locked --direct --name-only".to_string()));
    assert!(calls
        .iter()
        .any(|c| c.starts_with("drush @prod php:script ") && c.ends_with(".php")));
}
