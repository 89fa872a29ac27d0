//! CLI smoke tests for fluxfit.
//!
//! Trees used here contain no HelmReleases, so `helm` is never invoked.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for the fluxfit binary, isolated from any global config.
fn fluxfit_cmd(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("fluxfit");
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: apps
spec:
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
        - name: web
          image: nginx:1.25
"#;

const RECOMMENDATIONS: &str = r#"[
  {
    "Properties": {"name": "web", "namespace": "apps"},
    "Resources": [
      {
        "Overview": {"name": "web - Overall"},
        "Details": {
          "cpu_request": {"Current": "", "Recommended": "0.25 core"},
          "memory_limit": {"Current": "", "Recommended": "512 MiB"}
        }
      }
    ]
  }
]"#;

fn tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let cluster = dir.path().join("clusters/prod");
    fs::create_dir_all(&cluster).unwrap();
    fs::write(
        cluster.join("gotk-sync.yaml"),
        "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - web.yaml\n",
    )
    .unwrap();
    fs::write(cluster.join("web.yaml"), DEPLOYMENT).unwrap();
    fs::write(dir.path().join("out.json"), RECOMMENDATIONS).unwrap();
    dir
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
    let home = TempDir::new().unwrap();
    fluxfit_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    fluxfit_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolve_lists_documents_as_json() {
    let home = TempDir::new().unwrap();
    let tree = tree();
    fluxfit_cmd(home.path())
        .args(["resolve", "--format", "json"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"Deployment\""))
        .stdout(predicate::str::contains("\"name\": \"web\""));
}

#[test]
fn resolve_without_entry_file_fails() {
    let home = TempDir::new().unwrap();
    let empty = TempDir::new().unwrap();
    fluxfit_cmd(home.path())
        .arg("resolve")
        .arg(empty.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cluster not found"));
}

// =============================================================================
// apply
// =============================================================================

#[test]
fn apply_dry_run_leaves_tree_untouched() {
    let home = TempDir::new().unwrap();
    let tree = tree();
    fluxfit_cmd(home.path())
        .args(["apply", "--dry-run", "--format", "json", "--recommendations"])
        .arg(tree.path().join("out.json"))
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"patched\": 1"))
        .stdout(predicate::str::contains("web.yaml"));

    let content = fs::read_to_string(tree.path().join("clusters/prod/web.yaml")).unwrap();
    assert_eq!(content, DEPLOYMENT);
}

#[test]
fn apply_writes_patched_deployment() {
    let home = TempDir::new().unwrap();
    let tree = tree();
    fluxfit_cmd(home.path())
        .args(["apply", "--recommendations"])
        .arg(tree.path().join("out.json"))
        .arg(tree.path())
        .assert()
        .success();

    let content = fs::read_to_string(tree.path().join("clusters/prod/web.yaml")).unwrap();
    assert!(content.contains("cpu: 250m"));
    assert!(content.contains("memory: 512Mi"));
}

#[test]
fn apply_with_bad_quantity_fails_without_writing() {
    let home = TempDir::new().unwrap();
    let tree = tree();
    fs::write(
        tree.path().join("out.json"),
        RECOMMENDATIONS.replace("512 MiB", "half a gig"),
    )
    .unwrap();

    fluxfit_cmd(home.path())
        .args(["apply", "--recommendations"])
        .arg(tree.path().join("out.json"))
        .arg(tree.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));

    let content = fs::read_to_string(tree.path().join("clusters/prod/web.yaml")).unwrap();
    assert_eq!(content, DEPLOYMENT);
}

#[test]
fn malformed_local_config_fails() {
    let home = TempDir::new().unwrap();
    let tree = tree();
    fs::write(tree.path().join(".fluxfit.toml"), "[gitops\n").unwrap();

    fluxfit_cmd(home.path())
        .arg("resolve")
        .arg(tree.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
