//! Integration tests for the `defcache` binary.

use anyhow::Result;
use predicates::prelude::*;

mod common;
use common::TestProject;

#[test]
fn test_render_toggle_reports_counter_changes() -> Result<()> {
    let project = TestProject::with_sample_registry()?;

    let output = project
        .defcache()
        .args(["render", "--registry", "registry.toml"])
        .args(["helper:foo-bar", "helper:baz-qux", "helper:foo-bar", "helper:baz-qux"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines[0],
        "helper:foo-bar => foo-bar helper!  {cacheMiss: +1, helperDefinitionCount: +1}"
    );
    assert_eq!(
        lines[1],
        "helper:baz-qux => baz-qux helper!  {cacheMiss: +1, helperDefinitionCount: +1}"
    );
    assert_eq!(lines[2], "helper:foo-bar => foo-bar helper!  {cacheHit: +1}");
    assert_eq!(lines[3], "helper:baz-qux => baz-qux helper!  {cacheHit: +1}");
    assert!(lines[4].contains("2 definitions cached, 2 hits, 2 misses (50.0% hit rate)"));
    assert_eq!(lines.len(), 5, "no render tree section unless enabled");
    Ok(())
}

#[test]
fn test_render_components_json() -> Result<()> {
    let project = TestProject::with_sample_registry()?;

    let output = project
        .defcache()
        .args(["render", "--registry", "registry.toml", "--format", "json"])
        .args(["component-one", "component:component-two", "component-one"])
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let steps = report["steps"].as_array().expect("steps array");
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0]["output"], "One");
    assert_eq!(steps[0]["changes"]["componentDefinitionCount"], 1);
    assert_eq!(steps[1]["output"], "Two");
    assert_eq!(steps[1]["kind"], "component");
    assert_eq!(steps[2]["changes"], serde_json::json!({ "cacheHit": 1 }));
    assert_eq!(report["totals"]["componentDefinitionCount"], 2);
    assert_eq!(report["renderTree"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_render_tree_from_config_file() -> Result<()> {
    let project = TestProject::with_sample_registry()?;
    project.write_config("debug_render_tree = true\n")?;

    project
        .defcache()
        .args(["render", "--registry", "registry.toml", "component-two"])
        .assert()
        .success()
        .stdout(predicate::str::contains("{cacheHit: +1, cacheMiss: +1, componentDefinitionCount: +1}"))
        .stdout(predicate::str::contains("component component-two (ComponentTwo)"));
    Ok(())
}

#[test]
fn test_render_tree_from_env() -> Result<()> {
    let project = TestProject::with_sample_registry()?;

    project
        .defcache()
        .env("DEFCACHE_DEBUG_RENDER_TREE", "1")
        .args(["render", "--registry", "registry.toml", "helper:foo-bar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("helper foo-bar"));
    Ok(())
}

#[test]
fn test_render_name_containing_colon() -> Result<()> {
    let project = TestProject::new()?;
    project.write_registry("[components.\"ns:card\"]\ntemplate = \"Card\"\n")?;

    project
        .defcache()
        .args(["render", "--registry", "registry.toml", "component:ns:card"])
        .assert()
        .success()
        .stdout(predicate::str::contains("component:ns:card => Card"));
    Ok(())
}

#[test]
fn test_render_unknown_name_suggests() -> Result<()> {
    let project = TestProject::with_sample_registry()?;

    project
        .defcache()
        .args(["render", "--registry", "registry.toml", "helper:foo-baz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render helper:foo-baz"))
        .stderr(predicate::str::contains("Did you mean: foo-bar?"));
    Ok(())
}

#[test]
fn test_render_unknown_kind_is_rejected() -> Result<()> {
    let project = TestProject::with_sample_registry()?;

    project
        .defcache()
        .args(["render", "--registry", "registry.toml", "modifier:on-click"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown definition kind"));
    Ok(())
}

#[test]
fn test_render_compile_failure() -> Result<()> {
    let project = TestProject::new()?;
    project.write_registry("[components.broken]\ntemplate = \"{% if %}\"\n")?;

    project
        .defcache()
        .args(["render", "--registry", "registry.toml", "broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render component:broken"))
        .stderr(predicate::str::contains("failed compilations are never cached"));
    Ok(())
}

#[test]
fn test_check_success() -> Result<()> {
    let project = TestProject::with_sample_registry()?;

    project
        .defcache()
        .args(["check", "--registry", "registry.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 registrations compiled"));
    Ok(())
}

#[test]
fn test_check_reports_failures() -> Result<()> {
    let project = TestProject::new()?;
    project.write_registry(
        r#"
[components.good]
template = "Good"

[components.broken]
template = "{{ unclosed"
"#,
    )?;

    project
        .defcache()
        .args(["check", "--registry", "registry.toml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("component broken"))
        .stderr(predicate::str::contains("1 of 2 registrations failed to compile"));
    Ok(())
}

#[test]
fn test_missing_registry_file() -> Result<()> {
    let project = TestProject::new()?;

    project
        .defcache()
        .args(["check", "--registry", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read registry file"));
    Ok(())
}

#[test]
fn test_invalid_config_file() -> Result<()> {
    let project = TestProject::with_sample_registry()?;
    let config = project.write_config("not_a_setting = 1\n")?;

    project
        .defcache()
        .arg("--config")
        .arg(&config)
        .args(["check", "--registry", "registry.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
    Ok(())
}
