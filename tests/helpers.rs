use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const METADATA: &str = r#"{
    "uuid": "83679162-1378-4288-a2d4-70e13ec132aa",
    "meta": {"role": "webserver", "ssh": "on"}
}"#;

#[test]
fn getconfig_from_file() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let metadata = dir.child("meta_data.json");
    metadata.write_str(METADATA)?;

    Command::cargo_bin("cloudutil")?
        .arg("getconfig")
        .arg(metadata.path())
        .arg("meta")
        .assert()
        .success()
        .stdout("role=webserver\nssh=on\n");

    Command::cargo_bin("cloudutil")?
        .arg("getconfig")
        .arg(metadata.path())
        .arg("hostname")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Key 'hostname' not found"));

    Ok(())
}

#[test]
fn getconfig_rejects_extra_arguments() -> TestResult {
    Command::cargo_bin("cloudutil")?
        .args(&["getconfig", "a", "b", "c"])
        .assert()
        .code(2);

    Ok(())
}

#[test]
fn getremote_prints_name() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    dir.child(".terraform").create_dir_all()?;
    dir.child(".terraform/terraform.tfstate").write_str(
        r#"{"version": 1, "remote": {"type": "atlas", "config": {"name": "jane_doe/example"}}}"#,
    )?;

    Command::cargo_bin("cloudutil")?
        .current_dir(dir.path())
        .arg("getremote")
        .assert()
        .success()
        .stdout("jane_doe/example\n");

    Ok(())
}

#[test]
fn getremote_local_state() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    dir.child(".terraform").create_dir_all()?;

    Command::cargo_bin("cloudutil")?
        .current_dir(dir.path())
        .arg("getremote")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("State is local"));

    Ok(())
}

#[test]
fn getremote_without_terraform_dir() -> TestResult {
    let dir = assert_fs::TempDir::new()?;

    Command::cargo_bin("cloudutil")?
        .current_dir(dir.path())
        .arg("getremote")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("terraform.tfstate"));

    Ok(())
}

#[test]
fn getremote_unknown_format() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let state = dir.child("state.tfstate");
    state.write_str("remote = atlas\n")?;

    Command::cargo_bin("cloudutil")?
        .arg("getremote")
        .arg("--state")
        .arg(state.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown format in Terraform state"));

    Ok(())
}

#[test]
fn install_precommit_needs_virtualenv() -> TestResult {
    Command::cargo_bin("cloudutil")?
        .arg("install-precommit")
        .env_remove("VIRTUAL_ENV")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No virtualenv defined"));

    Command::cargo_bin("cloudutil")?
        .arg("install-precommit")
        .env("VIRTUAL_ENV", "")
        .assert()
        .code(3);

    let dir = assert_fs::TempDir::new()?;
    Command::cargo_bin("cloudutil")?
        .arg("install-precommit")
        .env("VIRTUAL_ENV", dir.child("venv").path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("does not exist"));

    Ok(())
}
