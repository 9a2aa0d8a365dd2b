use assert_cmd::prelude::*;
use photoop::auth::{CREDENTIAL_KEY, Credential};
use photoop::store::SettingsStore;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &Path, consumer: bool) -> PathBuf {
    let path = dir.join("config.yaml");
    let settings_dir = dir.join("settings");
    let mut contents = String::new();
    if consumer {
        contents.push_str("consumer_key: test-key\nconsumer_secret: test-secret\n");
    }
    contents.push_str(&format!(
        "settings_dir: {}\npermission: read\n",
        settings_dir.display()
    ));
    fs::write(&path, contents).expect("failed to write config");
    path
}

fn store_credential(dir: &Path) {
    let store = SettingsStore::open_in(&dir.join("settings")).expect("open settings");
    let credential = Credential::new("tok", "tok-secret", "12345@N00").with_username("alice");
    store
        .set(CREDENTIAL_KEY, &Some(credential))
        .expect("store credential");
}

fn photoop(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("photoop"));
    cmd.arg("--config")
        .arg(config)
        .env_remove("PHOTOOP_CONFIG")
        .env_remove("PHOTOOP_API_HOST")
        .env_remove("PHOTOOP_FORMAT")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn status_uses_custom_config_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);

    let assert = photoop(&config_path).arg("status").assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains(&config_path.to_string_lossy().to_string()));
    assert!(stdout.contains("Consumer key configured"));
    assert!(stdout.contains("Login permission: read"));
    assert!(stdout.contains("Not logged in"));

    Ok(())
}

#[test]
fn status_shows_restored_session() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);
    store_credential(temp.path());

    photoop(&config_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as alice"));

    Ok(())
}

#[test]
fn status_without_config_suggests_init() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let missing = temp.path().join("absent.yaml");

    photoop(&missing)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration not found"))
        .stdout(predicate::str::contains("photoop init"));

    Ok(())
}

#[test]
fn version_prints_package_version() {
    Command::new(assert_cmd::cargo::cargo_bin!("photoop"))
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completion_generates_bash_script() {
    Command::new(assert_cmd::cargo::cargo_bin!("photoop"))
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("photoop"));
}

#[test]
fn commands_need_consumer_key() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), false);

    photoop(&config_path)
        .args(["photos", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Consumer key not configured"));

    Ok(())
}

#[test]
fn photos_list_needs_login() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);

    photoop(&config_path)
        .args(["photos", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));

    Ok(())
}

#[test]
fn settings_list_hides_credential() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);
    store_credential(temp.path());
    let store = SettingsStore::open_in(&temp.path().join("settings"))?;
    store.set("columns", &4)?;
    drop(store);

    let assert = photoop(&config_path)
        .args(["settings", "list", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout)?;
    let rows = json["data"].as_array().expect("data array");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r["key"] == "columns" && r["value"] == "4"));
    assert!(rows.iter().any(|r| r["key"] == "credential" && r["value"] == "(hidden)"));
    assert!(!stdout.contains("tok-secret"));

    Ok(())
}

#[test]
fn settings_unset_and_clear() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);
    store_credential(temp.path());
    {
        let store = SettingsStore::open_in(&temp.path().join("settings"))?;
        store.set("columns", &4)?;
    }

    photoop(&config_path)
        .args(["settings", "unset", "columns"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed columns"));

    photoop(&config_path)
        .args(["settings", "unset", "columns"])
        .assert()
        .success()
        .stdout(predicate::str::contains("columns was not set"));

    photoop(&config_path)
        .args(["settings", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 settings"));

    photoop(&config_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));

    Ok(())
}

#[test]
fn logout_forgets_stored_session() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);
    store_credential(temp.path());

    photoop(&config_path)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    let store = SettingsStore::open_in(&temp.path().join("settings"))?;
    assert!(!store.contains(CREDENTIAL_KEY)?);

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn call_anonymous_method_against_api_host() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let echo = server
        .mock("GET", "/services/rest")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("method".into(), "flickr.test.echo".into()),
            mockito::Matcher::UrlEncoded("name".into(), "value".into()),
            mockito::Matcher::UrlEncoded("api_key".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"name":{"_content":"value"},"stat":"ok"}"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);

    photoop(&config_path)
        .args(["call", "flickr.test.echo", "name=value", "--no-auth"])
        .arg("--api-host")
        .arg(server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"stat\": \"ok\""));

    echo.assert();
    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn photos_info_fetches_repeated_ids_once() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let info = server
        .mock("GET", "/services/rest")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("method".into(), "flickr.photos.getInfo".into()),
            mockito::Matcher::UrlEncoded("photo_id".into(), "42".into()),
            mockito::Matcher::UrlEncoded("oauth_token".into(), "tok".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"photo": {"id": "42", "secret": "abc", "server": "7",
                "owner": {"nsid": "12345@N00", "username": "alice"},
                "title": {"_content": "Sunset"}, "description": {"_content": ""},
                "visibility": {"ispublic": 1, "isfriend": 0, "isfamily": 0},
                "dates": {"posted": "1700000000", "taken": "2023-11-14 22:13:20"},
                "views": "3"}, "stat": "ok"}"#,
        )
        .expect(1)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);
    store_credential(temp.path());

    let assert = photoop(&config_path)
        .args(["photos", "info", "42", "42", "--format", "json"])
        .arg("--api-host")
        .arg(server.url())
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout)?;
    let photos = json["data"].as_array().expect("data array");
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0]["title"]["_content"], "Sunset");

    info.assert();
    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn delete_with_yes_posts_without_prompting() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let delete = server
        .mock("POST", "/services/rest")
        .match_body(mockito::Matcher::Regex("method=flickr.photos.delete".into()))
        .with_status(200)
        .with_body(r#"{"stat":"ok"}"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), true);
    store_credential(temp.path());

    photoop(&config_path)
        .args(["delete", "42", "--yes"])
        .arg("--api-host")
        .arg(server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted photo 42"));

    delete.assert();
    Ok(())
}
