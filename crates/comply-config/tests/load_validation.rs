//! Config load validation tests for comply-config.
// crates/comply-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use comply_config::ComplyConfig;
use comply_config::ConfigError;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ComplyConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(ComplyConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(ComplyConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(ComplyConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(ComplyConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_unparseable_toml() -> TestResult {
    let file = write_config("this is not toml = [")?;
    assert_invalid(ComplyConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_rejects_zero_busy_timeout() -> TestResult {
    let file = write_config(
        "[store]\npath = \"comply.db\"\nbusy_timeout_ms = 0\n\n[assets]\ndocument = \
         \"assets.json\"\n",
    )?;
    assert_invalid(
        ComplyConfig::load(Some(file.path())),
        "busy_timeout_ms must be greater than zero",
    )?;
    Ok(())
}

#[test]
fn load_rejects_empty_store_path() -> TestResult {
    let file = write_config("[store]\npath = \"\"\n\n[assets]\ndocument = \"assets.json\"\n")?;
    assert_invalid(ComplyConfig::load(Some(file.path())), "store path must not be empty")?;
    Ok(())
}

#[test]
fn load_accepts_minimal_config_with_defaults() -> TestResult {
    let file = write_config("[store]\npath = \"comply.db\"\n\n[assets]\ndocument = \
                             \"assets.json\"\n")?;
    let config = ComplyConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.store.busy_timeout_ms != 5_000 {
        return Err("expected default busy timeout".to_string());
    }
    if config.logging.filter != "info" {
        return Err("expected default logging filter".to_string());
    }
    Ok(())
}
