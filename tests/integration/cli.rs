//! Integration tests for the `errcodes` binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn errcodes(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_errcodes"));
    command
        .current_dir(dir)
        .env_remove("ERRCODES_MAP")
        .env_remove("ERRCODES_OUT_DIR");
    command
}

/// Helper function to create a test file
fn create_test_file(
    dir: &TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_extract_with_flags() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "src/a.js", "invariant(x, 'Invalid input');");
    create_test_file(&temp_dir, "src/b.ts", "invariant(y, 'Expected ' + name);");
    create_test_file(&temp_dir, "src/notes.txt", "invariant(z, 'Not scanned');");

    let output = errcodes(temp_dir.path())
        .args(["extract", "--map", "codes.json", "--out", "errors", "src"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("codes.json")).unwrap(),
        "{\n  \"0\": \"Invalid input\",\n  \"1\": \"Expected %s\"\n}\n"
    );
    assert!(temp_dir.path().join("errors/ErrorDev.js").is_file());
    assert!(temp_dir.path().join("errors/ErrorProd.js").is_file());
}

#[test]
fn test_extract_with_project_config() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(
        &temp_dir,
        "errcodes.toml",
        "[extract]\nmap_path = \"scripts/codes.json\"\nout_dir = \"gen\"\nassertion_name = \"assert\"\n",
    );
    create_test_file(&temp_dir, "lib/index.js", "assert(ok, 'Configured'); invariant(ok, 'Other');");

    let output = errcodes(temp_dir.path())
        .args(["extract", "lib"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("scripts/codes.json")).unwrap(),
        "{\n  \"0\": \"Configured\"\n}\n"
    );
    assert!(temp_dir.path().join("gen/ErrorProd.js").is_file());
}

#[test]
fn test_extract_env_overrides_config() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(
        &temp_dir,
        "errcodes.toml",
        "[extract]\nmap_path = \"from-file.json\"\nout_dir = \"gen\"\n",
    );
    create_test_file(&temp_dir, "a.js", "invariant(ok, 'Env');");

    let output = errcodes(temp_dir.path())
        .env("ERRCODES_MAP", temp_dir.path().join("from-env.json"))
        .args(["extract", "a.js"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(temp_dir.path().join("from-env.json").is_file());
    assert!(!temp_dir.path().join("from-file.json").exists());
}

#[test]
fn test_extract_without_map_fails() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "a.js", "invariant(ok, 'Nowhere');");

    let output = errcodes(temp_dir.path())
        .args(["extract", "--out", "errors", "a.js"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error_map_path"));
    assert!(!temp_dir.path().join("errors").exists());
}

#[test]
fn test_decode() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "codes.json", "{\"5\": \"Expected %s to be %s\"}");

    let output = errcodes(temp_dir.path())
        .args(["decode", "--map", "codes.json", "5", "a", "b"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Expected a to be b\n");

    let output = errcodes(temp_dir.path())
        .args(["decode", "--map", "codes.json", "6"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_url() {
    let temp_dir = TempDir::new().unwrap();
    let output = errcodes(temp_dir.path())
        .args(["url", "3", "a", "b c"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "https://reactjs.org/docs/error-decoder.html?invariant=3&args[]=a&args[]=b%20c\n"
    );
}
