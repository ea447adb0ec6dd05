use std::fs;

use catalog_engine::{ensure_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("page.html", "hola").unwrap();
    assert_eq!(first.file_name().unwrap(), "page.html");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hola");

    let second = writer.write("page.html", "chao").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "chao");
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("page.html", "data").is_err());
    assert!(!file_path.with_file_name("page.html").exists());
}

#[test]
fn remove_tolerates_missing_files() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    writer.remove("tc_session.json").unwrap();

    let path = writer.write("tc_session.json", "{}").unwrap();
    writer.remove("tc_session.json").unwrap();
    assert!(!path.exists());
}
