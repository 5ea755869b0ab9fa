// hitclip-core/tests/discovery_tests.rs

use hitclip_core::discovery::find_processable_files;
use hitclip_core::error::CoreError;
use std::fs::{self, File};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_find_processable_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input_dir = dir.path();

    File::create(input_dir.join("match2.mp4"))?;
    File::create(input_dir.join("match1.MP4"))?; // case insensitive
    File::create(input_dir.join("notes.txt"))?;
    File::create(input_dir.join("old.mkv"))?;
    fs::create_dir(input_dir.join("subdir"))?;
    File::create(input_dir.join("subdir").join("nested.mp4"))?; // top level only
    fs::create_dir(input_dir.join("folder.mp4"))?; // directories are skipped

    let files = find_processable_files(input_dir)?;

    let names: Vec<_> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["match1.MP4", "match2.mp4"]);

    dir.close()?;
    Ok(())
}

#[test]
fn test_find_processable_files_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("notes.txt"))?;

    match find_processable_files(dir.path()) {
        Err(CoreError::NoFilesFound) => {}
        other => panic!("Unexpected result: {:?}", other),
    }

    dir.close()?;
    Ok(())
}

#[test]
fn test_find_processable_files_nonexistent_dir() {
    let missing = PathBuf::from("surely_this_does_not_exist_42_integration");
    match find_processable_files(&missing) {
        Err(CoreError::Io(_)) => {}
        other => panic!("Unexpected result: {:?}", other),
    }
}
