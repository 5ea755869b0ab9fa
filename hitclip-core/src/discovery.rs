//! File discovery module for finding recordings to process.
//!
//! Only the top level of the input directory is searched, and only regular
//! files with an `.mp4` extension (case-insensitive) are eligible. The result
//! is sorted by file name so batches run in a predictable order.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Extension recognised as a gameplay recording.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Finds recordings eligible for processing in the specified directory.
///
/// # Arguments
///
/// * `input_dir` - The directory to search for recordings
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths of the discovered `.mp4` files, sorted
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If no `.mp4` files are found
///
/// # Examples
///
/// ```rust,no_run
/// use hitclip_core::find_processable_files;
/// use std::path::Path;
///
/// match find_processable_files(Path::new("/recordings")) {
///     Ok(files) => println!("Found {} recordings", files.len()),
///     Err(e) => println!("Error finding recordings: {}", e),
/// }
/// ```
pub fn find_processable_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() {
                return None;
            }
            has_video_extension(&path).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// True when the path ends in `.mp4`, ignoring case.
pub fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(VIDEO_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_ignores_case() {
        assert!(has_video_extension(Path::new("match.mp4")));
        assert!(has_video_extension(Path::new("MATCH.MP4")));
        assert!(!has_video_extension(Path::new("match.mkv")));
        assert!(!has_video_extension(Path::new("mp4")));
    }
}
