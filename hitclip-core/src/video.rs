//! Read-only description of one recording.

use std::path::{Path, PathBuf};

/// A gameplay recording as reported by ffprobe.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSource {
    pub path: PathBuf,
    /// Total number of frames in the first video stream.
    pub frame_count: u64,
    /// Average frame rate of the first video stream.
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl VideoSource {
    /// File name without the extension, used to name the clips.
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }
}

/// File name without the extension, or `"video"` when the path has none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_drops_directory_and_extension() {
        let source = VideoSource {
            path: PathBuf::from("/recordings/match one.mp4"),
            frame_count: 10,
            fps: 30.0,
            width: 1920,
            height: 1080,
        };
        assert_eq!(source.stem(), "match one");
    }
}
