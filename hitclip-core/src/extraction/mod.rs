//! Clip extraction
//!
//! Cuts one lossless clip per event and optionally merges the clips of the
//! output directory into a single file.

pub mod clip;
pub mod merge;
pub mod window;

pub use clip::{ClipJob, build_extract_command, clip_output_path, extract_clip};
pub use merge::{collect_merge_inputs, merge_clips, merged_output_path};
pub use window::ClipWindow;
