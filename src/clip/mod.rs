// Clip module
// Slices a [start,end) window out of a source track and re-encodes it into a
// standalone playable clip, via an external ffmpeg binary.

pub mod extractor;
pub mod ffmpeg;
pub mod media_store;
pub mod source;

pub use extractor::{ClipExtractionError, ClipExtractor, ExtractedClip, FfmpegClipExtractor};
pub use media_store::MediaStore;
pub use source::{resolve_source, SourceHandle};
