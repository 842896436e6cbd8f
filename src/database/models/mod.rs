// Database models

mod audio_file;
mod category;
mod segment;
mod selection;

pub use audio_file::AudioFile;
pub use category::Category;
pub use segment::{AudioSegment, SegmentFilter, SegmentPayload};
pub use selection::UserSelection;
