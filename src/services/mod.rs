pub mod processor;
pub mod segmenter;
pub mod storage;

pub use processor::JobProcessor;
pub use segmenter::{
    MattingParams, PassthroughSegmenter, RemoteSegmenter, Segmenter, SharedSegmenter,
};
pub use storage::{FileStorage, StorageArea};
