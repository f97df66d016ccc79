//! File System Persistence - 音频文件缓存

mod audio_cache;

pub use audio_cache::{FileAudioCache, FileCacheConfig};
