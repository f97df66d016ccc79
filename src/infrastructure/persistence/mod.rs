//! Persistence Layer - 数据持久化
//!
//! 文件系统音频缓存 + Sled 会话存储

pub mod fs;
pub mod sled;

pub use self::fs::{FileAudioCache, FileCacheConfig};
pub use self::sled::{SledKeyValueStore, SledStoreConfig};
