//! Sled Persistence - 嵌入式 KV 存储

mod kv_store;

pub use kv_store::{SledKeyValueStore, SledStoreConfig};
