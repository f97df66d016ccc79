//! Memory Layer - In-Memory State Management
//!
//! 双层会话存储，以及用于测试的内存 KV 存储

mod kv_store;
mod session_store;

pub use kv_store::InMemoryKeyValueStore;
pub use session_store::{HybridSessionStore, SessionStoreConfig, PERSISTENT_KEY_PREFIX};
