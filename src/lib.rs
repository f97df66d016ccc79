//! voxcache - 语音合成服务
//!
//! 架构设计: CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - SpeechRequest: 合成请求与韵律参数
//! - SessionRecord: 临时/持久会话
//! - Voice: 音色目录条目
//! - 文本分句与清洗
//!
//! 应用层 (application/):
//! - Ports: 端口定义（AudioCache, SessionManager, TtsEngine, TextSegmenter, KeyValueStore, Clock）
//! - Services: SpeechGenerator（缓存 + 流式合成）, VoiceDirectory（音色目录缓存）
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: 文件音频缓存 + Sled KV 存储
//! - Memory: 双层会话存储
//! - Adapters: TTS Client, Jieba 分词

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
