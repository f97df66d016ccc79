//! Domain Layer - 领域层
//!
//! - speech: 合成请求与韵律参数
//! - session: 会话记录与存储层级
//! - voice: 音色目录条目

pub mod session;
pub mod speech;
pub mod voice;

// 共享的文本分句器
mod text_segmenter;

pub use session::{
    SentenceSegment, SessionDraft, SessionMetadata, SessionRecord, SessionTier, SessionUpdate,
};
pub use speech::{RequestDigest, SpeechRequest};
pub use text_segmenter::{clean_text, clean_words, split_sentences};
pub use voice::Voice;
