//! Application Services - 跨端口的用例编排

mod speech_generator;
mod voice_directory;

pub use speech_generator::{PreloadOutcome, SpeechGenerator, DEFAULT_CHUNK_SIZE};
pub use voice_directory::{VoiceDirectory, DEFAULT_CATALOG_TTL};
