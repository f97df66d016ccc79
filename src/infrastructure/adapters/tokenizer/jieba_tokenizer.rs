//! Jieba Tokenizer - 中文分词实现
//!
//! 词典在构造时加载一次，之后每次调用都是纯函数

use jieba_rs::Jieba;

use crate::application::ports::{SegmentMode, TextSegmenterPort};

/// Jieba 分词器
pub struct JiebaTokenizer {
    jieba: Jieba,
}

impl JiebaTokenizer {
    /// 加载内置词典
    pub fn new() -> Self {
        let jieba = Jieba::new();
        tracing::info!("Jieba dictionary loaded");
        Self { jieba }
    }
}

impl Default for JiebaTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSegmenterPort for JiebaTokenizer {
    fn segment(&self, text: &str, mode: SegmentMode) -> Vec<String> {
        let words = match mode {
            SegmentMode::Precise => self.jieba.cut(text, true),
            SegmentMode::Search => self.jieba.cut_for_search(text, true),
            SegmentMode::Full => self.jieba.cut_all(text),
        };
        words.into_iter().map(str::to_string).collect()
    }
}
