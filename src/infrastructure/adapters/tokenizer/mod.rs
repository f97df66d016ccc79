//! Tokenizer Adapter - 中文分词实现

mod jieba_tokenizer;

pub use jieba_tokenizer::JiebaTokenizer;
