//! Text Segmenter Port - 分词抽象
//!
//! 定义分词器的抽象接口，具体实现在 infrastructure/adapters 层

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 分词错误
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Invalid mode: {0}. Must be one of [default, search, full]")]
    InvalidMode(String),
}

/// 分词模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentMode {
    /// 精确模式，适合大多数场景
    #[default]
    #[serde(rename = "default")]
    Precise,
    /// 搜索引擎模式，对长词再切分
    Search,
    /// 全模式，列出所有可能成词的组合
    Full,
}

impl SegmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentMode::Precise => "default",
            SegmentMode::Search => "search",
            SegmentMode::Full => "full",
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentMode {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(SegmentMode::Precise),
            "search" => Ok(SegmentMode::Search),
            "full" => Ok(SegmentMode::Full),
            other => Err(SegmentError::InvalidMode(other.to_string())),
        }
    }
}

/// Text Segmenter Port
///
/// 分词器接口，每次调用视为纯函数
pub trait TextSegmenterPort: Send + Sync {
    /// 将文本切分为有序词序列
    fn segment(&self, text: &str, mode: SegmentMode) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("default".parse::<SegmentMode>().unwrap(), SegmentMode::Precise);
        assert_eq!("search".parse::<SegmentMode>().unwrap(), SegmentMode::Search);
        assert_eq!("full".parse::<SegmentMode>().unwrap(), SegmentMode::Full);
        assert!("exact".parse::<SegmentMode>().is_err());
    }

    #[test]
    fn test_mode_wire_name() {
        assert_eq!(serde_json::to_string(&SegmentMode::Precise).unwrap(), "\"default\"");
        assert_eq!(SegmentMode::Search.to_string(), "search");
    }
}
