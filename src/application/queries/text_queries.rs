//! Text Queries

/// 分词查询
#[derive(Debug, Clone)]
pub struct SegmentText {
    pub text: String,
    /// 分词模式名称：default / search / full
    pub mode: String,
}
