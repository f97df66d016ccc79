//! Text Query Handlers

use std::sync::Arc;

use crate::application::error::{ensure_not_blank, ApplicationError};
use crate::application::ports::{SegmentMode, TextSegmenterPort};
use crate::application::queries::SegmentText;
use crate::domain::clean_text;

/// 分词结果
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTextResponse {
    pub text: String,
    pub mode: SegmentMode,
    pub words: Vec<String>,
}

/// SegmentText Handler
pub struct SegmentTextHandler {
    segmenter: Arc<dyn TextSegmenterPort>,
}

impl SegmentTextHandler {
    pub fn new(segmenter: Arc<dyn TextSegmenterPort>) -> Self {
        Self { segmenter }
    }

    pub async fn handle(&self, query: SegmentText) -> Result<SegmentTextResponse, ApplicationError> {
        // 先校验模式，再做任何分词工作
        let mode: SegmentMode = query.mode.parse()?;
        ensure_not_blank("text", &query.text)?;

        let text = clean_text(&query.text);
        let words = self.segmenter.segment(&text, mode);

        Ok(SegmentTextResponse { text, mode, words })
    }
}
