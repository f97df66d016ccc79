//! 文本分句与词语清洗
//!
//! 会话分句流程：按行切分 → 行内按句末标点切分 → 分词 → 只保留汉字

/// 检查是否为句末标点（总是分割）
#[inline]
fn is_sentence_terminator(ch: char) -> bool {
    matches!(ch, '。' | '！' | '？')
}

/// 检查是否为 CJK 统一表意文字（基本区）
#[inline]
fn is_cjk_ideograph(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// 按句末标点分割单行文本
///
/// 标点保留在句尾；没有句末标点的行整体作为一句
fn split_line(line: &str) -> Vec<String> {
    let mut sentences: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        current.push(ch);
        if is_sentence_terminator(ch) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    // 剩余内容
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

/// 将文本切分为句子
///
/// 1. 按行分割（支持 \n 和 \r\n），忽略空行
/// 2. 每行按 `。！？` 分割
pub fn split_sentences(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(split_line)
        .collect()
}

/// 清洗分词结果：每个词只保留汉字，丢弃清洗后为空的词
pub fn clean_words<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words
        .iter()
        .map(|word| {
            word.as_ref()
                .chars()
                .filter(|ch| is_cjk_ideograph(*ch))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// 规整空白：连续空格、制表符等压缩为单个空格，保留换行
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if matches!(ch, ' ' | '\t' | '\u{000C}' | '\r') {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }

    out.trim().to_string()
}
