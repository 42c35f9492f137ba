//! HTML 文档分片器
//!
//! 在块级元素的闭合标签处切分文档，再贪心地装配成不超过上限的片段。
//! 所有片段按顺序拼接后与原文档逐字节相同。
//!
//! 片段上限和搜索窗口都按字符计算，切分点总落在字符边界上。

use std::sync::OnceLock;

use regex::Regex;

use crate::translation::config::constants::{STRUCTURAL_SEARCH_WINDOW, WHITESPACE_SEARCH_WINDOW};

static BLOCK_CLOSE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn block_close_regex() -> Option<&'static Regex> {
    BLOCK_CLOSE_REGEX
        .get_or_init(|| Regex::new(r"(?i)</(?:p|h[1-6]|div|section|article)\s*>").ok())
        .as_ref()
}

/// 文档分片器
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_chunk_length: usize,
}

impl Chunker {
    pub fn new(max_chunk_length: usize) -> Self {
        Self {
            max_chunk_length: max_chunk_length.max(1),
        }
    }

    pub fn max_chunk_length(&self) -> usize {
        self.max_chunk_length
    }

    /// 把文档切分为有序片段，结果永远不为空
    pub fn chunk(&self, document: &str) -> Vec<String> {
        let pieces = split_after_block_closes(document);
        let packed = pack_pieces(&pieces, self.max_chunk_length);

        let mut fragments = Vec::with_capacity(packed.len());
        for fragment in packed {
            if char_len(&fragment) > self.max_chunk_length {
                fragments.extend(split_oversized(&fragment, self.max_chunk_length));
            } else {
                fragments.push(fragment);
            }
        }

        if fragments.is_empty() {
            return vec![document.to_string()];
        }

        tracing::debug!(
            "文档分片完成: {} 字符 -> {} 个片段",
            char_len(document),
            fragments.len()
        );
        fragments
    }
}

/// 便利函数
pub fn chunk_document(document: &str, max_chunk_length: usize) -> Vec<String> {
    Chunker::new(max_chunk_length).chunk(document)
}

/// 在每个块级闭合标签之后切开，闭合标签留在前一段
fn split_after_block_closes(document: &str) -> Vec<&str> {
    let Some(regex) = block_close_regex() else {
        return vec![document];
    };

    let mut pieces = Vec::new();
    let mut last = 0;
    for m in regex.find_iter(document) {
        pieces.push(&document[last..m.end()]);
        last = m.end();
    }
    if last < document.len() {
        pieces.push(&document[last..]);
    }
    pieces
}

fn pack_pieces(pieces: &[&str], max_len: usize) -> Vec<String> {
    let mut packed = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = char_len(piece);
        if !current.is_empty() && current_len + piece_len > max_len {
            packed.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(piece);
        current_len += piece_len;
    }

    if !current.is_empty() {
        packed.push(current);
    }
    packed
}

fn split_oversized(fragment: &str, max_len: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = fragment;

    while char_len(rest) > max_len {
        let cut = find_safe_split_point(rest, max_len);
        let (head, tail) = rest.split_at(cut);
        parts.push(head.to_string());
        rest = tail;
    }

    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

/// 在前 `limit` 个字符内寻找安全切分点，返回字节偏移，总在 (0, text.len()] 之内
///
/// 依次尝试：段落闭合处、句末标点后、空白处、上限处硬切。
/// 硬切若落在标签内部则退回到标签开头；标签从头开始时延伸到标签结尾，片段可能因此超过上限。
fn find_safe_split_point(text: &str, limit: usize) -> usize {
    let limit_at = byte_offset(text, limit.max(1));

    let window_start = byte_offset(text, limit.saturating_sub(STRUCTURAL_SEARCH_WINDOW));
    let window = &text[window_start..limit_at];

    // 段落闭合
    if let Some(pos) = window.to_ascii_lowercase().rfind("</p>") {
        let cut = window_start + pos + "</p>".len();
        if cut > 0 {
            return cut;
        }
    }

    // 句末
    let bytes = window.as_bytes();
    for i in (0..bytes.len().saturating_sub(1)).rev() {
        if bytes[i] == b'.' && bytes[i + 1].is_ascii_whitespace() {
            let cut = window_start + i + 1;
            if !inside_tag(text, cut) {
                return cut;
            }
        }
    }

    // 空白
    let ws_start = byte_offset(text, limit.saturating_sub(WHITESPACE_SEARCH_WINDOW));
    let ws_window = text[ws_start..limit_at].as_bytes();
    for i in (0..ws_window.len()).rev() {
        let cut = ws_start + i;
        if ws_window[i].is_ascii_whitespace() && cut > 0 && !inside_tag(text, cut) {
            return cut;
        }
    }

    hard_cut(text, limit_at)
}

fn hard_cut(text: &str, cut: usize) -> usize {
    if !inside_tag(text, cut) {
        return cut;
    }

    match text[..cut].rfind('<') {
        Some(open) if open > 0 => open,
        _ => text[cut..]
            .find('>')
            .map_or(text.len(), |close| cut + close + 1),
    }
}

/// `cut` 之前最近的 `<` 尚未被 `>` 闭合
fn inside_tag(text: &str, cut: usize) -> bool {
    let head = &text[..cut];
    match (head.rfind('<'), head.rfind('>')) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// 第 `chars` 个字符开始处的字节偏移，超出时为文本长度
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}
