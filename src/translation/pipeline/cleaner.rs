//! 译文清理与重组
//!
//! 翻译服务偶尔把标签名当作正文输出，例如 `<div>div Hello</div>`。
//! 这里用正则做尽力而为的清理，不做完整的 HTML 解析：
//! 与标签名相同的普通单词（如正文中的 "section"）也会被去掉，属于已知取舍。

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// 可能泄漏到正文中的标签名
const LEAKED_TAGS: &str = "div|p|span|a|ul|ol|li|h[1-6]|section|article|header|footer|nav|main|aside|figure|figcaption|blockquote|cite|img|table|tr|td|th";

/// 独立单词清理时跳过的标签名，"a" 是英文冠词
const STANDALONE_EXCLUDED: &[&str] = &["a"];

struct CleanupRegexes {
    /// `>div<` 形式：整段正文只有标签名
    bare_name: Regex,
    /// `<div>div text` 形式
    after_open: Regex,
    /// `text p</p>` 形式
    before_close: Regex,
    /// 正文中独立出现的标签名
    standalone: Regex,
    /// 标签切分
    tag: Regex,
    whitespace_run: Regex,
}

static REGEXES: OnceLock<Option<CleanupRegexes>> = OnceLock::new();

fn regexes() -> Option<&'static CleanupRegexes> {
    REGEXES
        .get_or_init(|| {
            let build = || -> Result<CleanupRegexes, regex::Error> {
                Ok(CleanupRegexes {
                    bare_name: Regex::new(&format!(r"(?i)>\s*(?:{})\s*<", LEAKED_TAGS))?,
                    after_open: Regex::new(&format!(
                        r"(?i)(<({tags})(?:\s[^>]*)?>)\s*({tags})\s+",
                        tags = LEAKED_TAGS
                    ))?,
                    before_close: Regex::new(&format!(
                        r"(?i)\s+({tags})\s*</({tags})\s*>",
                        tags = LEAKED_TAGS
                    ))?,
                    standalone: Regex::new(&format!(
                        r"(?i)(^|\s)({})(\s|[.,:;?!]|$)",
                        LEAKED_TAGS
                    ))?,
                    tag: Regex::new(r"<[^>]*>")?,
                    whitespace_run: Regex::new(r"\s{2,}")?,
                })
            };
            match build() {
                Ok(regexes) => Some(regexes),
                Err(e) => {
                    tracing::error!("清理正则编译失败: {}", e);
                    None
                }
            }
        })
        .as_ref()
}

/// 清理翻译产物中的标签名泄漏，并压缩连续空白
pub fn clean(html: &str) -> String {
    let Some(re) = regexes() else {
        return html.to_string();
    };

    let cleaned = re.bare_name.replace_all(html, "><");

    let cleaned = re.after_open.replace_all(&cleaned, |caps: &Captures| {
        if caps[2].eq_ignore_ascii_case(&caps[3]) {
            caps[1].to_string()
        } else {
            caps[0].to_string()
        }
    });

    let cleaned = re.before_close.replace_all(&cleaned, |caps: &Captures| {
        if caps[1].eq_ignore_ascii_case(&caps[2]) {
            format!("</{}>", &caps[2])
        } else {
            caps[0].to_string()
        }
    });

    let cleaned = strip_standalone_names(re, &cleaned);

    re.whitespace_run.replace_all(&cleaned, " ").into_owned()
}

/// 按索引顺序拼接片段并做最终清理
pub fn reassemble<S: AsRef<str>>(chunks: &[S]) -> String {
    let joined: String = chunks.iter().map(|c| c.as_ref()).collect();
    clean(&joined)
}

/// 只处理标签之间的文本，标签本身（包括属性值）保持不变
fn strip_standalone_names(re: &CleanupRegexes, html: &str) -> String {
    let mut output = String::with_capacity(html.len());
    let mut last = 0;

    for tag in re.tag.find_iter(html) {
        output.push_str(&strip_text_segment(re, &html[last..tag.start()]));
        output.push_str(tag.as_str());
        last = tag.end();
    }
    output.push_str(&strip_text_segment(re, &html[last..]));

    output
}

fn strip_text_segment(re: &CleanupRegexes, text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    re.standalone
        .replace_all(text, |caps: &Captures| {
            let name = caps[2].to_ascii_lowercase();
            if STANDALONE_EXCLUDED.contains(&name.as_str()) {
                caps[0].to_string()
            } else {
                format!("{}{}", &caps[1], &caps[3])
            }
        })
        .into_owned()
}
