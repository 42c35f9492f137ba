//! 正文提取
//!
//! 删除脚本、表单等非正文元素后，依次尝试常见的正文容器选择器；
//! 都不匹配时退回到收集全部段落和标题。

use std::sync::OnceLock;

use markup5ever_rcdom::{Handle, RcDom};
use regex::Regex;

use super::dom::{
    collect_outermost, find_first, get_node_attr, get_node_name, has_class, html_to_dom,
    parse_html, remove_elements,
};
use super::serializer::{serialize_inner, serialize_outer};
use crate::network::ImportError;

/// 提取前删除的元素
const STRIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "form", "button",
];

/// 退回模式下跳过的页面框架元素
const CHROME_ELEMENTS: &[&str] = &["nav", "footer", "header"];

/// 退回模式下收集的元素
const TEXT_ELEMENTS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// 简单选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector {
    Tag(&'static str),
    Class(&'static str),
    Id(&'static str),
    Attr(&'static str, &'static str),
}

impl Selector {
    fn matches(&self, node: &Handle) -> bool {
        match *self {
            Selector::Tag(tag) => get_node_name(node) == Some(tag),
            Selector::Class(class) => has_class(node, class),
            Selector::Id(id) => get_node_attr(node, "id").as_deref() == Some(id),
            Selector::Attr(name, value) => get_node_attr(node, name).as_deref() == Some(value),
        }
    }
}

/// 正文容器选择器，按优先级排列
const ARTICLE_SELECTORS: &[Selector] = &[
    Selector::Tag("article"),
    Selector::Class("article"),
    Selector::Class("post"),
    Selector::Class("content"),
    Selector::Tag("main"),
    Selector::Id("main"),
    Selector::Class("main"),
    Selector::Class("story"),
    Selector::Class("story-body"),
    Selector::Class("entry-content"),
    Selector::Class("post-content"),
    Selector::Attr("itemprop", "articleBody"),
    Selector::Class("news-item"),
];

static WHITESPACE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

/// 从 HTML 文本中提取正文
///
/// # 错误
///
/// 页面中没有任何可用内容时返回 [`ImportError::NoContent`]
pub fn extract_article(html: &str) -> Result<String, ImportError> {
    extract_from_dom(parse_html(html))
}

/// 按指定字符集解码后提取正文
pub fn extract_article_from_bytes(data: &[u8], charset: &str) -> Result<String, ImportError> {
    extract_from_dom(html_to_dom(data, charset))
}

fn extract_from_dom(dom: RcDom) -> Result<String, ImportError> {
    remove_elements(&dom.document, STRIPPED_ELEMENTS);

    let content = ARTICLE_SELECTORS
        .iter()
        .find_map(|selector| {
            find_first(&dom.document, &|node| selector.matches(node)).map(|node| {
                tracing::debug!("正文容器匹配: {:?}", selector);
                serialize_inner(&node)
            })
        })
        .filter(|content| !content.trim().is_empty())
        .unwrap_or_else(|| collect_text_elements(&dom.document));

    let content = collapse_whitespace(&content);
    if content.is_empty() {
        return Err(ImportError::NoContent);
    }
    Ok(content)
}

fn collect_text_elements(document: &Handle) -> String {
    let mut found = Vec::new();
    collect_outermost(
        document,
        &|node| get_node_name(node).map_or(false, |name| TEXT_ELEMENTS.contains(&name)),
        &|node| get_node_name(node).map_or(false, |name| CHROME_ELEMENTS.contains(&name)),
        &mut found,
    );

    found
        .iter()
        .map(serialize_outer)
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_whitespace(content: &str) -> String {
    let regex = WHITESPACE_REGEX
        .get_or_init(|| Regex::new(r"\s+").ok())
        .as_ref();

    match regex {
        Some(regex) => regex.replace_all(content, " ").trim().to_string(),
        None => content.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_tag_wins() {
        let html = r#"<html><body>
            <div class="content"><p>Sidebar</p></div>
            <article><h1>Title</h1>
              <p>First   paragraph.</p><script>track()</script>
            </article>
        </body></html>"#;

        assert_eq!(
            extract_article(html).unwrap(),
            "<h1>Title</h1> <p>First paragraph.</p>"
        );
    }

    #[test]
    fn test_selector_order_is_respected() {
        let html = r#"<div class="post-content"><p>late</p></div>
            <div id="main"><p>by id</p></div>"#;
        assert_eq!(extract_article(html).unwrap(), "<p>by id</p>");
    }

    #[test]
    fn test_attribute_selector() {
        let html = r#"<div itemprop="articleBody"><p>Body text</p></div>"#;
        assert_eq!(extract_article(html).unwrap(), "<p>Body text</p>");
    }

    #[test]
    fn test_fallback_collects_paragraphs_and_headings() {
        let html = r#"<body>
            <nav><p>Menu</p></nav>
            <h2>Heading</h2>
            <div><p>One</p><form><p>Signup</p></form></div>
            <p>Two</p>
            <footer><p>Copyright</p></footer>
        </body>"#;

        assert_eq!(
            extract_article(html).unwrap(),
            "<h2>Heading</h2> <p>One</p> <p>Two</p>"
        );
    }

    #[test]
    fn test_no_content() {
        assert!(matches!(
            extract_article("<html><body><div>   </div></body></html>"),
            Err(ImportError::NoContent)
        ));
    }

    #[test]
    fn test_from_bytes_uses_charset() {
        let html = b"<article><p>na\xefve</p></article>";
        assert_eq!(
            extract_article_from_bytes(html, "iso-8859-1").unwrap(),
            "<p>naïve</p>"
        );
    }
}
