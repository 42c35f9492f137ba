use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => encoding.decode(data).0.into_owned(),
        None => String::from_utf8_lossy(data).into_owned(),
    };

    parse_html(&s)
}

/// 解析已解码的 HTML 文本
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// 按文档顺序查找第一个满足条件的元素
pub fn find_first<F>(node: &Handle, predicate: &F) -> Option<Handle>
where
    F: Fn(&Handle) -> bool,
{
    if matches!(node.data, NodeData::Element { .. }) && predicate(node) {
        return Some(node.clone());
    }

    for child in node.children.borrow().iter() {
        if let Some(found) = find_first(child, predicate) {
            return Some(found);
        }
    }
    None
}

/// 按文档顺序收集满足条件的元素，命中的元素不再向下查找
///
/// `skip` 命中的元素整棵子树都被跳过。
pub fn collect_outermost<F, S>(node: &Handle, predicate: &F, skip: &S, found: &mut Vec<Handle>)
where
    F: Fn(&Handle) -> bool,
    S: Fn(&Handle) -> bool,
{
    if matches!(node.data, NodeData::Element { .. }) {
        if skip(node) {
            return;
        }
        if predicate(node) {
            found.push(node.clone());
            return;
        }
    }

    for child in node.children.borrow().iter() {
        collect_outermost(child, predicate, skip, found);
    }
}

/// 删除所有名称在列表中的元素（连同子树）
pub fn remove_elements(node: &Handle, names: &[&str]) {
    node.children.borrow_mut().retain(|child| {
        get_node_name(child).map_or(true, |name| !names.contains(&name))
    });

    let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
    for child in &children {
        remove_elements(child, names);
    }
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 节点的 class 列表是否包含指定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map_or(false, |classes| classes.split_whitespace().any(|c| c == class_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_dom_decodes_charset() {
        // "café" in windows-1252
        let dom = html_to_dom(b"<p>caf\xe9</p>", "windows-1252");
        let p = find_first(&dom.document, &|n| get_node_name(n) == Some("p")).unwrap();
        let text = match &p.children.borrow()[0].data {
            NodeData::Text { contents } => contents.borrow().to_string(),
            _ => String::new(),
        };
        assert_eq!(text, "café");
    }

    #[test]
    fn test_remove_elements_drops_subtrees() {
        let dom = parse_html("<div><script>x()</script><p>keep<button>no</button></p></div>");
        remove_elements(&dom.document, &["script", "button"]);

        assert!(find_first(&dom.document, &|n| get_node_name(n) == Some("script")).is_none());
        assert!(find_first(&dom.document, &|n| get_node_name(n) == Some("button")).is_none());
        assert!(find_first(&dom.document, &|n| get_node_name(n) == Some("p")).is_some());
    }

    #[test]
    fn test_has_class() {
        let dom = parse_html(r#"<div class="post  entry-content">x</div>"#);
        let div = find_first(&dom.document, &|n| get_node_name(n) == Some("div")).unwrap();
        assert!(has_class(&div, "entry-content"));
        assert!(has_class(&div, "post"));
        assert!(!has_class(&div, "content"));
    }
}
