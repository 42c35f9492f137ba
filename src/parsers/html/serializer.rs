use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, SerializableHandle};

/// 序列化元素本身及其子树
pub fn serialize_outer(node: &Handle) -> String {
    serialize_with_scope(node, TraversalScope::IncludeNode)
}

/// 只序列化子节点
pub fn serialize_inner(node: &Handle) -> String {
    serialize_with_scope(node, TraversalScope::ChildrenOnly(None))
}

fn serialize_with_scope(node: &Handle, traversal_scope: TraversalScope) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    if let Err(e) = serialize(&mut buf, &serializable, opts) {
        tracing::warn!("DOM 序列化失败: {}", e);
        return String::new();
    }

    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_first, get_node_name, parse_html};

    #[test]
    fn test_inner_and_outer() {
        let dom = parse_html(r#"<div id="x"><p>Hello <b>world</b></p></div>"#);
        let div = find_first(&dom.document, &|n| get_node_name(n) == Some("div")).unwrap();

        assert_eq!(serialize_inner(&div), "<p>Hello <b>world</b></p>");
        assert_eq!(
            serialize_outer(&div),
            r#"<div id="x"><p>Hello <b>world</b></p></div>"#
        );
    }
}
