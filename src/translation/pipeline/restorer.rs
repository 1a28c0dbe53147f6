//! HTML 片段还原
//!
//! 提取的逆过程：把模板里的每个占位符替换成对应的（已翻译）片段。
//! 片段内容不再校验，调用方只会存入符合白名单的字符串。

use crate::parsers::html::dom::{parse_fragment, Element, Node};
use crate::parsers::html::serializer::serialize_nodes;
use crate::parsers::html::utils::{PLACEHOLDER_TAG, POSITION_ATTR, WHITESPACES};
use crate::translation::error::{TranslationError, TranslationResult};

/// 用片段替换模板中的占位符
pub fn restore_html_segments<S: AsRef<str>>(
    template: &str,
    fragments: &[S],
) -> TranslationResult<String> {
    let nodes = restore_nodes(parse_fragment(template), fragments)?;
    Ok(serialize_nodes(&nodes))
}

fn restore_nodes<S: AsRef<str>>(nodes: Vec<Node>, fragments: &[S]) -> TranslationResult<Vec<Node>> {
    let mut output = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            Node::Element(element) if element.name == PLACEHOLDER_TAG => {
                let position = placeholder_position(&element)?;
                let fragment = fragments
                    .get(position)
                    .ok_or(TranslationError::MissingFragment(position))?;
                output.extend(parse_fragment(fragment.as_ref().trim_matches(WHITESPACES)));
            }
            Node::Element(element) => {
                let children = restore_nodes(element.children, fragments)?;
                output.push(Node::Element(Element {
                    name: element.name,
                    attrs: element.attrs,
                    children,
                }));
            }
            other => output.push(other),
        }
    }

    Ok(output)
}

fn placeholder_position(element: &Element) -> TranslationResult<usize> {
    let value = element.attr(POSITION_ATTR).ok_or_else(|| {
        TranslationError::InvalidTemplate("占位符缺少 position 属性".to_string())
    })?;

    value
        .parse()
        .map_err(|_| TranslationError::InvalidTemplate(format!("无效的 position: {}", value)))
}
