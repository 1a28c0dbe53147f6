//! 干净字符串编解码
//!
//! 译者只会看到"干净字符串"：只含白名单内的行内标签，真实属性被替换为
//! 生成的 `id`，原属性保存在旁路表中，回填时再按 `id` 还原。

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parsers::html::dom::{parse_fragment, Element, Node};
use crate::parsers::html::serializer::serialize_nodes;
use crate::parsers::html::utils::is_inline_tag;
use crate::translation::error::{StructuralViolation, TranslationError, TranslationResult};

/// 单个元素的真实属性
pub type ElementAttrs = BTreeMap<String, String>;

/// 生成的 id -> 真实属性
pub type AttrsTable = BTreeMap<String, ElementAttrs>;

/// 干净字符串
///
/// 反序列化同样经过 `from_translated_html` 校验，存储或输入中的非法标记无法混入。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StringValue {
    data: String,
}

impl StringValue {
    /// 从纯文本构造：转义 `&`、`<`、`>`，换行转换为 `<br>`
    pub fn from_plaintext(text: &str) -> Self {
        let data = text
            .split('\n')
            .map(|line| {
                line.replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;")
            })
            .collect::<Vec<_>>()
            .join("<br>");

        Self { data }
    }

    /// 从源 HTML 构造，把属性抽取到旁路表
    pub fn from_source_html(html: &str) -> TranslationResult<(Self, AttrsTable)> {
        let mut counter: HashMap<String, usize> = HashMap::new();
        let mut attrs = AttrsTable::new();

        let nodes: Vec<Node> = parse_fragment(html)
            .into_iter()
            .map(|node| extract_attrs(node, &mut counter, &mut attrs))
            .collect();

        validate_nodes(&nodes)?;

        Ok((
            Self {
                data: serialize_nodes(&nodes),
            },
            attrs,
        ))
    }

    /// 从译文 HTML 构造，只校验不抽取属性
    pub fn from_translated_html(html: &str) -> TranslationResult<Self> {
        let nodes = parse_fragment(html);
        validate_nodes(&nodes)?;

        Ok(Self {
            data: serialize_nodes(&nodes),
        })
    }

    /// 跳过校验，只用于构造非法输入
    #[cfg(test)]
    pub(crate) fn unchecked(data: &str) -> Self {
        Self {
            data: data.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// 是否没有可翻译内容
    ///
    /// 与提取时判断片段是否有文本的规则一致，只把 ASCII 空白视为空。
    pub fn is_empty(&self) -> bool {
        !parse_fragment(&self.data).iter().any(Node::has_text)
    }

    /// 内容哈希，供存储按内容寻址
    pub fn content_hash(&self) -> String {
        blake3::hash(self.data.as_bytes()).to_hex().to_string()
    }

    /// 去掉所有标签，`<br>` 还原为换行
    pub fn render_text(&self) -> String {
        let mut text = String::new();
        for node in parse_fragment(&self.data) {
            collect_text(&node, &mut text);
        }
        text
    }

    /// 只改写文本节点，标签和 `id` 保持不变
    pub fn map_text<F: Fn(&str) -> String>(&self, f: F) -> Self {
        let nodes = map_text_nodes(parse_fragment(&self.data), &f);
        Self {
            data: serialize_nodes(&nodes),
        }
    }

    /// 按旁路表还原属性，输出 HTML
    pub fn render_html(&self, attrs: &AttrsTable) -> String {
        serialize_nodes(&self.render_soup(attrs))
    }

    /// 按旁路表还原属性，输出节点树
    pub fn render_soup(&self, attrs: &AttrsTable) -> Vec<Node> {
        parse_fragment(&self.data)
            .into_iter()
            .map(|node| restore_attrs(node, attrs))
            .collect()
    }
}

impl TryFrom<String> for StringValue {
    type Error = TranslationError;

    fn try_from(html: String) -> TranslationResult<Self> {
        Self::from_translated_html(&html)
    }
}

impl From<StringValue> for String {
    fn from(value: StringValue) -> Self {
        value.data
    }
}

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

fn extract_attrs(
    node: Node,
    counter: &mut HashMap<String, usize>,
    attrs: &mut AttrsTable,
) -> Node {
    match node {
        Node::Element(element) => {
            let mut element_attrs = element.attrs;
            if !element_attrs.is_empty() {
                let count = counter.entry(element.name.clone()).or_insert(0);
                *count += 1;
                let element_id = format!("{}{}", element.name, count);
                attrs.insert(element_id.clone(), element_attrs.into_iter().collect());
                element_attrs = vec![("id".to_string(), element_id)];
            }

            let children = element
                .children
                .into_iter()
                .map(|child| extract_attrs(child, counter, attrs))
                .collect();

            Node::Element(Element {
                name: element.name,
                attrs: element_attrs,
                children,
            })
        }
        other => other,
    }
}

fn restore_attrs(node: Node, attrs: &AttrsTable) -> Node {
    match node {
        Node::Element(element) => {
            let restored = match element.attr("id") {
                Some(element_id) => match attrs.get(element_id) {
                    Some(real) => real
                        .iter()
                        .map(|(name, value)| (name.clone(), value.clone()))
                        .collect(),
                    None => {
                        tracing::warn!("未知的属性 id '{}'，已移除", element_id);
                        Vec::new()
                    }
                },
                None => element.attrs.clone(),
            };

            let children = element
                .children
                .into_iter()
                .map(|child| restore_attrs(child, attrs))
                .collect();

            Node::Element(Element {
                name: element.name,
                attrs: restored,
                children,
            })
        }
        other => other,
    }
}

fn map_text_nodes<F: Fn(&str) -> String>(nodes: Vec<Node>, f: &F) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Text(text) => Node::Text(f(&text)),
            Node::Element(element) => {
                let children = map_text_nodes(element.children, f);
                Node::Element(Element {
                    name: element.name,
                    attrs: element.attrs,
                    children,
                })
            }
            other => other,
        })
        .collect()
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) if element.name == "br" => out.push('\n'),
        Node::Element(element) => {
            for child in &element.children {
                collect_text(child, out);
            }
        }
        Node::Comment(_) => {}
    }
}

/// 校验节点只包含白名单标签，且只有 `<a>` 可以带 `id`
pub fn validate_nodes(nodes: &[Node]) -> Result<(), StructuralViolation> {
    for node in nodes {
        if let Node::Element(element) = node {
            validate_element(element)?;
        }
    }
    Ok(())
}

fn validate_element(element: &Element) -> Result<(), StructuralViolation> {
    if !is_inline_tag(&element.name) {
        return Err(StructuralViolation::DisallowedTag {
            tag: element.name.clone(),
        });
    }

    for (name, _) in &element.attrs {
        if !(element.name == "a" && name == "id") {
            return Err(StructuralViolation::DisallowedAttribute {
                tag: element.name.clone(),
                attribute: name.clone(),
            });
        }
    }

    validate_nodes(&element.children)
}
