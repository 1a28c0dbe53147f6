//! HTML 片段提取
//!
//! 把一段富文本拆成"模板 + 有序片段"：模板保留原有结构，每个可翻译片段
//! 被替换成 `<text position="N"></text>` 占位符，片段本身只含行内标签。

use serde::{Deserialize, Serialize};

use crate::parsers::html::dom::{parse_fragment, Element, Node};
use crate::parsers::html::serializer::serialize_nodes;
use crate::parsers::html::utils::{
    is_inline_tag, is_opaque_tag, PLACEHOLDER_TAG, POSITION_ATTR, WHITESPACES,
};

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlSegments {
    /// 带占位符的模板
    pub template: String,
    /// 按占位符序号排列的片段
    pub fragments: Vec<String>,
}

/// 提取 HTML 中的可翻译片段
pub fn extract_html_segments(html: &str) -> HtmlSegments {
    let mut extractor = SegmentCollector::default();
    let nodes = extractor.process_children(parse_fragment(html));

    tracing::debug!("从富文本中提取了 {} 个片段", extractor.fragments.len());

    HtmlSegments {
        template: serialize_nodes(&nodes),
        fragments: extractor.fragments,
    }
}

/// 片段收集器，按冲刷顺序为占位符编号
#[derive(Default)]
struct SegmentCollector {
    fragments: Vec<String>,
}

impl SegmentCollector {
    /// 遍历块级容器的子节点，连续的行内节点先缓冲，遇到块级子树时冲刷
    fn process_children(&mut self, children: Vec<Node>) -> Vec<Node> {
        let mut output = Vec::new();
        let mut buffer = Vec::new();

        for child in children {
            if child.contains_block() {
                self.flush(std::mem::take(&mut buffer), &mut output, true);
                output.push(self.process_block(child));
            } else {
                buffer.push(child);
            }
        }
        self.flush(buffer, &mut output, true);

        output
    }

    fn process_block(&mut self, node: Node) -> Node {
        match node {
            Node::Element(element) if is_opaque_tag(&element.name) => Node::Element(element),
            Node::Element(element) => {
                let children = self.process_children(element.children);
                Node::Element(Element {
                    name: element.name,
                    attrs: element.attrs,
                    children,
                })
            }
            other => other,
        }
    }

    /// 把缓冲区写成一个占位符
    ///
    /// 两端没有文本的节点（空白、`<br>`、注释、空的行内标签）留在模板中；
    /// 内部的注释直接丢弃。缓冲区里只剩一个包着内容的行内元素时，向内展开一层。
    fn flush(&mut self, buffer: Vec<Node>, output: &mut Vec<Node>, allow_unwrap: bool) {
        let first = buffer.iter().position(Node::has_text);
        let last = buffer.iter().rposition(Node::has_text);

        let (first, last) = match (first, last) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                output.extend(buffer);
                return;
            }
        };

        let mut nodes = buffer.into_iter();
        output.extend(nodes.by_ref().take(first));
        let mut content = strip_comments(nodes.by_ref().take(last - first + 1).collect());
        let trailing: Vec<Node> = nodes.collect();

        if allow_unwrap && content.len() == 1 {
            if let Node::Element(element) = &content[0] {
                if is_inline_tag(&element.name) {
                    let mut inner = Vec::new();
                    self.flush(element.children.clone(), &mut inner, false);
                    output.push(Node::Element(element.with_children(inner)));
                    output.extend(trailing);
                    return;
                }
            }
        }

        let mut leading_space = None;
        if let Some(Node::Text(text)) = content.first_mut() {
            let space_len = text.len() - text.trim_start_matches(WHITESPACES).len();
            if space_len > 0 {
                leading_space = Some(Node::text(&text[..space_len]));
                text.replace_range(..space_len, "");
            }
        }

        let mut trailing_space = None;
        if let Some(Node::Text(text)) = content.last_mut() {
            let trimmed_len = text.trim_end_matches(WHITESPACES).len();
            if trimmed_len < text.len() {
                trailing_space = Some(Node::text(&text[trimmed_len..]));
                text.truncate(trimmed_len);
            }
        }

        let position = self.fragments.len();
        self.fragments.push(serialize_nodes(&content));

        output.extend(leading_space);
        output.push(Node::Element(Element::new(
            PLACEHOLDER_TAG,
            vec![(POSITION_ATTR.to_string(), position.to_string())],
            vec![],
        )));
        output.extend(trailing_space);
        output.extend(trailing);
    }
}

/// 去掉注释节点，并合并因此相邻的文本
fn strip_comments(nodes: Vec<Node>) -> Vec<Node> {
    let mut output: Vec<Node> = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            Node::Comment(_) => {}
            Node::Text(text) => match output.last_mut() {
                Some(Node::Text(last)) => last.push_str(&text),
                _ => output.push(Node::Text(text)),
            },
            Node::Element(element) => {
                let children = strip_comments(element.children);
                output.push(Node::Element(Element {
                    name: element.name,
                    attrs: element.attrs,
                    children,
                }));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> (String, Vec<String>) {
        let segments = extract_html_segments(html);
        (segments.template, segments.fragments)
    }

    #[test]
    fn test_extract_simple_paragraphs() {
        let (template, fragments) = extract("<h1>Title</h1><p>Some <b>bold</b> text.</p>");

        assert_eq!(
            template,
            r#"<h1><text position="0"></text></h1><p><text position="1"></text></p>"#
        );
        assert_eq!(fragments, vec!["Title", "Some <b>bold</b> text."]);
    }

    #[test]
    fn test_empty_inline_tag_stays_in_template() {
        let (template, fragments) = extract("<p><i></i>Foo</p>");

        assert_eq!(template, r#"<p><i></i><text position="0"></text></p>"#);
        assert_eq!(fragments, vec!["Foo"]);
    }

    #[test]
    fn test_block_inside_inline_is_split() {
        let (_, fragments) = extract("<p><i>Foo <p>Bar</p></i></p>");
        assert_eq!(fragments, vec!["Foo", "Bar"]);
    }

    #[test]
    fn test_single_inline_wrapper_is_unwrapped() {
        let (template, fragments) = extract("<p><b>Bold only</b></p>");

        assert_eq!(template, r#"<p><b><text position="0"></text></b></p>"#);
        assert_eq!(fragments, vec!["Bold only"]);
    }

    #[test]
    fn test_whitespace_moves_to_template() {
        let (template, fragments) = extract("<p>  Foo bar \n</p>");

        assert_eq!(template, "<p>  <text position=\"0\"></text> \n</p>");
        assert_eq!(fragments, vec!["Foo bar"]);
    }

    #[test]
    fn test_edge_br_is_excluded() {
        let (template, fragments) = extract("<p><br>Foo<br>bar<br></p>");

        assert_eq!(
            template,
            r#"<p><br><text position="0"></text><br></p>"#
        );
        assert_eq!(fragments, vec!["Foo<br>bar"]);
    }

    #[test]
    fn test_textless_content_produces_nothing() {
        let (template, fragments) = extract("<p> </p><p><br></p><div><img src=\"a.png\"></div>");

        assert!(fragments.is_empty());
        assert_eq!(template, "<p> </p><p><br></p><div><img src=\"a.png\"></div>");
    }

    #[test]
    fn test_non_whitelisted_inline_is_block() {
        let (template, fragments) = extract("<p>Hello <span>world</span>!</p>");

        assert_eq!(
            template,
            r#"<p><text position="0"></text> <span><text position="1"></text></span><text position="2"></text></p>"#
        );
        assert_eq!(fragments, vec!["Hello", "world", "!"]);
    }

    #[test]
    fn test_link_attributes_stay_in_fragment() {
        let (_, fragments) = extract(r#"<p>See <a href="/page" class="x">this page</a>.</p>"#);
        assert_eq!(fragments, vec![r#"See <a href="/page" class="x">this page</a>."#]);
    }

    #[test]
    fn test_top_level_text_and_lists() {
        let (template, fragments) = extract("Intro<ul><li>One</li><li>Two</li></ul>");

        assert_eq!(
            template,
            r#"<text position="0"></text><ul><li><text position="1"></text></li><li><text position="2"></text></li></ul>"#
        );
        assert_eq!(fragments, vec!["Intro", "One", "Two"]);
    }

    #[test]
    fn test_script_contents_are_left_alone() {
        let (template, fragments) = extract("<div><script>var x = 1;</script><p>Text</p></div>");

        assert_eq!(fragments, vec!["Text"]);
        assert!(template.contains("var x = 1;"));
    }

    #[test]
    fn test_comments_never_reach_fragments() {
        let (template, fragments) = extract("<p>Foo<!-- x -->Bar</p>");
        assert_eq!(template, r#"<p><text position="0"></text></p>"#);
        assert_eq!(fragments, vec!["FooBar"]);

        let (template, fragments) =
            extract("<p><!-- lead -->Foo <b>bar<!-- in --></b><!-- tail --></p>");
        assert_eq!(
            template,
            r#"<p><!-- lead --><text position="0"></text><!-- tail --></p>"#
        );
        assert_eq!(fragments, vec!["Foo <b>bar</b>"]);
    }
}
