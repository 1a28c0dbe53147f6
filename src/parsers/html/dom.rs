use std::cell::RefCell;

use encoding_rs::Encoding;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use super::utils::{is_inline_tag, is_void_tag, is_whitespace};

/// 自有节点树
///
/// 解析结果是普通的值类型，之后的所有变换都是"旧树进、新树出"，
/// 不会共享可变状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str, attrs: Vec<(String, String)>, children: Vec<Node>) -> Self {
        Self {
            name: name.to_string(),
            attrs,
            children,
        }
    }

    /// 获取属性值
    pub fn attr(&self, attr_name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name == attr_name)
            .map(|(_, value)| value.as_str())
    }

    /// 返回替换了子节点的副本
    pub fn with_children(&self, children: Vec<Node>) -> Self {
        Self {
            name: self.name.clone(),
            attrs: self.attrs.clone(),
            children,
        }
    }
}

impl Node {
    pub fn text(s: &str) -> Self {
        Node::Text(s.to_string())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// 子树中是否存在非空白文本
    pub fn has_text(&self) -> bool {
        match self {
            Node::Text(text) => !is_whitespace(text),
            Node::Element(element) => element.children.iter().any(Node::has_text),
            Node::Comment(_) => false,
        }
    }

    /// 子树中是否存在白名单之外（块级）的元素
    pub fn contains_block(&self) -> bool {
        match self {
            Node::Element(element) => {
                !is_inline_tag(&element.name) || element.children.iter().any(Node::contains_block)
            }
            _ => false,
        }
    }
}

/// 按给定编码解码 HTML 字节，未知编码按 UTF-8 宽松解码
pub fn decode_html(data: &[u8], document_encoding: &str) -> String {
    match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.to_string()
        }
        None => String::from_utf8_lossy(data).to_string(),
    }
}

/// 按词法单元直接搭建节点树
///
/// 不经过 HTML5 树构造算法，因此不会补 `<tbody>`，也不会因为块级子元素
/// 提前关闭 `<p>`。未匹配的结束标签被忽略，输入结束时关闭所有未闭合元素。
struct FragmentBuilder {
    // 栈底是无名的根容器
    stack: RefCell<Vec<Element>>,
}

impl FragmentBuilder {
    fn new() -> Self {
        Self {
            stack: RefCell::new(vec![Element::new("", Vec::new(), Vec::new())]),
        }
    }

    fn append(&self, node: Node) {
        if let Some(parent) = self.stack.borrow_mut().last_mut() {
            parent.children.push(node);
        }
    }

    fn append_text(&self, text: &str) {
        if let Some(parent) = self.stack.borrow_mut().last_mut() {
            match parent.children.last_mut() {
                Some(Node::Text(last)) => last.push_str(text),
                _ => parent.children.push(Node::text(text)),
            }
        }
    }

    fn open(&self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        let attrs = tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        let element = Element::new(&name, attrs, Vec::new());

        if tag.self_closing || is_void_tag(&name) {
            self.append(Node::Element(element));
            return TokenSinkResult::Continue;
        }

        self.stack.borrow_mut().push(element);
        match raw_text_kind(&name) {
            Some(kind) => TokenSinkResult::RawData(kind),
            None => TokenSinkResult::Continue,
        }
    }

    fn close(&self, name: &str) {
        let mut stack = self.stack.borrow_mut();
        let Some(index) = stack.iter().rposition(|element| element.name == name) else {
            return;
        };
        while stack.len() > index.max(1) {
            fold_top(&mut stack);
        }
    }

    fn finish(self) -> Vec<Node> {
        let mut stack = self.stack.into_inner();
        while stack.len() > 1 {
            fold_top(&mut stack);
        }
        stack.pop().map(|root| root.children).unwrap_or_default()
    }
}

/// 弹出栈顶元素并挂到新的栈顶下
fn fold_top(stack: &mut Vec<Element>) {
    if let Some(element) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(Node::Element(element));
        }
    }
}

/// 内容不按标记解析的元素需要切换词法状态
fn raw_text_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
        "textarea" | "title" => Some(RawKind::Rcdata),
        _ => None,
    }
}

impl TokenSink for FragmentBuilder {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.open(tag),
                TagKind::EndTag => self.close(&tag.name),
            },
            Token::CharacterTokens(text) => self.append_text(&text),
            Token::CommentToken(text) => self.append(Node::Comment(text.to_string())),
            Token::DoctypeToken(_)
            | Token::NullCharacterToken
            | Token::EOFToken
            | Token::ParseError(_) => {}
        }
        TokenSinkResult::Continue
    }
}

/// 解析 HTML 片段，保留原有的元素嵌套
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let tokenizer = Tokenizer::new(FragmentBuilder::new(), TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));

    // 构建器从不返回 Script，因此 feed 总是一次处理完所有输入
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    tokenizer.sink.finish()
}
