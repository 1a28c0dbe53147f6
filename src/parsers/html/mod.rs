//! HTML解析和处理模块
//!
//! - `utils`: 行内/块级分类常量和空白处理
//! - `dom`: 按词法单元把片段搭建成自有节点树
//! - `serializer`: 借助 html5ever 序列化器输出自有节点树

pub mod dom;
pub mod serializer;
pub mod utils;

pub use dom::{decode_html, parse_fragment, Element, Node};
pub use serializer::serialize_nodes;
pub use utils::{is_inline_tag, is_whitespace, INLINE_TAGS, WHITESPACES};
